use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "th", about = concat!("[x] taskhive v", env!("CARGO_PKG_VERSION"), " - organize tasks, stay focused"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory and a default taskhive.toml
    Init(InitArgs),
    /// List tasks (the default when no command is given)
    List(ListArgs),
    /// Show task counts
    Stats,
    /// Add a task to the top of the list
    Add(AddArgs),
    /// Mark a task complete, or open again
    Toggle(RefArgs),
    /// Change a task's title
    Edit(EditArgs),
    /// Delete a task
    Delete(RefArgs),
    /// Delete all completed tasks
    Clear,
    /// Interactive session with filter and search
    Shell,
}

// ---------------------------------------------------------------------------
// Args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing taskhive.toml
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Default)]
pub struct ListArgs {
    /// Show only tasks with this status (all, active, completed)
    #[arg(long)]
    pub filter: Option<String>,
    /// Show only tasks whose title contains this text (case-insensitive)
    #[arg(long, short)]
    pub search: Option<String>,
    /// Include task IDs in the listing
    #[arg(long)]
    pub ids: bool,
    /// Truncate titles to this many terminal cells
    #[arg(long)]
    pub width: Option<usize>,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title (words are joined with spaces)
    #[arg(required = true, num_args = 1..)]
    pub title: Vec<String>,
}

#[derive(Args)]
pub struct RefArgs {
    /// Task ID, or 1-based position in the full list
    pub task: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID, or 1-based position in the full list
    pub task: String,
    /// New title (words are joined with spaces)
    #[arg(required = true, num_args = 1..)]
    pub title: Vec<String>,
}
