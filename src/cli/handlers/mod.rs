mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::cli::shell;
use crate::io::config_io;
use crate::io::kv::FileStore;
use crate::io::slot::PersistentSlot;
use crate::logging;
use crate::model::config::AppConfig;
use crate::ops::validate::{prepare_edit, validate_title};
use crate::store::TaskStore;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Everything a command needs: resolved data directory, config, store
pub struct Session {
    pub data_dir: PathBuf,
    pub config: AppConfig,
    pub store: TaskStore<FileStore>,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let data_dir = resolve_data_dir(cli.data_dir.as_deref())?;

    match cli.command {
        // No subcommand lists with the configured default filter
        None => cmd_list(&data_dir, ListArgs::default(), json),
        Some(Commands::Init(args)) => cmd_init(&data_dir, args),

        // Read commands
        Some(Commands::List(args)) => cmd_list(&data_dir, args, json),
        Some(Commands::Stats) => cmd_stats(&data_dir, json),

        // Write commands
        Some(Commands::Add(args)) => cmd_add(&data_dir, args, json),
        Some(Commands::Toggle(args)) => cmd_toggle(&data_dir, args, json),
        Some(Commands::Edit(args)) => cmd_edit(&data_dir, args, json),
        Some(Commands::Delete(args)) => cmd_delete(&data_dir, args, json),
        Some(Commands::Clear) => cmd_clear(&data_dir, json),

        Some(Commands::Shell) => {
            let mut session = open_session(&data_dir)?;
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            shell::run(&mut session.store, stdin.lock(), stdout.lock())?;
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `-C` override if given, else the default data directory
pub fn resolve_data_dir(override_dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match override_dir {
        Some(dir) => {
            let path = PathBuf::from(dir);
            if path.is_absolute() {
                Ok(path)
            } else {
                Ok(std::env::current_dir()
                    .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?
                    .join(path))
            }
        }
        None => Ok(config_io::default_data_dir()),
    }
}

/// Read config, start logging, open the store
pub fn open_session(data_dir: &Path) -> Result<Session, Box<dyn std::error::Error>> {
    let config = config_io::read_config(data_dir)?;
    if let Err(e) = logging::init(&config.log.level, data_dir) {
        eprintln!("warning: logging disabled: {}", e);
    }

    let store_path = data_dir.join(&config.storage.file);
    let kv = FileStore::new(store_path).with_quota(config.storage.quota_bytes);
    let mut store = TaskStore::open(PersistentSlot::new(kv, config.storage.key.clone()));
    store.set_filter(config.ui.default_filter);

    Ok(Session {
        data_dir: data_dir.to_path_buf(),
        config,
        store,
    })
}

fn warn_if_unsaved(session: &Session) {
    if !session.store.last_persisted() {
        eprintln!(
            "warning: change not saved to {}",
            session.data_dir.join(&session.config.storage.file).display()
        );
    }
}

fn join_title(words: &[String]) -> String {
    words.join(" ")
}

fn print_listing(session: &Session, show_ids: bool, width: Option<usize>, json: bool) -> CmdResult {
    let store = &session.store;
    // Positions count in the full list, matching how toggle/edit/delete resolve them
    let rows = number_by_collection(store.visible(), store.tasks());
    if json {
        let out = TaskListJson {
            filter: store.filter(),
            search: store.search().to_string(),
            counts: store.counts(),
            tasks: tasks_to_json(&rows),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in format_listing(&rows, &store.counts(), show_ids, width) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(data_dir: &Path, args: ListArgs, json: bool) -> CmdResult {
    let mut session = open_session(data_dir)?;
    if let Some(ref f) = args.filter {
        session.store.set_filter(parse_status_filter(f)?);
    }
    if let Some(ref q) = args.search {
        session.store.set_search(q);
    }
    print_listing(&session, args.ids, args.width, json)
}

fn cmd_stats(data_dir: &Path, json: bool) -> CmdResult {
    let session = open_session(data_dir)?;
    let counts = session.store.counts();
    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
    } else {
        println!("{}", format_counts(&counts));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(data_dir: &Path, args: AddArgs, json: bool) -> CmdResult {
    let title = validate_title(&join_title(&args.title))?;
    let mut session = open_session(data_dir)?;
    let task = session.store.add(title);
    warn_if_unsaved(&session);
    if json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(1, &task))?);
    } else {
        println!("{}", task.id);
    }
    Ok(())
}

fn cmd_toggle(data_dir: &Path, args: RefArgs, json: bool) -> CmdResult {
    let mut session = open_session(data_dir)?;
    let id = resolve_task_ref(session.store.tasks(), &args.task)
        .map(|t| t.id.clone())
        .ok_or_else(|| format!("task not found: {}", args.task))?;
    session.store.toggle(&id);
    warn_if_unsaved(&session);
    print_task_result(&session, &id, json)
}

fn cmd_edit(data_dir: &Path, args: EditArgs, json: bool) -> CmdResult {
    let draft = validate_title(&join_title(&args.title))?;
    let mut session = open_session(data_dir)?;
    let task = resolve_task_ref(session.store.tasks(), &args.task)
        .ok_or_else(|| format!("task not found: {}", args.task))?;
    if task.completed {
        return Err(format!("cannot edit a completed task: {}", args.task).into());
    }
    let (id, current) = (task.id.clone(), task.title.clone());
    match prepare_edit(&current, &draft) {
        Some(title) => {
            session.store.edit(&id, &title);
            warn_if_unsaved(&session);
        }
        None => eprintln!("title unchanged"),
    }
    print_task_result(&session, &id, json)
}

fn cmd_delete(data_dir: &Path, args: RefArgs, json: bool) -> CmdResult {
    let mut session = open_session(data_dir)?;
    let task = resolve_task_ref(session.store.tasks(), &args.task)
        .cloned()
        .ok_or_else(|| format!("task not found: {}", args.task))?;
    let position = session
        .store
        .tasks()
        .iter()
        .position(|t| t.id == task.id)
        .map_or(0, |i| i + 1);
    session.store.delete(&task.id);
    warn_if_unsaved(&session);
    if json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(position, &task))?);
    } else {
        println!("deleted: {}", task.title);
    }
    Ok(())
}

fn cmd_clear(data_dir: &Path, json: bool) -> CmdResult {
    let mut session = open_session(data_dir)?;
    let removed = session.store.clear_completed();
    warn_if_unsaved(&session);
    if json {
        let out = ClearJson {
            removed,
            counts: session.store.counts(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("cleared {} completed task(s)", removed);
    }
    Ok(())
}

/// Print a task after a change, as a list line or JSON
fn print_task_result(session: &Session, id: &str, json: bool) -> CmdResult {
    let tasks = session.store.tasks();
    let Some((i, task)) = tasks.iter().enumerate().find(|(_, t)| t.id == id) else {
        return Ok(());
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(i + 1, task))?);
    } else {
        println!("{}", format_task_line(i + 1, task, false, None));
    }
    Ok(())
}
