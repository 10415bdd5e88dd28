use clap::Parser;
use taskhive::cli::commands::Cli;
use taskhive::cli::handlers;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
