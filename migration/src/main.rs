//! `migration [up|fresh|clean|status]` against the configured SQLite database.

use std::{fs, path::Path, process::ExitCode};
use util::config;

mod runner;

#[tokio::main]
async fn main() -> ExitCode {
    let path = config::database_path();
    let command = std::env::args().nth(1).unwrap_or_else(|| "up".into());

    match command.as_str() {
        "up" => runner::apply_pending(&path).await,
        "fresh" => {
            drop_database(&path);
            runner::apply_pending(&path).await
        }
        "clean" => {
            drop_database(&path);
            ExitCode::SUCCESS
        }
        "status" => runner::print_status(&path).await,
        other => {
            eprintln!("unknown command '{other}' (expected up, fresh, clean or status)");
            ExitCode::FAILURE
        }
    }
}

fn drop_database(path: &str) {
    let file = Path::new(path);
    if !file.exists() {
        println!("Nothing to delete at {}", file.display());
        return;
    }
    match fs::remove_file(file) {
        Ok(()) => println!("Deleted {}", file.display()),
        Err(e) => eprintln!("Could not delete {}: {e}", file.display()),
    }
}
