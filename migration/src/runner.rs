use colored::*;
use migration::Migrator;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::{MigrationStatus, MigratorTrait};
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

const STATUS_COLUMN: usize = 72;

async fn open(path: &str) -> Option<DatabaseConnection> {
    if let Some(parent) = Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match Database::connect(format!("sqlite://{path}?mode=rwc")).await {
        Ok(db) => Some(db),
        Err(e) => {
            eprintln!("{} {e}", "cannot open database:".red());
            None
        }
    }
}

/// Applies pending migrations one at a time, printing each with its duration.
pub async fn apply_pending(path: &str) -> ExitCode {
    let Some(db) = open(path).await else {
        return ExitCode::FAILURE;
    };

    let pending = match Migrator::get_pending_migrations(&db).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{} {e}", "cannot read migration table:".red());
            return ExitCode::FAILURE;
        }
    };
    if pending.is_empty() {
        println!("{}", "Schema is up to date".dimmed());
        return ExitCode::SUCCESS;
    }

    for migration in pending {
        let label = format!("Applying {}", migration.name().bold());
        print!("{label}{} ", ".".repeat(STATUS_COLUMN.saturating_sub(label.len())));
        let _ = io::stdout().flush();

        let started = Instant::now();
        match Migrator::up(&db, Some(1)).await {
            Ok(()) => {
                let elapsed = format!("({:.2?})", started.elapsed());
                println!("{} {}", "done".green(), elapsed.dimmed());
            }
            Err(e) => {
                println!("{}", "failed".red());
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

pub async fn print_status(path: &str) -> ExitCode {
    let Some(db) = open(path).await else {
        return ExitCode::FAILURE;
    };
    match Migrator::get_migration_with_status(&db).await {
        Ok(all) => {
            for m in all {
                let status = match m.status() {
                    MigrationStatus::Applied => "applied".green(),
                    MigrationStatus::Pending => "pending".yellow(),
                };
                println!("{:<48} {status}", m.name());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
