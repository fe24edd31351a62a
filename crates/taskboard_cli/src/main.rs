//! Maintenance CLI for task board databases.
//!
//! # Responsibility
//! - Verify `taskboard_core` linkage (`ping`).
//! - Report and repair scopes whose sibling orders are not dense.
//!
//! # Invariants
//! - `check` and `repair` never create a database; a missing file is an error.
//! - `check` never writes order values; it exits with status 1 when any scope
//!   is not dense.
//! - Output is line-oriented and deterministic for scripting.

use clap::{Parser, Subcommand};
use log::info;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use taskboard_core::{
    init_logging_from_config, open_existing_db_with_config, CoreConfig, MaintenanceService,
};

/// Task board maintenance tool.
#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(version)]
#[command(about = "Inspect and repair sibling ordering in task board databases")]
struct Cli {
    /// JSON config file (busy timeout, retry policy, logging)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print core version and a ping probe
    Ping,
    /// Report scopes whose orders are not exactly 0..N-1
    Check {
        /// SQLite database file
        #[arg(long, value_name = "PATH")]
        db: PathBuf,
    },
    /// Renumber every non-dense scope, keeping relative order
    Repair {
        /// SQLite database file
        #[arg(long, value_name = "PATH")]
        db: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let config = match cli.config.as_deref() {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    init_logging_from_config(&config)?;

    match cli.command {
        Commands::Ping => {
            println!("taskboard_core ping={}", taskboard_core::ping());
            println!("taskboard_core version={}", taskboard_core::core_version());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { db } => check(&db, &config),
        Commands::Repair { db } => repair(&db, &config),
    }
}

fn check(db: &Path, config: &CoreConfig) -> Result<ExitCode, Box<dyn Error>> {
    let conn = open_existing_db_with_config(db, config)?;
    let reports = MaintenanceService::try_new(&conn, config)?.check_all()?;

    for report in &reports {
        println!(
            "scope={} count={} gaps={:?} duplicates={:?}",
            report.scope, report.count, report.gaps, report.duplicates
        );
    }
    info!(
        "event=cli_check module=cli status=ok db={} violations={}",
        db.display(),
        reports.len()
    );

    if reports.is_empty() {
        println!("ok: all scopes dense");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("violations={}", reports.len());
        Ok(ExitCode::from(1))
    }
}

fn repair(db: &Path, config: &CoreConfig) -> Result<ExitCode, Box<dyn Error>> {
    let conn = open_existing_db_with_config(db, config)?;
    let summary = MaintenanceService::try_new(&conn, config)?.repair_all()?;
    println!("repaired scopes={} rows={}", summary.scopes, summary.rows);
    Ok(ExitCode::SUCCESS)
}
