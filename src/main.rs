use anyhow::Context;
use clap::Parser;
use gpu_selector::cli::{Cli, CliCommand};
use gpu_selector::commands;
use gpu_selector::core::config;
use gpu_selector::infrastructure::{db, logging};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let paths = config::default_paths().context("resolve application paths")?;
    let _logging = logging::init_logging(&paths.log_dir).context("initialize logging")?;
    db::init_db(&paths.db_path).context("initialize the application database")?;
    let pool = db::new_db_pool(&paths.db_path).context("open the application database")?;

    let result = match &cli.command {
        CliCommand::Tui => commands::run_tui(&pool, &paths),
        CliCommand::Scan => commands::run_scan(&pool, &paths),
        CliCommand::List { json } => commands::run_list(&pool, *json),
        CliCommand::Set { identifier } => commands::run_set(&pool, &paths, identifier),
        CliCommand::Unset { identifier } => commands::run_unset(&pool, &paths, identifier),
        CliCommand::InstallService => commands::run_install_service(&paths),
        CliCommand::UninstallService => commands::run_uninstall_service(),
    };

    if let Err(error) = result {
        eprintln!("Error: {}", error.message);
        std::process::exit(1);
    }
    Ok(())
}
