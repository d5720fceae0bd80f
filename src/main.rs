use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use taskdeck::cli::{Cli, Commands, RemoteCommands};
use taskdeck::models::TaskFilter;
use taskdeck::{logging, utils, Config, Database, Profile};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    let cli = Cli::parse();

    // --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(&utils::expand_path(path))?,
        None => Config::load_with_profile(profile)?,
    };
    if let Some(database) = &cli.database {
        config.database_path = database.clone();
    }

    logging::init_logging(&config.get_log_path(), &config.log_level)?;
    tracing::info!(?profile, database = %config.database_path, "starting taskdeck");

    let db_path: PathBuf = config.get_database_path();
    let db = Database::new(
        db_path
            .to_str()
            .ok_or_else(|| color_eyre::eyre::eyre!("Database path contains invalid UTF-8"))?,
    )?;

    let today = utils::today();

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let app = taskdeck::tui::App::new(config, db)?;
            taskdeck::tui::run_event_loop(app)?;
        }
        Commands::Add { title, description, due, priority } => {
            taskdeck::cli::handle_add(title, description, due, priority, today, &db)?;
        }
        Commands::List { status, priority, json } => {
            taskdeck::cli::handle_list(TaskFilter { status, priority: priority.0 }, json, &db)?;
        }
        Commands::Edit { id, title, description, priority, due } => {
            taskdeck::cli::handle_edit(id, title, description, priority, due, today, &db)?;
        }
        Commands::Toggle { id } => taskdeck::cli::handle_toggle(id, &db)?,
        Commands::Delete { id } => taskdeck::cli::handle_delete(id, &db)?,
        Commands::Remote { command } => match command {
            RemoteCommands::List { limit } => taskdeck::cli::handle_remote_list(limit, &config)?,
            RemoteCommands::Import { remote_id } => {
                taskdeck::cli::handle_remote_import(remote_id, today, &config, &db)?
            }
        },
    }

    Ok(())
}
