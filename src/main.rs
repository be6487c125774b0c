//! todo: command-line front end for the task list.

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use todo_list::cli::{Cli, Command};
use todo_list::config::Config;
use todo_list::controller::TaskListController;
use todo_list::db::Database;
use todo_list::format::render_tasks;
use todo_list::types::{Task, TaskId};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn init_logging(cli: &Cli) -> Result<()> {
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "2" | "stderr" => {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow!(e))?;
        }
        filename => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(file)
                .with_ansi(false)
                .try_init()
                .map_err(|e| anyhow!(e))?;
        }
    }
    Ok(())
}

/// Find a task in the controller's last loaded list.
fn find_task(controller: &TaskListController<Database>, id: TaskId) -> Result<Task> {
    controller
        .tasks()
        .into_iter()
        .find(|t| t.id == Some(id))
        .ok_or_else(|| anyhow!("No task with id {}", id))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let (mut config, config_path) = Config::discover(cli.config.as_deref().map(Path::new))?;
    if let Some(db_path) = &cli.database {
        config.storage.db_path = db_path.into();
    }
    if let Some(format) = cli.format {
        config.display.format = format.into();
    }
    if let Some(path) = &config_path {
        debug!(path = %path.display(), "Using config file");
    }

    config.ensure_db_dir()?;
    let db = Database::open(&config.storage.db_path)?;

    let controller = TaskListController::new(Arc::new(db));
    controller.reload().await?;

    match cli.command.unwrap_or(Command::List { query: None }) {
        Command::List { query } => {
            if let Some(query) = query {
                controller.set_search_query(query).await?;
            }
        }
        Command::Add { text } => {
            controller.start_add();
            controller.set_editing_text(text);
            if !controller.can_save() {
                bail!("Task text must not be blank");
            }
            controller.save().await?;
        }
        Command::Edit { id, text } => {
            let task = find_task(&controller, id)?;
            controller.start_edit(task);
            controller.set_editing_text(text);
            if controller.can_save() {
                controller.save().await?;
            } else {
                controller.cancel_or_commit_dialog().await?;
            }
        }
        Command::Done { id } => {
            let task = find_task(&controller, id)?;
            controller.set_completed(&task, true).await?;
        }
        Command::Undone { id } => {
            let task = find_task(&controller, id)?;
            controller.set_completed(&task, false).await?;
        }
        Command::Rm { id } => {
            let task = find_task(&controller, id)?;
            controller.delete(&task).await?;
        }
    }

    let out = render_tasks(
        &controller.sorted_tasks(),
        &controller.search_query(),
        config.display.format,
    )?;
    print!("{}", out);

    Ok(())
}
