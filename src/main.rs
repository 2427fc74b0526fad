use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use tokio::runtime::Handle;

use myday_lib::commands::{execute, Command};
use myday_lib::config::Config;
use myday_lib::logging::init_logging;
use myday_lib::view::items_left_label;
use myday_lib::{Engine, Filter, StatePayload, TodoView};

#[derive(Parser)]
#[command(name = "myday")]
#[command(about = "To-do list with local storage and background sheet sync")]
struct Cli {
    /// Directory holding the todo data, settings and logs
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Remote sheet endpoint (overrides settings and MYDAY_REMOTE_URL)
    #[arg(long, global = true)]
    remote: Option<String>,
    /// Skip all remote calls
    #[arg(long, global = true)]
    offline: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the list
    List {
        /// all, active or completed
        #[arg(long)]
        filter: Option<Filter>,
    },
    /// Add a new item at the top
    Add { text: Vec<String> },
    /// Flip an item between active and completed
    Toggle { id: String },
    /// Replace an item's text; empty text deletes it
    Edit { id: String, text: Vec<String> },
    /// Delete an item
    Delete { id: String },
    /// Delete every completed item
    ClearCompleted,
    /// Fetch the remote list and replace the local one
    Sync,
}

impl From<Commands> for Command {
    fn from(value: Commands) -> Self {
        match value {
            Commands::List { filter } => Command::List { filter },
            Commands::Add { text } => Command::Add {
                text: text.join(" "),
            },
            Commands::Toggle { id } => Command::Toggle { id },
            Commands::Edit { id, text } => Command::Edit {
                id,
                text: text.join(" "),
            },
            Commands::Delete { id } => Command::Delete { id },
            Commands::ClearCompleted => Command::ClearCompleted,
            Commands::Sync => Command::Sync,
        }
    }
}

/// Keeps the latest render; the list is printed once the command is done.
#[derive(Default)]
struct ConsoleView {
    last: Mutex<Option<StatePayload>>,
}

impl TodoView for ConsoleView {
    fn state_changed(&self, payload: &StatePayload) {
        *self.last.lock().expect("view poisoned") = Some(payload.clone());
    }

    fn warn(&self, message: &str) {
        eprintln!("warning: {message}");
    }

    fn loading(&self, loading: bool) {
        if loading {
            eprintln!("syncing with remote...");
        }
    }
}

impl ConsoleView {
    fn print(&self) {
        let guard = self.last.lock().expect("view poisoned");
        let Some(payload) = guard.as_ref() else {
            return;
        };
        if payload.items.is_empty() {
            if payload.total == 0 {
                println!("No tasks yet.");
            } else {
                println!("No {} tasks.", payload.filter);
            }
        }
        for item in &payload.items {
            let mark = if item.is_completed { "x" } else { " " };
            println!(
                "[{mark}] {}  {}  ({})",
                item.id,
                item.text,
                item.created_at.format("%Y-%m-%d")
            );
        }
        println!("{}", items_left_label(payload.active_count));
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = Config::resolve(cli.data_dir, cli.remote, cli.offline);

    if let Err(err) = init_logging(&config.data_dir) {
        eprintln!("failed to initialize logging: {err}");
    }

    let remote = match config.remote() {
        Ok(remote) => remote,
        Err(err) => {
            log::error!("remote disabled: {err}");
            eprintln!("remote disabled: {err}");
            None
        }
    };

    let view = Arc::new(ConsoleView::default());
    let engine = Engine::new(
        config.storage(),
        remote,
        view.clone(),
        config.default_filter,
        Handle::current(),
    );

    engine.start();
    // One-shot invocations wait for the remote snapshot before mutating.
    engine.flush().await;

    let command = cli
        .command
        .map(Command::from)
        .unwrap_or(Command::List { filter: None });
    let result = execute(&engine, command).await;
    engine.flush().await;

    view.print();
    match (result.data, result.error) {
        (Some(message), _) => eprintln!("{message}"),
        (None, Some(error)) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
        (None, None) => {}
    }
}
