use crate::engine::{EditOutcome, Engine};
use crate::models::{Filter, Item};

#[derive(Debug, serde::Serialize)]
pub struct CommandResult<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

fn ok<T>(data: T) -> CommandResult<T> {
    CommandResult {
        ok: true,
        data: Some(data),
        error: None,
    }
}

fn err<T>(message: &str) -> CommandResult<T> {
    CommandResult {
        ok: false,
        data: None,
        error: Some(message.to_string()),
    }
}

/// User actions the front end can dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    List { filter: Option<Filter> },
    Add { text: String },
    Toggle { id: String },
    Edit { id: String, text: String },
    Delete { id: String },
    ClearCompleted,
    Sync,
}

pub fn add_impl(engine: &Engine, text: &str) -> CommandResult<Item> {
    match engine.add(text) {
        Some(item) => ok(item),
        None => err("text is empty"),
    }
}

pub fn toggle_impl(engine: &Engine, id: &str) -> CommandResult<bool> {
    match engine.toggle(id) {
        Some(completed) => ok(completed),
        None => err("item not found"),
    }
}

pub fn edit_impl(engine: &Engine, id: &str, text: &str) -> CommandResult<EditOutcome> {
    match engine.edit(id, text) {
        EditOutcome::NotFound => err("item not found"),
        outcome => ok(outcome),
    }
}

pub fn delete_impl(engine: &Engine, id: &str) -> CommandResult<bool> {
    if engine.delete(id) {
        ok(true)
    } else {
        err("item not found")
    }
}

pub fn clear_completed_impl(engine: &Engine) -> CommandResult<Vec<String>> {
    ok(engine.clear_completed())
}

pub async fn sync_impl(engine: &Engine) -> CommandResult<usize> {
    match engine.sync_from_remote().await {
        Ok(count) => ok(count),
        Err(error) => err(&format!("sync failed: {error}")),
    }
}

/// Runs `command` and describes the outcome in one line.
pub async fn execute(engine: &Engine, command: Command) -> CommandResult<String> {
    match command {
        Command::List { filter } => {
            if let Some(filter) = filter {
                engine.set_filter(filter);
            }
            ok(format!("showing {}", engine.state().filter()))
        }
        Command::Add { text } => describe(add_impl(engine, &text), |item| {
            format!("added {} ({})", item.text, item.id)
        }),
        Command::Toggle { id } => describe(toggle_impl(engine, &id), |completed| {
            let status = if completed { "completed" } else { "active" };
            format!("{id} is now {status}")
        }),
        Command::Edit { id, text } => {
            describe(edit_impl(engine, &id, &text), |outcome| match outcome {
                EditOutcome::Deleted => format!("deleted {id} (empty text)"),
                _ => format!("updated {id}"),
            })
        }
        Command::Delete { id } => describe(delete_impl(engine, &id), |_| format!("deleted {id}")),
        Command::ClearCompleted => describe(clear_completed_impl(engine), |ids| {
            format!("cleared {} completed item(s)", ids.len())
        }),
        Command::Sync => describe(sync_impl(engine).await, |count| {
            format!("synced {count} item(s) from remote")
        }),
    }
}

fn describe<T>(
    result: CommandResult<T>,
    message: impl FnOnce(T) -> String,
) -> CommandResult<String> {
    CommandResult {
        ok: result.ok,
        data: result.data.map(message),
        error: result.error,
    }
}
