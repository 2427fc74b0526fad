pub mod commands;
pub mod config;
pub mod engine;
pub mod events;
pub mod id;
pub mod logging;
pub mod models;
pub mod remote;
pub mod state;
pub mod storage;
pub mod view;

pub use engine::{EditOutcome, Engine, SyncIntent};
pub use events::{StatePayload, TodoView};
pub use models::{Filter, Item, ItemPatch};
pub use remote::{RemoteClient, RemoteError};
pub use storage::{PersistenceError, Storage};
