use crate::models::{Filter, Item};

pub const PERSISTENCE_WARNING: &str = "Failed to save data. Make sure storage is not full.";

/// What the view layer receives after every state change.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StatePayload {
    pub items: Vec<Item>,
    pub active_count: usize,
    pub total: usize,
    pub filter: Filter,
}

/// Observer implemented by the view layer.
///
/// Callbacks run while the engine holds the state, so they must not call back into the engine.
pub trait TodoView: Send + Sync {
    fn state_changed(&self, payload: &StatePayload);

    /// Blocking user-facing warning; only raised for local save failures.
    fn warn(&self, message: &str);

    fn loading(&self, _loading: bool) {}
}
