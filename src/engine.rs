//! Optimistic reconciliation between the in-memory collection, the local store and the remote sheet.
//!
//! Every mutation runs in two phases. The first one applies the change, saves the collection
//! and notifies the view while the state lock is held, so nothing can interleave. The second
//! one spawns the matching remote call; its outcome is only logged and never reverts the local
//! change.

use std::sync::{Arc, Mutex};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::events::{StatePayload, TodoView, PERSISTENCE_WARNING};
use crate::id;
use crate::models::{Filter, Item, ItemPatch};
use crate::remote::{RemoteClient, RemoteError};
use crate::state::{TodoData, TodoState};
use crate::storage::Storage;
use crate::view::{active_count, project};

/// The one remote operation a local mutation owes the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncIntent {
    Create(Item),
    Update { id: String, patch: ItemPatch },
    Delete(String),
    DeleteMany(Vec<String>),
}

impl SyncIntent {
    pub fn action(&self) -> &'static str {
        match self {
            SyncIntent::Create(_) => "create",
            SyncIntent::Update { .. } => "update",
            SyncIntent::Delete(_) => "delete",
            SyncIntent::DeleteMany(_) => "deleteMultiple",
        }
    }

    /// Sends the intent once and logs the outcome.
    async fn send(self, remote: &RemoteClient) {
        let result = match &self {
            SyncIntent::Create(item) => remote.create(item).await,
            SyncIntent::Update { id, patch } => remote.update(id, patch).await,
            SyncIntent::Delete(id) => remote.delete(id).await,
            SyncIntent::DeleteMany(ids) => remote.delete_many(ids).await,
        };
        match (result, &self) {
            (Ok(_), SyncIntent::Create(item)) => log::info!("created in remote id={}", item.id),
            (Ok(_), SyncIntent::Update { id, .. }) => log::info!("updated in remote id={id}"),
            (Ok(_), SyncIntent::Delete(id)) => log::info!("deleted in remote id={id}"),
            (Ok(_), SyncIntent::DeleteMany(ids)) => {
                log::info!("deleted multiple in remote count={}", ids.len())
            }
            (Err(err), intent) => {
                log::error!("failed to {} in remote: {err} ({intent:?})", intent.action())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Updated,
    /// The new text was blank, so the item was removed instead.
    Deleted,
    NotFound,
}

#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    state: TodoState,
    storage: Storage,
    remote: Option<RemoteClient>,
    view: Arc<dyn TodoView>,
    runtime: Handle,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl Engine {
    /// Builds an engine with an empty collection. `runtime` runs the background remote calls.
    pub fn new(
        storage: Storage,
        remote: Option<RemoteClient>,
        view: Arc<dyn TodoView>,
        filter: Filter,
        runtime: Handle,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                state: TodoState::new(Vec::new(), filter),
                storage,
                remote,
                view,
                runtime,
                pending: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn state(&self) -> &TodoState {
        &self.inner.state
    }

    pub fn storage(&self) -> &Storage {
        &self.inner.storage
    }

    /// Loads the local collection and renders it, then schedules the remote fetch.
    /// Returns whether a fetch was scheduled; `flush` waits for it.
    pub fn start(&self) -> bool {
        let items = self.inner.storage.load();
        {
            let mut data = self.inner.state.lock();
            data.replace_items(items);
            self.render(&data);
        }
        log::info!(
            "loaded {} item(s) from {}",
            self.inner.state.items().len(),
            self.inner.storage.todos_path().display()
        );

        if self.inner.remote.is_none() {
            log::debug!("no remote configured, running local-only");
            return false;
        }

        self.inner.view.loading(true);
        let engine = self.clone();
        let handle = self.inner.runtime.spawn(async move {
            if let Err(err) = engine.sync_from_remote().await {
                log::error!("initial sync failed, keeping local data: {err}");
            }
            engine.inner.view.loading(false);
        });
        self.track(handle);
        true
    }

    /// Replaces the whole local collection with the remote one, then saves and renders.
    pub async fn sync_from_remote(&self) -> Result<usize, RemoteError> {
        let remote = self.inner.remote.as_ref().ok_or(RemoteError::NotConfigured)?;
        let items = remote.fetch_all().await?;
        log::info!("fetched {} item(s) from remote", items.len());
        let count = self.commit(|data| {
            data.replace_items(items);
            Some(data.items.len())
        });
        Ok(count.unwrap_or_default())
    }

    /// Adds a new active item at the top. Blank text is ignored.
    pub fn add(&self, text: &str) -> Option<Item> {
        let text = text.trim();
        if text.is_empty() {
            log::debug!("ignoring add with empty text");
            return None;
        }
        let item = Item::new(id::generate(), text.to_string());
        let added = self.commit(|data| data.prepend(item.clone()).then(|| item.clone()));
        match added {
            Some(item) => {
                self.dispatch(SyncIntent::Create(item.clone()));
                Some(item)
            }
            None => {
                log::warn!("generated id {} already present, add skipped", item.id);
                None
            }
        }
    }

    /// Flips completion. Returns the new flag, or `None` for an unknown id.
    pub fn toggle(&self, id: &str) -> Option<bool> {
        let completed = self.commit(|data| data.toggle(id))?;
        self.dispatch(SyncIntent::Update {
            id: id.to_string(),
            patch: ItemPatch::completed(completed),
        });
        Some(completed)
    }

    pub fn edit(&self, id: &str, text: &str) -> EditOutcome {
        let text = text.trim();
        if text.is_empty() {
            return if self.delete(id) {
                EditOutcome::Deleted
            } else {
                EditOutcome::NotFound
            };
        }
        if self.commit(|data| data.set_text(id, text).then_some(())).is_none() {
            return EditOutcome::NotFound;
        }
        self.dispatch(SyncIntent::Update {
            id: id.to_string(),
            patch: ItemPatch::text(text),
        });
        EditOutcome::Updated
    }

    /// Removes the item. Unknown ids leave everything untouched.
    pub fn delete(&self, id: &str) -> bool {
        if self.commit(|data| data.remove(id).then_some(())).is_none() {
            return false;
        }
        self.dispatch(SyncIntent::Delete(id.to_string()));
        true
    }

    /// Removes all completed items in one step and returns their ids.
    pub fn clear_completed(&self) -> Vec<String> {
        let removed = self.commit(|data| {
            let ids = data.remove_completed();
            (!ids.is_empty()).then_some(ids)
        });
        match removed {
            Some(ids) => {
                self.dispatch(SyncIntent::DeleteMany(ids.clone()));
                ids
            }
            None => Vec::new(),
        }
    }

    pub fn set_filter(&self, filter: Filter) {
        let mut data = self.inner.state.lock();
        data.filter = filter;
        self.render(&data);
    }

    pub fn snapshot(&self) -> StatePayload {
        let data = self.inner.state.lock();
        payload(&data)
    }

    /// Waits for every background remote call scheduled so far.
    pub async fn flush(&self) {
        loop {
            let handles: Vec<JoinHandle<()>> = {
                let mut pending = self.inner.pending.lock().expect("pending poisoned");
                pending.drain(..).collect()
            };
            if handles.is_empty() {
                return;
            }
            for handle in handles {
                if let Err(err) = handle.await {
                    log::error!("background sync task failed: {err}");
                }
            }
        }
    }

    /// Applies `apply` and, when it reports a change, saves and renders before releasing the state.
    fn commit<R>(&self, apply: impl FnOnce(&mut TodoData) -> Option<R>) -> Option<R> {
        let mut data = self.inner.state.lock();
        let out = apply(&mut *data)?;
        self.persist(&data.items);
        self.render(&data);
        Some(out)
    }

    fn persist(&self, items: &[Item]) {
        if let Err(err) = self.inner.storage.save(items) {
            log::error!("error saving todos: {err}");
            self.inner.view.warn(PERSISTENCE_WARNING);
        }
    }

    fn render(&self, data: &TodoData) {
        self.inner.view.state_changed(&payload(data));
    }

    fn dispatch(&self, intent: SyncIntent) {
        let Some(remote) = self.inner.remote.clone() else {
            log::debug!("no remote configured, skipping {}", intent.action());
            return;
        };
        let handle = self
            .inner
            .runtime
            .spawn(async move { intent.send(&remote).await });
        self.track(handle);
    }

    fn track(&self, handle: JoinHandle<()>) {
        let mut pending = self.inner.pending.lock().expect("pending poisoned");
        pending.retain(|task| !task.is_finished());
        pending.push(handle);
    }
}

fn payload(data: &TodoData) -> StatePayload {
    StatePayload {
        items: project(&data.items, data.filter),
        active_count: active_count(&data.items),
        total: data.items.len(),
        filter: data.filter,
    }
}
