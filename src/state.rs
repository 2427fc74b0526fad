use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::{Filter, Item};

/// Shared handle to the in-memory collection and the current filter.
#[derive(Clone, Default)]
pub struct TodoState {
    inner: Arc<Mutex<TodoData>>,
}

impl TodoState {
    pub fn new(items: Vec<Item>, filter: Filter) -> Self {
        let mut data = TodoData {
            items: Vec::new(),
            filter,
        };
        data.replace_items(items);
        Self {
            inner: Arc::new(Mutex::new(data)),
        }
    }

    pub fn items(&self) -> Vec<Item> {
        self.lock().items.clone()
    }

    pub fn filter(&self) -> Filter {
        self.lock().filter
    }

    /// Holds the state for a whole apply/persist/render step.
    pub(crate) fn lock(&self) -> MutexGuard<'_, TodoData> {
        self.inner.lock().expect("state poisoned")
    }
}

#[derive(Debug, Default)]
pub struct TodoData {
    pub items: Vec<Item>,
    pub filter: Filter,
}

impl TodoData {
    /// Puts `item` at the top. Refused when the id is already taken.
    pub fn prepend(&mut self, item: Item) -> bool {
        if self.items.iter().any(|existing| existing.id == item.id) {
            return false;
        }
        self.items.insert(0, item);
        true
    }

    /// Flips the completion flag, returning the new value.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let item = self.items.iter_mut().find(|item| item.id == id)?;
        item.is_completed = !item.is_completed;
        Some(item.is_completed)
    }

    pub fn set_text(&mut self, id: &str, text: &str) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.text = text.to_string();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Drops every completed item, returning their ids in collection order.
    pub fn remove_completed(&mut self) -> Vec<String> {
        let ids: Vec<String> = self
            .items
            .iter()
            .filter(|item| item.is_completed)
            .map(|item| item.id.clone())
            .collect();
        if !ids.is_empty() {
            self.items.retain(|item| !item.is_completed);
        }
        ids
    }

    /// Swaps in a whole new collection. Repeated ids keep their first occurrence.
    pub fn replace_items(&mut self, items: Vec<Item>) {
        let mut seen = HashSet::with_capacity(items.len());
        let total = items.len();
        self.items = items
            .into_iter()
            .filter(|item| seen.insert(item.id.clone()))
            .collect();
        if self.items.len() != total {
            log::warn!(
                "dropped {} item(s) with duplicate ids",
                total - self.items.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn make_item(id: &str, completed: bool) -> Item {
        Item {
            id: id.to_string(),
            text: format!("item-{id}"),
            is_completed: completed,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|item| item.id.as_str()).collect()
    }

    #[test]
    fn new_drops_duplicate_ids_keeping_first() {
        let mut dup = make_item("a", true);
        dup.text = "second".to_string();
        let state = TodoState::new(
            vec![make_item("a", false), make_item("b", false), dup],
            Filter::Active,
        );
        let items = state.items();
        assert_eq!(ids(&items), vec!["a", "b"]);
        assert_eq!(items[0].text, "item-a");
        assert_eq!(state.filter(), Filter::Active);
    }

    #[test]
    fn prepend_puts_item_first_and_rejects_duplicates() {
        let mut data = TodoData::default();
        assert!(data.prepend(make_item("a", false)));
        assert!(data.prepend(make_item("b", false)));
        assert_eq!(ids(&data.items), vec!["b", "a"]);

        assert!(!data.prepend(make_item("a", true)));
        assert_eq!(data.items.len(), 2);
        assert!(!data.items[1].is_completed);
    }

    #[test]
    fn toggle_twice_restores_original_state() {
        let mut data = TodoData::default();
        data.prepend(make_item("a", false));
        assert_eq!(data.toggle("a"), Some(true));
        assert_eq!(data.toggle("a"), Some(false));
        assert!(!data.items[0].is_completed);
        assert_eq!(data.toggle("missing"), None);
    }

    #[test]
    fn set_text_and_remove_report_whether_item_existed() {
        let mut data = TodoData::default();
        data.prepend(make_item("a", false));
        assert!(data.set_text("a", "renamed"));
        assert_eq!(data.items[0].text, "renamed");
        assert!(!data.set_text("missing", "x"));

        assert!(!data.remove("missing"));
        assert!(data.remove("a"));
        assert!(data.items.is_empty());
    }

    #[test]
    fn remove_completed_keeps_order_of_the_rest() {
        let mut data = TodoData::default();
        data.replace_items(vec![
            make_item("a", false),
            make_item("b", true),
            make_item("c", false),
            make_item("d", true),
        ]);
        assert_eq!(data.remove_completed(), vec!["b", "d"]);
        assert_eq!(ids(&data.items), vec!["a", "c"]);
        assert!(data.remove_completed().is_empty());
        assert_eq!(data.items.len(), 2);
    }

    #[test]
    fn clones_share_the_same_collection() {
        let state = TodoState::default();
        let other = state.clone();
        other.lock().prepend(make_item("a", false));
        assert_eq!(state.items().len(), 1);
    }
}
