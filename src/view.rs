use crate::models::{Filter, Item};

/// Items passing `filter`, in collection order.
pub fn project(items: &[Item], filter: Filter) -> Vec<Item> {
    items
        .iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect()
}

pub fn active_count(items: &[Item]) -> usize {
    items.iter().filter(|item| !item.is_completed).count()
}

pub fn items_left_label(active_count: usize) -> String {
    let suffix = if active_count == 1 { "" } else { "s" };
    format!("{active_count} item{suffix} left")
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

    #[test]
    fn active_and_completed_partition_the_collection_in_order() {
        let items = vec![
            make_item("a", true),
            make_item("b", false),
            make_item("c", true),
            make_item("d", false),
            make_item("e", false),
        ];
        let active = project(&items, Filter::Active);
        let completed = project(&items, Filter::Completed);

        let active_ids: Vec<&str> = active.iter().map(|i| i.id.as_str()).collect();
        let completed_ids: Vec<&str> = completed.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(active_ids, vec!["b", "d", "e"]);
        assert_eq!(completed_ids, vec!["a", "c"]);
        assert_eq!(active.len() + completed.len(), items.len());
        assert!(active.iter().all(|item| !completed.contains(item)));

        assert_eq!(project(&items, Filter::All), items);
        assert_eq!(active_count(&items), 3);
    }

    #[test]
    fn empty_collection_projects_to_nothing() {
        assert!(project(&[], Filter::All).is_empty());
        assert_eq!(active_count(&[]), 0);
    }

    #[test]
    fn items_left_label_pluralizes() {
        assert_eq!(items_left_label(0), "0 items left");
        assert_eq!(items_left_label(1), "1 item left");
        assert_eq!(items_left_label(2), "2 items left");
    }
}
