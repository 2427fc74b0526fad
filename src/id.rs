use ulid::Ulid;

/// New item id: millisecond timestamp followed by random bits, lowercased.
/// Ids created later in the session sort after earlier ones at millisecond granularity.
pub fn generate() -> String {
    Ulid::new().to_string().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn rapid_calls_never_collide() {
        let ids: HashSet<String> = (0..10_000).map(|_| generate()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn time_component_is_nondecreasing() {
        let first = generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = generate();
        // The first 10 characters encode the millisecond timestamp.
        assert!(first[..10] < second[..10]);
        assert_eq!(first.len(), 26);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
