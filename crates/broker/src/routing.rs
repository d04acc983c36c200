//! AMQP-style topic routing key matching.

/// Returns true if a routing key matches a binding pattern.
///
/// Patterns are dot-separated words where `*` matches exactly one word and
/// `#` matches zero or more words, as in a topic exchange. A pattern with
/// no wildcards matches only the identical key.
pub fn matches(pattern: &str, routing_key: &str) -> bool {
    let pattern: Vec<&str> = pattern.split('.').collect();
    let key: Vec<&str> = routing_key.split('.').collect();
    matches_segments(&pattern, &key)
}

fn matches_segments(pattern: &[&str], key: &[&str]) -> bool {
    match pattern.split_first() {
        None => key.is_empty(),
        Some(("#", rest)) => {
            // `#` absorbs zero or more words
            (0..=key.len()).any(|skip| matches_segments(rest, &key[skip..]))
        }
        Some(("*", rest)) => !key.is_empty() && matches_segments(rest, &key[1..]),
        Some((word, rest)) => {
            key.first() == Some(word) && matches_segments(rest, &key[1..])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(matches("OrderCreated", "OrderCreated"));
        assert!(!matches("OrderCreated", "InventoryUpdated"));
    }

    #[test]
    fn test_star_matches_one_word() {
        assert!(matches("orders.*", "orders.created"));
        assert!(!matches("orders.*", "orders.created.v1"));
        assert!(!matches("orders.*", "orders"));
    }

    #[test]
    fn test_hash_matches_zero_or_more() {
        assert!(matches("orders.#", "orders"));
        assert!(matches("orders.#", "orders.created"));
        assert!(matches("orders.#", "orders.created.v1"));
        assert!(matches("#", "anything.at.all"));
    }

    #[test]
    fn test_hash_in_the_middle() {
        assert!(matches("orders.#.v1", "orders.created.v1"));
        assert!(matches("orders.#.v1", "orders.v1"));
        assert!(!matches("orders.#.v1", "orders.created.v2"));
    }

    #[test]
    fn test_mixed_wildcards() {
        assert!(matches("*.created.#", "orders.created"));
        assert!(matches("*.created.#", "orders.created.eu.west"));
        assert!(!matches("*.created.#", "created"));
    }
}
