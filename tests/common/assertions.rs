//! Domain-specific assertion macros for normchain harnesses.
//!
//! These wrap `pretty_assertions` and add failure messages that say which
//! forwarding invariant was violated.

/// Assert that two `Arc<Message<_>>` are the same allocation.
///
/// ```rust
/// assert_same_message!(forwarded, dispatched);
/// ```
#[macro_export]
macro_rules! assert_same_message {
    ($actual:expr, $expected:expr) => {{
        let actual = &$actual;
        let expected = &$expected;
        if !std::sync::Arc::ptr_eq(actual, expected) {
            panic!(
                "assert_same_message! failed: forwarded a different message\n  expected: {:?}\n  actual:   {:?}",
                expected, actual
            );
        }
    }};
}

/// Assert that a derived message shares `kind`, `meta` and custom fields
/// with its original (pointer equality, not just value equality).
#[macro_export]
macro_rules! assert_shares_fields {
    ($derived:expr, $original:expr) => {{
        let derived = &$derived;
        let original = &$original;
        assert!(
            std::sync::Arc::ptr_eq(&derived.kind, &original.kind),
            "assert_shares_fields! failed: `kind` was reallocated"
        );
        assert!(
            std::sync::Arc::ptr_eq(&derived.fields, &original.fields),
            "assert_shares_fields! failed: custom fields were reallocated"
        );
        match (&derived.meta, &original.meta) {
            (Some(d), Some(o)) => assert!(
                std::sync::Arc::ptr_eq(d, o),
                "assert_shares_fields! failed: `meta` was reallocated"
            ),
            (None, None) => {}
            (d, o) => panic!(
                "assert_shares_fields! failed: `meta` presence changed ({} -> {})",
                o.is_some(),
                d.is_some()
            ),
        }
    }};
}

/// Assert that a message's payload is the normalized graph `expected`
/// (compared as JSON).
#[macro_export]
macro_rules! assert_normalized_payload {
    ($message:expr, $expected:expr) => {{
        let message = &$message;
        let expected: serde_json::Value = $expected;
        match message.payload.as_normalized() {
            Some(n) => pretty_assertions::assert_eq!(n.to_value(), expected),
            None => panic!(
                "assert_normalized_payload! failed: payload is still raw: {}",
                message.payload.to_value()
            ),
        }
    }};
}
