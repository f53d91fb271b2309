//! Shared test utilities for the marketplace crates
//!
//! - `TestMongo`: MongoDB container with automatic cleanup (feature: "mongodb")
//! - `TestDataBuilder`: deterministic identifiers and names
//! - `assertions`: assertion helpers for listing results
//!
//! ```rust,ignore
//! use test_utils::{TestDataBuilder, TestMongo};
//!
//! #[tokio::test]
//! #[ignore = "requires Docker"]
//! async fn my_mongo_test() {
//!     let mongo = TestMongo::new().await;
//!     let store = mongo.store("bids");
//!     let builder = TestDataBuilder::from_test_name("my_mongo_test");
//!     let bidder = builder.id();
//! }
//! ```

use uuid::Uuid;

#[cfg(feature = "mongodb")]
mod mongo;

#[cfg(feature = "mongodb")]
pub use mongo::TestMongo;

/// Deterministic test data derived from a seed.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from the test name so each test gets stable, distinct data.
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Stable UUID for this seed
    pub fn id(&self) -> Uuid {
        self.nth_id(0)
    }

    /// The `n`th stable UUID for this seed.
    pub fn nth_id(&self, n: u64) -> Uuid {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&self.seed.to_le_bytes());
        bytes[8..].copy_from_slice(&n.to_le_bytes());
        Uuid::from_bytes(bytes)
    }

    /// `test-{prefix}-{seed}-{suffix}`
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    pub fn email(&self, suffix: &str) -> String {
        format!("{}-{}@example.com", suffix, self.seed)
    }
}

/// Assertion helpers
pub mod assertions {
    /// Unwrap an `Option` with context in the panic message.
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Assert every item of `actual` is ordered by `key` (non-decreasing).
    pub fn assert_sorted_by<T, K: PartialOrd + std::fmt::Debug>(
        actual: &[T],
        key: impl Fn(&T) -> K,
        context: &str,
    ) {
        for pair in actual.windows(2) {
            let (a, b) = (key(&pair[0]), key(&pair[1]));
            assert!(a <= b, "{}: {:?} sorted after {:?}", context, a, b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let a = TestDataBuilder::new(42);
        let b = TestDataBuilder::new(42);

        assert_eq!(a.id(), b.id());
        assert_eq!(a.name("bid", "main"), b.name("bid", "main"));
        assert_ne!(a.nth_id(1), a.nth_id(2));
    }

    #[test]
    fn test_data_builder_different_names() {
        let a = TestDataBuilder::from_test_name("test1");
        let b = TestDataBuilder::from_test_name("test2");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_email_shape() {
        let email = TestDataBuilder::new(7).email("buyer");
        assert_eq!(email, "buyer-7@example.com");
    }

    #[test]
    fn test_assert_sorted_by() {
        assertions::assert_sorted_by(&[1, 2, 2, 5], |n| *n, "numbers");
    }

    #[test]
    #[should_panic(expected = "numbers")]
    fn test_assert_sorted_by_panics() {
        assertions::assert_sorted_by(&[3, 1], |n| *n, "numbers");
    }
}
