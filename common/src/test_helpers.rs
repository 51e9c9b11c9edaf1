/// Shared test helpers for cross-crate use.
///
/// Centralized so the `shop` test suites do not duplicate id-generation
/// logic when running in parallel.
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

// Global counter for truly unique test identifiers across parallel tests
static GLOBAL_TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate globally unique test identifiers that won't conflict across
/// parallel tests.
///
/// # Arguments
/// * `prefix` - A string prefix to identify the test type (e.g., "ORDER", "REVIEW")
///
/// # Returns
/// A unique string in the format: "{prefix}-{timestamp}-{counter}"
pub fn generate_unique_id(prefix: &str) -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis();
    let counter = GLOBAL_TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}-{}", prefix, timestamp, counter)
}

/// Generate a unique numeric test ID suitable for entity primary keys.
pub fn generate_unique_test_id() -> i64 {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64;
    let counter = GLOBAL_TEST_COUNTER.fetch_add(1, Ordering::SeqCst) as i64;
    (timestamp % 100_000) * 1_000_000 + counter
}
