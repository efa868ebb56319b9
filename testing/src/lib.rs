//! # Webnovel Testing
//!
//! Test utilities for the web-novel platform.
//!
//! This crate provides:
//! - Clocks: [`FixedClock`] and the settable [`MockClock`]
//! - [`InMemoryDatabase`]: a [`Database`](webnovel_core::store::Database)
//!   with snapshot rollback, for service and HTTP tests
//! - [`fixtures`]: seeding helpers that work on any transaction
//!
//! ## Example
//!
//! ```ignore
//! use webnovel_testing::{InMemoryDatabase, MockClock, fixtures};
//!
//! #[tokio::test]
//! async fn bulk_purchase() {
//!     let db = InMemoryDatabase::new();
//!     let clock = MockClock::at("2025-01-06T01:00:00Z");
//!     let mut tx = db.begin().await?;
//!     let reader = fixtures::reader(&mut tx, "reader", clock.now()).await?;
//!     fixtures::credit(&mut tx, reader.user.id, 400, clock.now()).await?;
//!     tx.commit().await?;
//! }
//! ```

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use webnovel_core::environment::Clock;

pub mod fixtures;
pub mod memory;

pub use memory::{InMemoryDatabase, InMemoryTransaction, Tables};

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Arc, AtomicI64, Clock, DateTime, Ordering, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use webnovel_testing::mocks::FixedClock;
    /// use webnovel_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Clock that tests can move.
    ///
    /// Clones share the same time, so a clone handed to the service layer
    /// follows every `set` and `advance` made by the test.
    #[derive(Debug, Clone)]
    pub struct MockClock {
        micros: Arc<AtomicI64>,
    }

    impl MockClock {
        /// Clock starting at `time`.
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                micros: Arc::new(AtomicI64::new(time.timestamp_micros())),
            }
        }

        /// Clock starting at an RFC 3339 instant.
        ///
        /// # Panics
        ///
        /// Panics when `rfc3339` does not parse.
        #[must_use]
        #[allow(clippy::expect_used)]
        pub fn at(rfc3339: &str) -> Self {
            Self::new(
                DateTime::parse_from_rfc3339(rfc3339)
                    .expect("test timestamp should parse")
                    .with_timezone(&Utc),
            )
        }

        /// Jump to `time`.
        pub fn set(&self, time: DateTime<Utc>) {
            self.micros.store(time.timestamp_micros(), Ordering::SeqCst);
        }

        /// Move forward by `by`.
        pub fn advance(&self, by: chrono::Duration) {
            let step = by.num_microseconds().unwrap_or(i64::MAX);
            self.micros.fetch_add(step, Ordering::SeqCst);
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> DateTime<Utc> {
            DateTime::from_timestamp_micros(self.micros.load(Ordering::SeqCst)).unwrap_or_default()
        }
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, MockClock, test_clock};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[test]
    fn mock_clock_clones_share_time() {
        let clock = MockClock::at("2025-01-06T01:00:00Z");
        let handle = clock.clone();
        clock.advance(Duration::hours(2));
        assert_eq!(handle.now(), clock.now());
        assert_eq!(handle.now().to_rfc3339(), "2025-01-06T03:00:00+00:00");
    }
}
