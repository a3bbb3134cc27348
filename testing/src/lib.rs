//! # EventTicket Testing
//!
//! Testing utilities for reducers written against `eventticket-core`.
//!
//! This crate provides:
//! - [`FixedClock`] for deterministic timestamps
//! - [`ReducerTest`], a Given-When-Then harness that runs a reducer without a runtime
//! - [`assertions`] over the effects a reducer returns
//!
//! Domain mocks (backend, session slot, confirmation) live next to the
//! domain in `eventticket-client::mocks`.

use chrono::{DateTime, TimeZone, Utc};
use eventticket_core::environment::Clock;

mod reducer_test;

pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of core environment traits
pub mod mocks {
    use super::{Clock, DateTime, TimeZone, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// # Example
    ///
    /// ```
    /// use eventticket_testing::mocks::FixedClock;
    /// use eventticket_core::environment::Clock;
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

    /// A fixed clock at 2025-01-01 00:00:00 UTC
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or_default(),
        )
    }
}

pub use mocks::{FixedClock, test_clock};
