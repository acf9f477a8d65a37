//! # Tourbook Testing
//!
//! Testing utilities for the tour booking wizard.
//!
//! This crate provides:
//! - `FixedClock` for deterministic dates (birth-date validation depends on "today")
//! - `ReducerTest`, a Given-When-Then builder for reducers
//! - Effect assertions and [`run_effects`] to drive collaborator calls by hand
//!
//! ## Example
//!
//! ```ignore
//! use tourbook_testing::{ReducerTest, assertions, test_clock};
//!
//! ReducerTest::new(BookingWizard::new())
//!     .with_env(environment(test_clock()))
//!     .given_state(entry_state())
//!     .when_action(BookingAction::Submit)
//!     .then_state(|s| assert_eq!(s.step, Step::Confirm))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use tourbook_core::effect::Effect;
use tourbook_core::environment::Clock;

/// Given-When-Then reducer testing
pub mod reducer_test;

pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// # Example
    ///
    /// ```
    /// use tourbook_testing::mocks::FixedClock;
    /// use tourbook_core::environment::Clock;
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
    /// Panics if the hardcoded timestamp fails to parse, which cannot happen.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

pub use mocks::{FixedClock, test_clock};

/// Execute effects without a store and collect the actions they produce.
///
/// Futures are awaited one after the other, in order. Produced actions are
/// returned rather than reduced, so a test can feed them to the reducer
/// itself and assert on each step.
pub async fn run_effects<A, I>(effects: I) -> Vec<A>
where
    I: IntoIterator<Item = Effect<A>>,
{
    let mut actions = Vec::new();
    for effect in effects {
        if let Effect::Future(fut) = effect {
            actions.extend(fut.await);
        }
    }
    actions
}
