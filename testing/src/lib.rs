//! # Todolist Testing
//!
//! Testing utilities and helpers for the todolist architecture.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - A fluent Given-When-Then harness for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use todolist_testing::{ReducerTest, mocks::ScriptedPrompter, test_clock};
//!
//! ReducerTest::new(TodoReducer::new())
//!     .with_env(test_environment())
//!     .given_state(TodoState::new())
//!     .when_action(TodoAction::AddTask)
//!     .then_state(|state| assert_eq!(state.count(), 1))
//!     .run();
//! ```


use chrono::{DateTime, Utc};
use todolist_core::environment::{Clock, Prompter};

/// Mock implementations for testing.
///
/// Every environment capability has a deterministic stand-in here:
/// `FixedClock` for time and `ScriptedPrompter` for user dialogs.
pub mod mocks {
    use std::collections::VecDeque;
    use std::sync::{Mutex, PoisonError};

    use super::{Clock, DateTime, Prompter, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use todolist_testing::mocks::FixedClock;
    /// use todolist_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
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

    /// Scripted prompter for deterministic dialog tests
    ///
    /// Text replies and confirmations are queued up front and consumed in
    /// order. An exhausted queue behaves like a user walking away: text
    /// requests are cancelled and confirmations declined. Every message the
    /// code under test showed is recorded for assertion.
    ///
    /// # Example
    ///
    /// ```
    /// use todolist_core::environment::Prompter;
    /// use todolist_testing::mocks::ScriptedPrompter;
    ///
    /// let prompts = ScriptedPrompter::new()
    ///     .reply_with("buy milk")
    ///     .confirm_with(true);
    ///
    /// assert_eq!(prompts.request_text("Task?"), Some("buy milk".to_string()));
    /// assert!(prompts.confirm("Sure?"));
    /// assert_eq!(prompts.shown_messages(), vec!["Task?", "Sure?"]);
    /// ```
    #[derive(Debug, Default)]
    pub struct ScriptedPrompter {
        replies: Mutex<VecDeque<Option<String>>>,
        confirmations: Mutex<VecDeque<bool>>,
        shown: Mutex<Vec<String>>,
    }

    impl ScriptedPrompter {
        /// Create a prompter with empty queues
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a text reply for the next `request_text` call
        #[must_use]
        pub fn reply_with(self, text: &str) -> Self {
            self.replies
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(Some(text.to_owned()));
            self
        }

        /// Queue a cancelled dialog for the next `request_text` call
        #[must_use]
        pub fn cancel_next(self) -> Self {
            self.replies
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(None);
            self
        }

        /// Queue an answer for the next `confirm` call
        #[must_use]
        pub fn confirm_with(self, answer: bool) -> Self {
            self.confirmations
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(answer);
            self
        }

        /// Messages shown so far, in display order
        #[must_use]
        pub fn shown_messages(&self) -> Vec<String> {
            self.shown
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    impl Prompter for ScriptedPrompter {
        fn request_text(&self, message: &str) -> Option<String> {
            self.shown
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(message.to_owned());
            self.replies
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .unwrap_or(None)
        }

        fn confirm(&self, message: &str) -> bool {
            self.shown
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(message.to_owned());
            self.confirmations
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .unwrap_or(false)
        }
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, ScriptedPrompter, test_clock};
pub use reducer_test::{ReducerTest, assertions};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_is_fixed() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[test]
    fn scripted_prompter_consumes_replies_in_order() {
        let prompts = ScriptedPrompter::new()
            .reply_with("first")
            .cancel_next()
            .confirm_with(true);

        assert_eq!(prompts.request_text("a"), Some("first".to_owned()));
        assert_eq!(prompts.request_text("b"), None);
        assert!(prompts.confirm("c"));
        assert_eq!(prompts.shown_messages(), vec!["a", "b", "c"]);
    }

    #[test]
    fn exhausted_prompter_cancels_and_declines() {
        let prompts = ScriptedPrompter::new();

        assert_eq!(prompts.request_text("text?"), None);
        assert!(!prompts.confirm("sure?"));
    }
}
