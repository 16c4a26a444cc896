//! # Haven Testing
//!
//! Testing utilities and helpers for the Houseplant Haven state container.
//!
//! This crate provides:
//! - [`ReducerTest`], a Given-When-Then harness that also checks reducer purity
//! - [`NotificationLog`], a recording listener for subscription tests
//! - Helpers for snapshots, replays and tracing in tests
//! - Property-based testing utilities built on proptest
//!
//! ## Example
//!
//! ```ignore
//! use haven_testing::NotificationLog;
//! use haven_runtime::Store;
//!
//! #[test]
//! fn test_listeners_run_in_order() {
//!     let store = Store::new(root_reducer());
//!     let log = NotificationLog::new();
//!     let _a = store.subscribe(log.listener("a"));
//!     let _b = store.subscribe(log.listener("b"));
//!
//!     store.dispatch(CartAction::ClearCart);
//!     assert_eq!(log.entries(), vec!["a", "b"]);
//! }
//! ```


pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations for testing.
pub mod mocks {
    use std::sync::{Arc, Mutex, PoisonError};

    /// Records listener invocations in the order they happen
    ///
    /// Clones share the same log.
    ///
    /// # Example
    ///
    /// ```
    /// use haven_testing::mocks::NotificationLog;
    ///
    /// let log = NotificationLog::new();
    /// let listener = log.listener("header");
    /// listener();
    /// listener();
    /// assert_eq!(log.count("header"), 2);
    /// ```
    #[derive(Debug, Clone, Default)]
    pub struct NotificationLog {
        entries: Arc<Mutex<Vec<&'static str>>>,
    }

    impl NotificationLog {
        /// Create an empty log
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Append `label` to the log
        pub fn record(&self, label: &'static str) {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(label);
        }

        /// A store listener that records `label` each time it runs
        #[must_use]
        pub fn listener(&self, label: &'static str) -> impl Fn() + Send + Sync + 'static {
            let log = self.clone();
            move || log.record(label)
        }

        /// Every recorded label, oldest first
        #[must_use]
        pub fn entries(&self) -> Vec<&'static str> {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// How many times `label` was recorded
        #[must_use]
        pub fn count(&self, label: &str) -> usize {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .filter(|entry| **entry == label)
                .count()
        }

        /// Forget everything recorded so far
        pub fn clear(&self) {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
        }
    }
}

/// Test helpers and utilities.
pub mod helpers {
    use haven_core::Reducer;
    use serde::Serialize;
    use std::sync::Arc;

    /// Deep copy of a state as JSON, independent of any `Arc` sharing
    ///
    /// Comparing snapshots taken before and after a reducer runs catches
    /// in-place mutation that identity checks cannot see.
    ///
    /// # Panics
    ///
    /// Panics if the state cannot be serialized, since nothing could be compared.
    #[must_use]
    #[allow(clippy::panic)] // Test code can panic
    pub fn snapshot<S: Serialize + ?Sized>(state: &S) -> serde_json::Value {
        try_snapshot(state).unwrap_or_else(|error| panic!("State cannot be snapshotted: {error}"))
    }

    /// Like [`snapshot`], but returns the serialization error
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the state cannot be serialized.
    pub fn try_snapshot<S: Serialize + ?Sized>(
        state: &S,
    ) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(state)
    }

    /// Reduce `actions` one after another, returning every intermediate state
    ///
    /// The first entry is the result of the first action.
    pub fn replay<R>(
        reducer: &R,
        initial: Option<Arc<R::State>>,
        actions: impl IntoIterator<Item = R::Action>,
    ) -> Vec<Arc<R::State>>
    where
        R: Reducer,
    {
        let mut current = initial;
        let mut history = Vec::new();
        for action in actions {
            let next = reducer.reduce(current.as_ref(), &action);
            history.push(Arc::clone(&next));
            current = Some(next);
        }
        history
    }

    /// Install a tracing subscriber that writes through the test harness
    ///
    /// Honors `RUST_LOG`. Safe to call from every test; only the first call
    /// installs anything.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use crate::helpers::try_snapshot;
    use haven_core::Reducer;
    use proptest::prelude::*;
    use proptest::test_runner::TestCaseError;
    use serde::Serialize;
    use std::sync::Arc;

    /// Sequences of up to `max_len` actions drawn from `action`
    pub fn action_sequences<T>(
        action: T,
        max_len: usize,
    ) -> impl Strategy<Value = Vec<T::Value>>
    where
        T: Strategy,
    {
        proptest::collection::vec(action, 0..=max_len)
    }

    /// Reduce once and fail the property if the input state was mutated
    ///
    /// Returns the reduced state for further checks.
    ///
    /// # Errors
    ///
    /// Returns a [`TestCaseError`] if the serialized input differs after
    /// reducing, or if the state cannot be serialized at all.
    pub fn reduce_purely<R>(
        reducer: &R,
        state: &Arc<R::State>,
        action: &R::Action,
    ) -> Result<Arc<R::State>, TestCaseError>
    where
        R: Reducer,
        R::State: Serialize,
    {
        let unserializable = |error: serde_json::Error| {
            TestCaseError::fail(format!("state cannot be snapshotted: {error}"))
        };
        let before = try_snapshot(&**state).map_err(unserializable)?;
        let next = reducer.reduce(Some(state), action);
        let after = try_snapshot(&**state).map_err(unserializable)?;
        prop_assert_eq!(before, after, "reducer mutated its input");
        Ok(next)
    }
}

// Re-export commonly used items
pub use helpers::{init_test_tracing, replay, snapshot, try_snapshot};
pub use mocks::NotificationLog;
