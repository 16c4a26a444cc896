//! # Haven Core
//!
//! Core traits for the Houseplant Haven state container.
//!
//! This crate provides the pure half of a unidirectional data flow:
//!
//! - **Action**: A tagged description of an intended state change
//! - **Reducer**: Pure function `(Option<State>, Action) → State`
//! - **Slice**: A named sub-tree of the overall state, owned by one reducer
//! - **Identity**: Cheap change detection for selected values
//!
//! The runtime half (store, subscriptions, bindings) lives in `haven-runtime`.
//!
//! ## Structural sharing
//!
//! State is handed around as `Arc<State>`. A reducer that has nothing to do
//! returns the `Arc` it was given, and a reducer that changes something
//! builds a new value that reuses every untouched `Arc` from the previous one.
//! Observers compare with [`Arc::ptr_eq`] instead of walking the state.
//!
//! ## Example
//!
//! ```
//! use haven_core::{Action, Reducer};
//! use std::sync::Arc;
//!
//! #[derive(Clone, Debug, Default, PartialEq)]
//! struct Counter {
//!     count: u32,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum CounterAction {
//!     Init,
//!     Increment,
//! }
//!
//! impl Action for CounterAction {
//!     fn init() -> Self {
//!         Self::Init
//!     }
//!
//!     fn action_type(&self) -> &'static str {
//!         match self {
//!             Self::Init => "@@INIT",
//!             Self::Increment => "INCREMENT",
//!         }
//!     }
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = Counter;
//!     type Action = CounterAction;
//!
//!     fn reduce(&self, state: Option<&Arc<Counter>>, action: &CounterAction) -> Arc<Counter> {
//!         let state = state.cloned().unwrap_or_default();
//!         match action {
//!             CounterAction::Increment => Arc::new(Counter { count: state.count + 1 }),
//!             CounterAction::Init => state,
//!         }
//!     }
//! }
//!
//! let booted = CounterReducer.reduce(None, &CounterAction::init());
//! let next = CounterReducer.reduce(Some(&booted), &CounterAction::Increment);
//! assert_eq!(next.count, 1);
//! ```

/// Action module - Tagged inputs interpreted by reducers
pub mod action {
    use std::fmt::Debug;

    /// A description of an intended state change.
    ///
    /// Every action type carries a boot variant returned by [`Action::init`].
    /// The store applies it once to an absent state so each slice can
    /// substitute its own initial value.
    ///
    /// Usually derived with `#[derive(Action)]` from `haven-macros`.
    pub trait Action: Clone + Debug + Send + Sync + 'static {
        /// The action applied to an absent state when a store boots
        fn init() -> Self;

        /// The discriminant of this action (e.g. `"ADD_TO_CART"`)
        fn action_type(&self) -> &'static str;
    }
}

/// Reducer module - The core trait for state transitions
pub mod reducer {
    use std::sync::Arc;

    /// The Reducer trait - pure state transition function
    ///
    /// `None` stands for "no state yet". The reducer substitutes its initial
    /// state before processing the action.
    ///
    /// Reducers must not mutate the state they are given. Returning the input
    /// `Arc` unchanged signals that nothing happened; anything else is treated
    /// as a new state by observers.
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for CartReducer {
    ///     type State = CartState;
    ///     type Action = CartAction;
    ///
    ///     fn reduce(&self, state: Option<&Arc<CartState>>, action: &CartAction) -> Arc<CartState> {
    ///         let state = state.cloned().unwrap_or_default();
    ///         match action {
    ///             CartAction::ClearCart => Arc::new(CartState::default()),
    ///             _ => state,
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// Compute the next state from the current state and an action
        ///
        /// # Arguments
        ///
        /// - `state`: Current state, or `None` before the first action
        /// - `action`: The action to process
        ///
        /// # Returns
        ///
        /// The next state. Pointer-equal to `state` when the action was a no-op.
        fn reduce(
            &self,
            state: Option<&Arc<Self::State>>,
            action: &Self::Action,
        ) -> Arc<Self::State>;
    }

    impl<R: Reducer + ?Sized> Reducer for Box<R> {
        type State = R::State;
        type Action = R::Action;

        fn reduce(
            &self,
            state: Option<&Arc<Self::State>>,
            action: &Self::Action,
        ) -> Arc<Self::State> {
            (**self).reduce(state, action)
        }
    }

    impl<R: Reducer + ?Sized> Reducer for Arc<R> {
        type State = R::State;
        type Action = R::Action;

        fn reduce(
            &self,
            state: Option<&Arc<Self::State>>,
            action: &Self::Action,
        ) -> Arc<Self::State> {
            (**self).reduce(state, action)
        }
    }
}

/// Reducer composition (keyed slices)
pub mod composition;

/// Change detection for selected values
pub mod identity;

// Re-export core types for convenience
pub use action::Action;
pub use composition::{CombinedReducer, combine_reducers};
pub use identity::Identity;
pub use reducer::Reducer;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    struct Tally {
        hits: u32,
    }

    #[derive(Clone, Debug)]
    enum TallyAction {
        Init,
        Hit,
        Ignore,
    }

    impl Action for TallyAction {
        fn init() -> Self {
            Self::Init
        }

        fn action_type(&self) -> &'static str {
            match self {
                Self::Init => "@@INIT",
                Self::Hit => "HIT",
                Self::Ignore => "IGNORE",
            }
        }
    }

    struct TallyReducer;

    impl Reducer for TallyReducer {
        type State = Tally;
        type Action = TallyAction;

        fn reduce(&self, state: Option<&Arc<Tally>>, action: &TallyAction) -> Arc<Tally> {
            let state = state.cloned().unwrap_or_default();
            match action {
                TallyAction::Hit => Arc::new(Tally {
                    hits: state.hits + 1,
                }),
                TallyAction::Init | TallyAction::Ignore => state,
            }
        }
    }

    #[test]
    fn test_absent_state_is_substituted() {
        let state = TallyReducer.reduce(None, &TallyAction::init());
        assert_eq!(*state, Tally::default());
    }

    #[test]
    fn test_noop_returns_same_arc() {
        let state = Arc::new(Tally { hits: 3 });
        let next = TallyReducer.reduce(Some(&state), &TallyAction::Ignore);
        assert!(Arc::ptr_eq(&state, &next));
    }

    #[test]
    fn test_boxed_and_shared_reducers_delegate() {
        let boxed: Box<TallyReducer> = Box::new(TallyReducer);
        let shared = Arc::new(TallyReducer);

        let state = boxed.reduce(None, &TallyAction::Hit);
        let state = shared.reduce(Some(&state), &TallyAction::Hit);
        assert_eq!(state.hits, 2);
    }
}
