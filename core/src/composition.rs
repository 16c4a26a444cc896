//! Reducer composition utilities
//!
//! [`combine_reducers`] builds a root reducer out of named slice reducers.
//! Each slice owns one field of the root state; the root reducer hands every
//! slice its current value (or `None` at boot) together with the action and
//! writes the result back.
//!
//! Adding a slice means adding a field to the root state and one
//! [`CombinedReducer::slice`] call. Neither the store nor the bindings change.
//!
//! # Examples
//!
//! ```
//! use haven_core::{Action, Reducer, combine_reducers};
//! use std::sync::Arc;
//!
//! #[derive(Clone, Debug, Default)]
//! struct Count(u32);
//!
//! #[derive(Clone, Debug, Default)]
//! struct AppState {
//!     count: Arc<Count>,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum AppAction {
//!     Init,
//!     Bump,
//! }
//!
//! impl Action for AppAction {
//!     fn init() -> Self {
//!         Self::Init
//!     }
//!
//!     fn action_type(&self) -> &'static str {
//!         match self {
//!             Self::Init => "@@INIT",
//!             Self::Bump => "BUMP",
//!         }
//!     }
//! }
//!
//! struct CountReducer;
//!
//! impl Reducer for CountReducer {
//!     type State = Count;
//!     type Action = AppAction;
//!
//!     fn reduce(&self, state: Option<&Arc<Count>>, action: &AppAction) -> Arc<Count> {
//!         let state = state.cloned().unwrap_or_default();
//!         match action {
//!             AppAction::Bump => Arc::new(Count(state.0 + 1)),
//!             AppAction::Init => state,
//!         }
//!     }
//! }
//!
//! let root = combine_reducers::<AppState, AppAction>().slice(
//!     "count",
//!     CountReducer,
//!     |app| &app.count,
//!     |app, count| app.count = count,
//! );
//!
//! let state = root.reduce(None, &AppAction::init());
//! let state = root.reduce(Some(&state), &AppAction::Bump);
//! assert_eq!(state.count.0, 1);
//! ```

use crate::reducer::Reducer;
use std::sync::Arc;

/// Type alias for the lens reading a slice out of the root state
pub type SliceGetter<S, Sub> = fn(&S) -> &Arc<Sub>;

/// Type alias for the lens writing a slice into the root state
pub type SliceSetter<S, Sub> = fn(&mut S, Arc<Sub>);

/// One named slice of a [`CombinedReducer`].
trait Slice<S, A>: Send + Sync {
    fn key(&self) -> &'static str;

    /// Reduce this slice of `prev` into `next`.
    ///
    /// Returns `true` when the slice reducer produced a new reference.
    fn reduce_into(&self, prev: Option<&S>, next: &mut S, action: &A) -> bool;
}

struct ScopedSlice<S, R>
where
    R: Reducer,
{
    key: &'static str,
    reducer: R,
    get: SliceGetter<S, R::State>,
    set: SliceSetter<S, R::State>,
}

impl<S, A, R> Slice<S, A> for ScopedSlice<S, R>
where
    R: Reducer<Action = A> + Send + Sync,
{
    fn key(&self) -> &'static str {
        self.key
    }

    fn reduce_into(&self, prev: Option<&S>, next: &mut S, action: &A) -> bool {
        let current = prev.map(self.get);
        let reduced = self.reducer.reduce(current, action);
        let changed = current.is_none_or(|current| !Arc::ptr_eq(current, &reduced));
        (self.set)(next, reduced);
        changed
    }
}

/// Start building a root reducer from named slices.
///
/// # Type Parameters
///
/// - `S`: The root state. Its fields hold each slice as an `Arc`, so cloning it is shallow.
/// - `A`: The action type shared by every slice
#[must_use]
pub const fn combine_reducers<S, A>() -> CombinedReducer<S, A> {
    CombinedReducer { slices: Vec::new() }
}

/// A root reducer that delegates each named slice to its own reducer.
///
/// Created by [`combine_reducers`].
///
/// Every slice reducer runs on every action, including actions it does not
/// care about. When no slice produced a new reference the previous root state
/// is returned as-is, so root-level identity checks stay cheap.
pub struct CombinedReducer<S, A> {
    slices: Vec<Box<dyn Slice<S, A>>>,
}

impl<S, A> CombinedReducer<S, A>
where
    S: 'static,
    A: 'static,
{
    /// Register a slice reducer under `key`.
    ///
    /// `get` and `set` locate the slice inside the root state. Registering the
    /// same key twice replaces the earlier reducer.
    #[must_use]
    pub fn slice<R>(
        mut self,
        key: &'static str,
        reducer: R,
        get: SliceGetter<S, R::State>,
        set: SliceSetter<S, R::State>,
    ) -> Self
    where
        R: Reducer<Action = A> + Send + Sync + 'static,
        R::State: 'static,
    {
        let slice: Box<dyn Slice<S, A>> = Box::new(ScopedSlice {
            key,
            reducer,
            get,
            set,
        });

        if let Some(existing) = self.slices.iter_mut().find(|s| s.key() == key) {
            tracing::warn!(key, "Slice registered twice, replacing earlier reducer");
            *existing = slice;
        } else {
            self.slices.push(slice);
        }
        self
    }

    /// Names of the registered slices, in registration order
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slices.iter().map(|slice| slice.key())
    }

    /// Number of registered slices
    #[must_use]
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// Returns true if no slice has been registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

impl<S, A> Reducer for CombinedReducer<S, A>
where
    S: Clone + Default,
{
    type State = S;
    type Action = A;

    fn reduce(&self, state: Option<&Arc<S>>, action: &A) -> Arc<S> {
        let prev = state.map(AsRef::as_ref);
        let mut next = prev.cloned().unwrap_or_default();
        let mut changed = false;

        for slice in &self.slices {
            changed |= slice.reduce_into(prev, &mut next, action);
        }

        match state {
            Some(state) if !changed => Arc::clone(state),
            _ => Arc::new(next),
        }
    }
}

impl<S, A> std::fmt::Debug for CombinedReducer<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinedReducer")
            .field("slices", &self.slices.iter().map(|s| s.key()).collect::<Vec<_>>())
            .finish()
    }
}
