//! # Haven Runtime
//!
//! Runtime implementation for the Houseplant Haven state container.
//!
//! This crate provides the Store that owns application state and the binding
//! layer views use to talk to it.
//!
//! ## Core Components
//!
//! - **Store**: Holds the current state, runs the reducer on `dispatch`, notifies listeners
//! - **Subscription**: Guard returned by `subscribe`; dropping it unregisters the listener
//! - **StoreProvider**: The handle views receive instead of the store itself
//! - **Selected**: A selector bound to the store that only updates when its value changes
//!
//! ## Example
//!
//! ```ignore
//! use haven_runtime::Store;
//!
//! let store = Store::new(root_reducer());
//!
//! let subscription = store.subscribe(|| println!("state changed"));
//! store.dispatch(CartAction::ClearCart);
//!
//! let items = store.state(|s| s.cart.items.len());
//! ```

use std::sync::Arc;

/// Listener registry and subscription guards
pub mod subscription;

/// View bindings (dispatcher and selector accessors)
pub mod binding;

/// Prometheus metrics for observability
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// An encoded action could not be decoded
        ///
        /// Nothing was dispatched and the state is unchanged.
        #[error("Malformed action: {0}")]
        MalformedAction(String),

        /// A fallible selector returned an error
        ///
        /// Returned from the initial derivation, or handed to the consumer's
        /// error handler for later derivations. Never retried.
        #[error("Selector failed: {0}")]
        SelectorFailed(String),
    }
}

pub use binding::{ActionSink, Dispatcher, Selected, StateSource, StoreProvider};
pub use error::StoreError;
pub use subscription::{Listener, ListenerId, Subscription};

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use haven_runtime::StoreConfig;
///
/// let config = StoreConfig::default()
///     .with_name("storefront")
///     .with_isolated_listeners(true);
///
/// assert_eq!(config.name, "storefront");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Label attached to tracing events and metrics
    pub name: &'static str,
    /// Catch listener panics and keep notifying the remaining listeners
    ///
    /// When disabled, a panicking listener aborts the notification round and
    /// the panic reaches the caller of `dispatch`.
    pub isolate_listener_panics: bool,
    /// Initial capacity of the listener registry
    pub listener_capacity: usize,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(
        name: &'static str,
        isolate_listener_panics: bool,
        listener_capacity: usize,
    ) -> Self {
        Self {
            name,
            isolate_listener_panics,
            listener_capacity,
        }
    }

    /// Set the store name
    #[must_use]
    pub const fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Enable or disable listener panic isolation
    #[must_use]
    pub const fn with_isolated_listeners(mut self, isolate: bool) -> Self {
        self.isolate_listener_panics = isolate;
        self
    }

    /// Set the initial listener registry capacity
    #[must_use]
    pub const fn with_listener_capacity(mut self, capacity: usize) -> Self {
        self.listener_capacity = capacity;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "store",
            isolate_listener_panics: false,
            listener_capacity: 8,
        }
    }
}

/// Store module - The runtime state holder
pub mod store {
    use super::{Arc, StoreConfig, StoreError};
    use crate::binding::StoreProvider;
    use crate::subscription::{ListenerRegistry, Subscription};
    use haven_core::{Action, Reducer};
    use serde::de::DeserializeOwned;
    use std::any::Any;
    use std::marker::PhantomData;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{PoisonError, RwLock};
    use std::time::Instant;

    /// The Store - owns the current state of the application
    ///
    /// The Store manages:
    /// 1. State (an `Arc` snapshot, swapped on every change)
    /// 2. Reducer (the pure transition function)
    /// 3. Listeners (notified after every dispatch, in subscription order)
    ///
    /// Cloning a `Store` is cheap and yields another handle to the same state.
    /// Independent stores are created with [`Store::new`].
    ///
    /// # Concurrency
    ///
    /// Dispatch is synchronous: the reducer runs and every listener is
    /// notified before `dispatch` returns. Applying the reducer and swapping
    /// the state happens under a write lock, so readers never see a partial
    /// update. Listeners run with no lock held and may read state, subscribe,
    /// unsubscribe or dispatch again.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `R`: Reducer implementation
    ///
    /// # Example
    ///
    /// ```ignore
    /// let store = Store::new(root_reducer());
    ///
    /// store.dispatch(CartAction::AddToCart { plant: catalog::PLANTS[0].clone() });
    /// assert_eq!(store.state(|s| s.cart.len()), 1);
    /// ```
    pub struct Store<S, A, R> {
        inner: Arc<Inner<S, A, R>>,
    }

    struct Inner<S, A, R> {
        state: RwLock<Arc<S>>,
        version: AtomicU64,
        reducer: R,
        listeners: Arc<ListenerRegistry>,
        config: StoreConfig,
        _action: PhantomData<fn(A)>,
    }

    impl<S, A, R> Store<S, A, R>
    where
        R: Reducer<State = S, Action = A> + Send + Sync + 'static,
        A: Action,
        S: Send + Sync + 'static,
    {
        /// Create a new store with default configuration
        ///
        /// The initial state is produced by the reducer itself, by reducing
        /// [`Action::init`] against an absent state.
        #[must_use]
        pub fn new(reducer: R) -> Self {
            Self::with_config(reducer, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        #[must_use]
        pub fn with_config(reducer: R, config: StoreConfig) -> Self {
            let init = A::init();
            let state = reducer.reduce(None, &init);

            tracing::debug!(
                store = config.name,
                action = init.action_type(),
                "Store initialized"
            );

            Self {
                inner: Arc::new(Inner {
                    state: RwLock::new(state),
                    version: AtomicU64::new(0),
                    reducer,
                    listeners: Arc::new(ListenerRegistry::with_capacity(
                        config.name,
                        config.listener_capacity,
                    )),
                    config,
                    _action: PhantomData,
                }),
            }
        }

        /// Get the current state snapshot
        ///
        /// The returned `Arc` is immutable; later dispatches swap in a new
        /// snapshot and leave this one untouched.
        #[must_use]
        pub fn get_state(&self) -> Arc<S> {
            Arc::clone(
                &self
                    .inner
                    .state
                    .read()
                    .unwrap_or_else(PoisonError::into_inner),
            )
        }

        /// Read a value out of the current state
        ///
        /// # Example
        ///
        /// ```ignore
        /// let count = store.state(|s| s.cart.items.len());
        /// ```
        pub fn state<T>(&self, f: impl FnOnce(&S) -> T) -> T {
            f(&self.get_state())
        }

        /// Number of dispatches that replaced the state reference
        #[must_use]
        pub fn version(&self) -> u64 {
            self.inner.version.load(Ordering::Acquire)
        }

        /// Get the store configuration
        #[must_use]
        pub fn config(&self) -> &StoreConfig {
            &self.inner.config
        }

        /// Number of currently registered listeners
        #[must_use]
        pub fn listener_count(&self) -> usize {
            self.inner.listeners.len()
        }

        /// Dispatch an action to the store
        ///
        /// 1. Acquires the write lock on state
        /// 2. Calls the reducer with (state, action)
        /// 3. Swaps in the new state if the reducer returned a new reference
        /// 4. Notifies every listener subscribed when the round starts, in order
        ///
        /// Listeners are notified even when the state did not change.
        ///
        /// # Panics
        ///
        /// A panicking reducer propagates and leaves the previous state in
        /// place. A panicking listener propagates too, unless
        /// [`StoreConfig::isolate_listener_panics`] is set.
        #[tracing::instrument(
            level = "debug",
            skip_all,
            name = "store_dispatch",
            fields(store = self.inner.config.name, action = action.action_type())
        )]
        pub fn dispatch(&self, action: A) {
            let started = Instant::now();

            let changed = {
                let mut state = self
                    .inner
                    .state
                    .write()
                    .unwrap_or_else(PoisonError::into_inner);
                let next = self.inner.reducer.reduce(Some(&*state), &action);
                let changed = !Arc::ptr_eq(&state, &next);
                if changed {
                    *state = next;
                    self.inner.version.fetch_add(1, Ordering::AcqRel);
                }
                changed
            };

            metrics::counter!("store_dispatch_total", "store" => self.inner.config.name)
                .increment(1);
            if changed {
                metrics::counter!("store_state_changes_total", "store" => self.inner.config.name)
                    .increment(1);
            } else {
                tracing::debug!("Action left state unchanged");
            }

            self.notify();

            metrics::histogram!(
                "store_dispatch_duration_seconds",
                "store" => self.inner.config.name
            )
            .record(started.elapsed().as_secs_f64());
        }

        /// Decode a JSON-encoded action and dispatch it
        ///
        /// Actions are expected in tagged form, e.g.
        /// `{"type": "REMOVE_FROM_CART", "id": 4}`. How unknown `type` values
        /// decode is up to the action type; a catch-all variant makes them a
        /// no-op.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::MalformedAction`] if `payload` cannot be decoded.
        /// Nothing is dispatched in that case.
        pub fn dispatch_json(&self, payload: &str) -> Result<(), StoreError>
        where
            A: DeserializeOwned,
        {
            let action = serde_json::from_str::<A>(payload).map_err(|error| {
                tracing::warn!(
                    store = self.inner.config.name,
                    %error,
                    "Dropping malformed action"
                );
                metrics::counter!("store_malformed_actions_total", "store" => self.inner.config.name)
                    .increment(1);
                StoreError::MalformedAction(error.to_string())
            })?;

            self.dispatch(action);
            Ok(())
        }

        /// Register a listener notified after every dispatch
        ///
        /// Listeners take no arguments; they read what they need through
        /// [`Store::get_state`]. The returned [`Subscription`] unregisters the
        /// listener when dropped or when [`Subscription::unsubscribe`] is called.
        ///
        /// # Example
        ///
        /// ```ignore
        /// let subscription = store.subscribe(|| tracing::info!("cart changed"));
        /// store.dispatch(CartAction::ClearCart);
        /// subscription.unsubscribe();
        /// ```
        pub fn subscribe<F>(&self, listener: F) -> Subscription
        where
            F: Fn() + Send + Sync + 'static,
        {
            Subscription::register(&self.inner.listeners, Arc::new(listener))
        }

        /// Create the provider views use to reach this store
        #[must_use]
        pub fn provider(&self) -> StoreProvider<S, A> {
            StoreProvider::new(self)
        }

        fn notify(&self) {
            let listeners = self.inner.listeners.snapshot();
            metrics::counter!(
                "store_listener_notifications_total",
                "store" => self.inner.config.name
            )
            .increment(listeners.len() as u64);

            for listener in listeners {
                if !self.inner.config.isolate_listener_panics {
                    listener();
                    continue;
                }

                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| listener())) {
                    tracing::error!(
                        store = self.inner.config.name,
                        message = panic_message(payload.as_ref()),
                        "Listener panicked, continuing with remaining listeners"
                    );
                    metrics::counter!(
                        "store_listener_panics_total",
                        "store" => self.inner.config.name
                    )
                    .increment(1);
                }
            }
        }
    }

    impl<S, A, R> Clone for Store<S, A, R> {
        fn clone(&self) -> Self {
            Self {
                inner: Arc::clone(&self.inner),
            }
        }
    }

    impl<S, A, R> std::fmt::Debug for Store<S, A, R> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Store")
                .field("name", &self.inner.config.name)
                .field("version", &self.inner.version.load(Ordering::Relaxed))
                .field("listeners", &self.inner.listeners.len())
                .finish_non_exhaustive()
        }
    }

    fn panic_message(payload: &(dyn Any + Send)) -> &str {
        if let Some(message) = payload.downcast_ref::<&'static str>() {
            return message;
        }
        if let Some(message) = payload.downcast_ref::<String>() {
            return message;
        }
        "<non-string panic payload>"
    }
}

pub use store::Store;
