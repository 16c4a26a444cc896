//! View bindings.
//!
//! Views never hold a [`Store`]. They are handed a [`StoreProvider`] and
//! use it to obtain:
//!
//! - a [`Dispatcher`], to send actions
//! - a [`Selected`] value, a projection of state that tracks the store
//!
//! A `Selected` re-runs its selector after each state change and only
//! records (and reports) a new value when [`Identity::is_same`] says it
//! differs from the previous one. Dropping a `Selected` releases its store
//! subscription.
//!
//! # Example
//!
//! ```ignore
//! let provider = store.provider();
//!
//! let dispatch = provider.dispatcher();
//! let badge = provider.select(selectors::total_qty);
//!
//! dispatch.dispatch(CartAction::IncrementQty { id });
//! if badge.take_changed() {
//!     render_badge(badge.get());
//! }
//! ```

use crate::error::StoreError;
use crate::store::Store;
use crate::subscription::{Listener, Subscription};
use haven_core::{Action, Identity, Reducer};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

/// Read side of a store, as seen by bindings
pub trait StateSource<S>: Send + Sync {
    /// The current state snapshot
    fn state(&self) -> Arc<S>;

    /// Number of state replacements so far
    fn version(&self) -> u64;

    /// Register a listener notified after every dispatch
    fn subscribe_listener(&self, listener: Listener) -> Subscription;
}

/// Write side of a store, as seen by bindings
pub trait ActionSink<A>: Send + Sync {
    /// Dispatch an action
    fn dispatch(&self, action: A);
}

impl<S, A, R> StateSource<S> for Store<S, A, R>
where
    R: Reducer<State = S, Action = A> + Send + Sync + 'static,
    A: Action,
    S: Send + Sync + 'static,
{
    fn state(&self) -> Arc<S> {
        self.get_state()
    }

    fn version(&self) -> u64 {
        Store::version(self)
    }

    fn subscribe_listener(&self, listener: Listener) -> Subscription {
        self.subscribe(move || listener())
    }
}

impl<S, A, R> ActionSink<A> for Store<S, A, R>
where
    R: Reducer<State = S, Action = A> + Send + Sync + 'static,
    A: Action,
    S: Send + Sync + 'static,
{
    fn dispatch(&self, action: A) {
        Store::dispatch(self, action);
    }
}

/// The handle through which views reach a store
///
/// Constructed once from a [`Store`] and passed to every view explicitly.
/// Cloning is cheap.
pub struct StoreProvider<S, A> {
    source: Arc<dyn StateSource<S>>,
    sink: Arc<dyn ActionSink<A>>,
}

impl<S, A> Clone for StoreProvider<S, A> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<S, A> std::fmt::Debug for StoreProvider<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreProvider")
            .field("version", &self.source.version())
            .finish_non_exhaustive()
    }
}

/// Boxed selector as stored inside a binding
type BoxedSelector<S, T> = Box<dyn Fn(&S) -> Result<T, StoreError> + Send + Sync>;

/// Consumer callback for new values
type ChangeHandler<T> = Box<dyn FnMut(&T) + Send>;

/// Consumer callback for selector failures
type ErrorHandler = Box<dyn FnMut(StoreError) + Send>;

impl<S, A> StoreProvider<S, A>
where
    S: Send + Sync + 'static,
    A: 'static,
{
    /// Create a provider for `store`
    #[must_use]
    pub fn new<R>(store: &Store<S, A, R>) -> Self
    where
        R: Reducer<State = S, Action = A> + Send + Sync + 'static,
        A: Action,
    {
        Self {
            source: Arc::new(store.clone()),
            sink: Arc::new(store.clone()),
        }
    }

    /// Create a provider from arbitrary read and write sides
    #[must_use]
    pub fn from_parts(source: Arc<dyn StateSource<S>>, sink: Arc<dyn ActionSink<A>>) -> Self {
        Self { source, sink }
    }

    /// Get a dispatch capability for a view
    #[must_use]
    pub fn dispatcher(&self) -> Dispatcher<A> {
        Dispatcher {
            sink: Arc::clone(&self.sink),
        }
    }

    /// Read the current state once, without tracking it
    #[must_use]
    pub fn state(&self) -> Arc<S> {
        self.source.state()
    }

    /// Bind a selector in pull mode
    ///
    /// The view reads the value with [`Selected::get`] and asks whether it
    /// moved with [`Selected::take_changed`].
    ///
    /// # Panics
    ///
    /// A panicking selector unwinds to the caller here, and to the caller
    /// of `dispatch` on later derivations.
    #[must_use]
    pub fn select<T, F>(&self, selector: F) -> Selected<S, T>
    where
        F: Fn(&S) -> T + Send + Sync + 'static,
        T: Identity + Clone + Send + 'static,
    {
        self.bind_infallible(selector, None)
    }

    /// Bind a selector in push mode
    ///
    /// `on_change` runs once for every value that differs from the previous
    /// one. It is not called for the initial value.
    ///
    /// # Panics
    ///
    /// A panicking selector or handler unwinds to the caller of `dispatch`.
    #[must_use]
    pub fn select_with<T, F, C>(&self, selector: F, on_change: C) -> Selected<S, T>
    where
        F: Fn(&S) -> T + Send + Sync + 'static,
        T: Identity + Clone + Send + 'static,
        C: FnMut(&T) + Send + 'static,
    {
        self.bind_infallible(selector, Some(Box::new(on_change)))
    }

    /// Bind a fallible selector
    ///
    /// Failures after the initial derivation are handed to `on_error`; the
    /// previous value is kept and nothing is retried. New values are
    /// available through [`Selected::get`] and [`Selected::take_changed`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SelectorFailed`] if the selector fails on the
    /// current state.
    pub fn try_select<T, E, F, H>(
        &self,
        selector: F,
        on_error: H,
    ) -> Result<Selected<S, T>, StoreError>
    where
        F: Fn(&S) -> Result<T, E> + Send + Sync + 'static,
        E: std::fmt::Display,
        T: Identity + Clone + Send + 'static,
        H: FnMut(StoreError) + Send + 'static,
    {
        self.bind(
            Box::new(move |state: &S| {
                selector(state).map_err(|error| StoreError::SelectorFailed(error.to_string()))
            }),
            None,
            Some(Box::new(on_error)),
        )
    }

    fn bind_infallible<T, F>(&self, selector: F, on_change: Option<ChangeHandler<T>>) -> Selected<S, T>
    where
        F: Fn(&S) -> T + Send + Sync + 'static,
        T: Identity + Clone + Send + 'static,
    {
        let version = self.source.version();
        let initial = selector(&self.source.state());
        self.attach(
            Box::new(move |state: &S| Ok::<T, StoreError>(selector(state))),
            initial,
            version,
            on_change,
            None,
        )
    }

    fn bind<T>(
        &self,
        selector: BoxedSelector<S, T>,
        on_change: Option<ChangeHandler<T>>,
        on_error: Option<ErrorHandler>,
    ) -> Result<Selected<S, T>, StoreError>
    where
        T: Identity + Clone + Send + 'static,
    {
        let version = self.source.version();
        let state = self.source.state();
        let initial = selector(&state)?;
        Ok(self.attach(selector, initial, version, on_change, on_error))
    }

    fn attach<T>(
        &self,
        selector: BoxedSelector<S, T>,
        initial: T,
        version: u64,
        on_change: Option<ChangeHandler<T>>,
        on_error: Option<ErrorHandler>,
    ) -> Selected<S, T>
    where
        T: Identity + Clone + Send + 'static,
    {
        let core = Arc::new(SelectionCore {
            source: Arc::clone(&self.source),
            selector,
            current: Mutex::new(Current {
                value: initial,
                seen_version: version,
                changed: false,
                undelivered: false,
                updates: 0,
                errors: Vec::new(),
            }),
            consumer: Mutex::new(Consumer {
                on_change,
                on_error,
            }),
            active: AtomicBool::new(true),
        });

        let listener_core = Arc::clone(&core);
        let subscription = self
            .source
            .subscribe_listener(Arc::new(move || listener_core.check_for_updates()));

        // A dispatch may have landed between the initial read and subscribing.
        core.check_for_updates();

        Selected { core, subscription }
    }
}

/// Dispatch capability handed to views
///
/// Cloning is cheap; every clone dispatches to the same store.
pub struct Dispatcher<A> {
    sink: Arc<dyn ActionSink<A>>,
}

impl<A> Dispatcher<A> {
    /// Dispatch an action to the store
    pub fn dispatch(&self, action: A) {
        self.sink.dispatch(action);
    }
}

impl<A> Clone for Dispatcher<A> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<A> std::fmt::Debug for Dispatcher<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

struct Current<T> {
    value: T,
    seen_version: u64,
    /// Set on every new value, cleared by `take_changed`
    changed: bool,
    /// Set on every new value, cleared when `on_change` has seen it
    undelivered: bool,
    updates: u64,
    errors: Vec<StoreError>,
}

struct Consumer<T> {
    on_change: Option<ChangeHandler<T>>,
    on_error: Option<ErrorHandler>,
}

struct SelectionCore<S, T> {
    source: Arc<dyn StateSource<S>>,
    selector: BoxedSelector<S, T>,
    current: Mutex<Current<T>>,
    consumer: Mutex<Consumer<T>>,
    active: AtomicBool,
}

impl<S, T> SelectionCore<S, T>
where
    T: Identity + Clone,
{
    fn current(&self) -> MutexGuard<'_, Current<T>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_for_updates(&self) {
        if !self.active.load(Ordering::Acquire) {
            return;
        }

        let version = self.source.version();
        if self.current().seen_version == version {
            return;
        }

        let state = self.source.state();
        let outcome = (self.selector)(&state);

        {
            let mut current = self.current();
            current.seen_version = current.seen_version.max(version);
            match outcome {
                Ok(next) if current.value.is_same(&next) => {
                    metrics::counter!("selector_suppressed_total").increment(1);
                    return;
                },
                Ok(next) => {
                    current.value = next;
                    current.changed = true;
                    current.undelivered = true;
                    current.updates += 1;
                    metrics::counter!("selector_updates_total").increment(1);
                },
                Err(error) => {
                    tracing::debug!(%error, "Selector failed, keeping previous value");
                    current.errors.push(error);
                },
            }
        }

        self.deliver();
    }

    /// Hands pending values and errors to the consumer.
    ///
    /// If a delivery is already running further up the stack (the consumer
    /// dispatched from inside its callback) this returns immediately and the
    /// running delivery picks the pending work up once the callback returns.
    fn deliver(&self) {
        loop {
            let mut consumer = match self.consumer.try_lock() {
                Ok(consumer) => consumer,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => return,
            };

            let (value, errors) = {
                let mut current = self.current();
                let value = if current.undelivered && consumer.on_change.is_some() {
                    current.undelivered = false;
                    Some(current.value.clone())
                } else {
                    current.undelivered = false;
                    None
                };
                (value, std::mem::take(&mut current.errors))
            };

            if value.is_none() && errors.is_empty() {
                return;
            }

            for error in errors {
                match consumer.on_error.as_mut() {
                    Some(on_error) => on_error(error),
                    None => tracing::error!(%error, "Selector failed with no error handler"),
                }
            }

            if let (Some(value), Some(on_change)) = (value, consumer.on_change.as_mut()) {
                on_change(&value);
            }
        }
    }
}

/// A selector bound to a store
///
/// Holds the most recently selected value. The value is only replaced when
/// the selector produces something that is not [`Identity::is_same`] as the
/// current one.
///
/// Dropping a `Selected` unsubscribes it from the store.
pub struct Selected<S, T> {
    core: Arc<SelectionCore<S, T>>,
    subscription: Subscription,
}

impl<S, T> Selected<S, T>
where
    T: Identity + Clone,
{
    /// The current selected value
    #[must_use]
    pub fn get(&self) -> T {
        self.core.current().value.clone()
    }

    /// Run `f` with the current selected value
    ///
    /// `f` sees a copy taken when the call starts, so it may dispatch.
    pub fn with<U>(&self, f: impl FnOnce(&T) -> U) -> U {
        let value = self.get();
        f(&value)
    }

    /// Returns true once after the value changed, then false until it changes again
    pub fn take_changed(&self) -> bool {
        std::mem::take(&mut self.core.current().changed)
    }

    /// Number of times a new value has been recorded
    #[must_use]
    pub fn updates(&self) -> u64 {
        self.core.current().updates
    }

    /// Returns true while the binding is subscribed to the store
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.subscription.is_active()
    }
}

impl<S, T> Drop for Selected<S, T> {
    fn drop(&mut self) {
        self.core.active.store(false, Ordering::Release);
        self.subscription.unsubscribe();
    }
}

impl<S, T: std::fmt::Debug> std::fmt::Debug for Selected<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let current = self.core.current.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Selected")
            .field("value", &current.value)
            .field("updates", &current.updates)
            .finish_non_exhaustive()
    }
}
