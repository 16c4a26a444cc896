//! Integration tests for the view binding layer
//!
//! Selection suppression, push delivery, fallible selectors and the
//! subscription lifecycle of `Selected`.

#![allow(clippy::unwrap_used)] // Test code

use haven_core::{Action, CombinedReducer, Reducer, combine_reducers};
use haven_runtime::{Selected, Store, StoreError, StoreProvider};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, Default, PartialEq)]
struct Shelf {
    pots: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Garden {
    beds: u32,
}

#[derive(Clone, Debug, Default)]
struct Home {
    shelf: Arc<Shelf>,
    garden: Arc<Garden>,
}

#[derive(Clone, Debug)]
enum HomeAction {
    Init,
    AddPot,
    DigBed,
}

impl Action for HomeAction {
    fn init() -> Self {
        Self::Init
    }

    fn action_type(&self) -> &'static str {
        match self {
            Self::Init => "@@INIT",
            Self::AddPot => "ADD_POT",
            Self::DigBed => "DIG_BED",
        }
    }
}

struct ShelfReducer;

impl Reducer for ShelfReducer {
    type State = Shelf;
    type Action = HomeAction;

    fn reduce(&self, state: Option<&Arc<Shelf>>, action: &HomeAction) -> Arc<Shelf> {
        let state = state.cloned().unwrap_or_default();
        match action {
            HomeAction::AddPot => Arc::new(Shelf {
                pots: state.pots + 1,
            }),
            _ => state,
        }
    }
}

struct GardenReducer;

impl Reducer for GardenReducer {
    type State = Garden;
    type Action = HomeAction;

    fn reduce(&self, state: Option<&Arc<Garden>>, action: &HomeAction) -> Arc<Garden> {
        let state = state.cloned().unwrap_or_default();
        match action {
            HomeAction::DigBed => Arc::new(Garden {
                beds: state.beds + 1,
            }),
            _ => state,
        }
    }
}

fn home_reducer() -> CombinedReducer<Home, HomeAction> {
    combine_reducers::<Home, HomeAction>()
        .slice(
            "shelf",
            ShelfReducer,
            |home| &home.shelf,
            |home, shelf| home.shelf = shelf,
        )
        .slice(
            "garden",
            GardenReducer,
            |home| &home.garden,
            |home, garden| home.garden = garden,
        )
}

type HomeStore = Store<Home, HomeAction, CombinedReducer<Home, HomeAction>>;

fn setup() -> (HomeStore, StoreProvider<Home, HomeAction>) {
    let store = Store::new(home_reducer());
    let provider = store.provider();
    (store, provider)
}

#[test]
fn test_select_reads_current_value() {
    let (store, provider) = setup();
    store.dispatch(HomeAction::AddPot);

    let pots = provider.select(|home: &Home| home.shelf.pots);

    assert_eq!(pots.get(), 1);
    assert!(!pots.take_changed());
}

#[test]
fn test_select_tracks_changes() {
    let (_store, provider) = setup();
    let dispatch = provider.dispatcher();
    let pots = provider.select(|home: &Home| home.shelf.pots);

    dispatch.dispatch(HomeAction::AddPot);

    assert_eq!(pots.get(), 1);
    assert!(pots.take_changed());
    assert!(!pots.take_changed());
    assert_eq!(pots.updates(), 1);
}

#[test]
fn test_unrelated_slice_is_suppressed() {
    let (_store, provider) = setup();
    let dispatch = provider.dispatcher();
    let garden = provider.select(|home: &Home| Arc::clone(&home.garden));
    let before = garden.get();

    dispatch.dispatch(HomeAction::AddPot);
    dispatch.dispatch(HomeAction::AddPot);

    assert!(!garden.take_changed());
    assert_eq!(garden.updates(), 0);
    assert!(Arc::ptr_eq(&before, &garden.get()));
}

#[test]
fn test_equal_primitive_is_suppressed() {
    let (_store, provider) = setup();
    let dispatch = provider.dispatcher();
    let delivered = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&delivered);
    let _has_pots = provider.select_with(
        |home: &Home| home.shelf.pots > 0,
        move |value: &bool| sink.lock().unwrap().push(*value),
    );

    dispatch.dispatch(HomeAction::AddPot);
    dispatch.dispatch(HomeAction::AddPot);
    dispatch.dispatch(HomeAction::DigBed);

    assert_eq!(*delivered.lock().unwrap(), vec![true]);
}

#[test]
fn test_push_mode_skips_initial_value() {
    let (store, provider) = setup();
    store.dispatch(HomeAction::DigBed);
    let delivered = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&delivered);
    let beds = provider.select_with(
        |home: &Home| home.garden.beds,
        move |value: &u32| sink.lock().unwrap().push(*value),
    );
    assert!(delivered.lock().unwrap().is_empty());

    store.dispatch(HomeAction::DigBed);
    store.dispatch(HomeAction::DigBed);

    assert_eq!(*delivered.lock().unwrap(), vec![2, 3]);
    assert_eq!(beds.get(), 3);
}

#[test]
fn test_selector_not_rerun_without_state_change() {
    let (store, provider) = setup();
    let runs = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&runs);
    let _pots = provider.select(move |home: &Home| {
        counter.fetch_add(1, Ordering::SeqCst);
        home.shelf.pots
    });
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    // Neither reducer cares, so the root reference and version are unchanged
    store.dispatch(HomeAction::Init);
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    store.dispatch(HomeAction::DigBed);
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

fn limited_pots(home: &Home) -> Result<u32, String> {
    if home.shelf.pots > 1 {
        Err(format!("shelf holds at most 1 pot, found {}", home.shelf.pots))
    } else {
        Ok(home.shelf.pots)
    }
}

#[test]
fn test_try_select_initial_failure_is_returned() {
    let (store, provider) = setup();
    store.dispatch(HomeAction::AddPot);
    store.dispatch(HomeAction::AddPot);

    let result = provider.try_select(limited_pots, |_| {});

    assert!(matches!(result, Err(StoreError::SelectorFailed(_))));
    assert_eq!(store.listener_count(), 0);
}

#[test]
fn test_try_select_later_failure_reaches_handler() {
    let (store, provider) = setup();
    let errors = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&errors);
    let pots = provider
        .try_select(limited_pots, move |error| sink.lock().unwrap().push(error))
        .unwrap();

    store.dispatch(HomeAction::AddPot);
    assert_eq!(pots.get(), 1);
    assert!(pots.take_changed());

    store.dispatch(HomeAction::AddPot);

    let errors = errors.lock().unwrap();
    assert_eq!(
        *errors,
        vec![StoreError::SelectorFailed(
            "shelf holds at most 1 pot, found 2".to_string()
        )]
    );
    // Previous value kept
    assert_eq!(pots.get(), 1);
    assert!(!pots.take_changed());
}

#[test]
fn test_try_select_failure_is_not_retried() {
    let (store, provider) = setup();
    let runs = Arc::new(AtomicUsize::new(0));
    let failures = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&runs);
    let failed = Arc::clone(&failures);
    let _always_failing = provider
        .try_select(
            move |home: &Home| {
                counter.fetch_add(1, Ordering::SeqCst);
                if home.garden.beds == 0 {
                    Ok(0)
                } else {
                    Err("garden closed")
                }
            },
            move |_| {
                failed.fetch_add(1, Ordering::SeqCst);
            },
        )
        .unwrap();

    store.dispatch(HomeAction::DigBed);

    assert_eq!(runs.load(Ordering::SeqCst), 2);
    assert_eq!(failures.load(Ordering::SeqCst), 1);
}

#[test]
fn test_dropping_selected_unsubscribes() {
    let (store, provider) = setup();

    let pots = provider.select(|home: &Home| home.shelf.pots);
    let beds = provider.select(|home: &Home| home.garden.beds);
    assert_eq!(store.listener_count(), 2);
    assert!(pots.is_active());

    drop(pots);
    assert_eq!(store.listener_count(), 1);

    drop(beds);
    assert_eq!(store.listener_count(), 0);
}

#[test]
fn test_selected_dropped_mid_round_is_not_delivered() {
    let (store, provider) = setup();
    let delivered = Arc::new(AtomicUsize::new(0));
    let slot: Arc<Mutex<Option<Selected<Home, u32>>>> = Arc::new(Mutex::new(None));

    let dropper = Arc::clone(&slot);
    let _teardown = store.subscribe(move || {
        dropper.lock().unwrap().take();
    });

    let counter = Arc::clone(&delivered);
    *slot.lock().unwrap() = Some(provider.select_with(
        |home: &Home| home.shelf.pots,
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        },
    ));

    store.dispatch(HomeAction::AddPot);

    assert_eq!(delivered.load(Ordering::SeqCst), 0);
    assert_eq!(store.listener_count(), 1);
}

#[test]
fn test_reentrant_dispatch_from_on_change() {
    let (store, provider) = setup();
    let delivered = Arc::new(Mutex::new(Vec::new()));

    let dispatch = provider.dispatcher();
    let sink = Arc::clone(&delivered);
    let pots = provider.select_with(
        |home: &Home| home.shelf.pots,
        move |value: &u32| {
            sink.lock().unwrap().push(*value);
            if *value == 1 {
                dispatch.dispatch(HomeAction::AddPot);
            }
        },
    );

    store.dispatch(HomeAction::AddPot);

    assert_eq!(*delivered.lock().unwrap(), vec![1, 2]);
    assert_eq!(pots.get(), 2);
    assert_eq!(store.state(|home| home.shelf.pots), 2);
}

#[test]
fn test_provider_state_reads_once() {
    let (store, provider) = setup();
    store.dispatch(HomeAction::DigBed);

    assert_eq!(provider.state().garden.beds, 1);
    assert_eq!(store.listener_count(), 0);
}

#[test]
fn test_dispatch_from_inside_with_returns() {
    let (done, finished) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let (store, provider) = setup();
        let dispatch = provider.dispatcher();
        let pots = provider.select(|home: &Home| home.shelf.pots);

        pots.with(|value| {
            if *value == 0 {
                dispatch.dispatch(HomeAction::AddPot);
            }
        });

        let _ = done.send((pots.get(), store.state(|home| home.shelf.pots)));
    });

    let outcome = finished.recv_timeout(std::time::Duration::from_secs(5));
    assert_eq!(outcome, Ok((1, 1)));
}

#[test]
fn test_provider_from_separate_parts() {
    let (store, _) = setup();
    let provider: StoreProvider<Home, HomeAction> =
        StoreProvider::from_parts(Arc::new(store.clone()), Arc::new(store.clone()));

    let beds = provider.select(|home: &Home| home.garden.beds);
    provider.dispatcher().dispatch(HomeAction::DigBed);

    assert!(beds.take_changed());
    assert_eq!(beds.get(), 1);
    assert_eq!(store.listener_count(), 1);
}

#[test]
fn test_nan_selection_is_suppressed() {
    let (_store, provider) = setup();
    let dispatch = provider.dispatcher();
    let moisture = provider.select(|home: &Home| {
        if home.garden.beds == 0 { f64::NAN } else { f64::from(home.garden.beds) }
    });

    dispatch.dispatch(HomeAction::AddPot);
    dispatch.dispatch(HomeAction::AddPot);
    assert!(!moisture.take_changed());
    assert_eq!(moisture.updates(), 0);

    dispatch.dispatch(HomeAction::DigBed);
    assert!(moisture.take_changed());
    assert!((moisture.get() - 1.0).abs() < f64::EPSILON);
}
