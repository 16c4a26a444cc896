//! Cart reducer and the application's root reducer.
//!
//! The cart reducer never touches the state it is given. A transition that
//! changes nothing hands back the very same `Arc`, and a transition that does
//! change something copies the item map while sharing every untouched item.

use crate::action::CartAction;
use crate::types::{AppState, CartItem, CartItems, CartState, ProductId};
use haven_core::{CombinedReducer, Reducer, combine_reducers};
use haven_runtime::{Store, StoreConfig};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Reducer for the cart slice
#[derive(Debug, Clone, Copy, Default)]
pub struct CartReducer;

impl CartReducer {
    /// Creates a new `CartReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn with_items(state: &CartState, edit: impl FnOnce(&mut CartItems)) -> Arc<CartState> {
        let mut items = (*state.items).clone();
        edit(&mut items);
        Arc::new(CartState::from_items(items))
    }

    fn set_qty(
        state: &Arc<CartState>,
        id: ProductId,
        qty: impl FnOnce(NonZeroU32) -> Option<NonZeroU32>,
    ) -> Arc<CartState> {
        let Some(item) = state.get(id) else {
            tracing::debug!(%id, "Product not in cart, ignoring");
            return Arc::clone(state);
        };
        let Some(qty) = qty(item.qty) else {
            return Arc::clone(state);
        };
        let item = Arc::new(item.with_qty(qty));
        Self::with_items(state, |items| {
            items.insert(id, item);
        })
    }
}

impl Reducer for CartReducer {
    type State = CartState;
    type Action = CartAction;

    fn reduce(&self, state: Option<&Arc<CartState>>, action: &CartAction) -> Arc<CartState> {
        let state = state.cloned().unwrap_or_default();

        match action {
            CartAction::AddToCart { plant } => {
                if state.contains(plant.id) {
                    return state;
                }
                Self::with_items(&state, |items| {
                    items.insert(plant.id, Arc::new(CartItem::new(plant.clone())));
                })
            },
            CartAction::RemoveFromCart { id } => {
                if !state.contains(*id) {
                    return state;
                }
                Self::with_items(&state, |items| {
                    items.remove(id);
                })
            },
            CartAction::IncrementQty { id } => {
                Self::set_qty(&state, *id, |qty| qty.checked_add(1))
            },
            CartAction::DecrementQty { id } => {
                Self::set_qty(&state, *id, |qty| NonZeroU32::new(qty.get() - 1))
            },
            CartAction::ClearCart => {
                if state.is_empty() {
                    return state;
                }
                Arc::new(CartState::new())
            },
            CartAction::Init | CartAction::Unknown => state,
        }
    }
}

/// The application's root reducer
pub type RootReducer = CombinedReducer<AppState, CartAction>;

/// The store type used by the storefront
pub type StorefrontStore = Store<AppState, CartAction, RootReducer>;

/// Combine every slice reducer into the reducer for [`AppState`]
#[must_use]
pub fn root_reducer() -> RootReducer {
    combine_reducers::<AppState, CartAction>().slice(
        "cart",
        CartReducer::new(),
        |state| &state.cart,
        |state, cart| state.cart = cart,
    )
}

/// Create a storefront store
#[must_use]
pub fn create_store(config: StoreConfig) -> StorefrontStore {
    Store::with_config(root_reducer(), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use haven_core::Action as _;
    use haven_testing::ReducerTest;

    fn monstera() -> &'static crate::types::Product {
        &catalog::PLANTS[0]
    }

    fn cart_with(entries: &[(usize, u32)]) -> CartState {
        let mut items = CartItems::new();
        for &(index, qty) in entries {
            let plant = &catalog::PLANTS[index];
            let mut item = CartItem::new(plant.clone());
            if let Some(qty) = NonZeroU32::new(qty) {
                item.qty = qty;
            }
            items.insert(plant.id, Arc::new(item));
        }
        CartState::from_items(items)
    }

    #[test]
    fn test_boots_empty() {
        let state = CartReducer.reduce(None, &CartAction::init());
        assert!(state.is_empty());
    }

    #[test]
    fn test_add_inserts_with_qty_one() {
        ReducerTest::new(CartReducer)
            .given_state(CartState::new())
            .when_action(CartAction::add_to_cart(monstera()))
            .then_changed()
            .then_state(|state| {
                assert_eq!(state.qty(ProductId::new(1)), Some(1));
                assert_eq!(state.len(), 1);
            })
            .run();
    }

    #[test]
    fn test_add_existing_is_noop() {
        ReducerTest::new(CartReducer)
            .given_state(cart_with(&[(0, 3)]))
            .when_action(CartAction::add_to_cart(monstera()))
            .then_unchanged()
            .then_state(|state| assert_eq!(state.qty(ProductId::new(1)), Some(3)))
            .run();
    }

    #[test]
    fn test_remove_absent_is_noop() {
        ReducerTest::new(CartReducer)
            .given_state(cart_with(&[(0, 1)]))
            .when_action(CartAction::remove_from_cart(ProductId::new(5)))
            .then_unchanged()
            .run();
    }

    #[test]
    fn test_remove_present() {
        ReducerTest::new(CartReducer)
            .given_state(cart_with(&[(0, 1), (3, 2)]))
            .when_action(CartAction::remove_from_cart(ProductId::new(1)))
            .then_changed()
            .then_state(|state| {
                assert!(!state.contains(ProductId::new(1)));
                assert_eq!(state.qty(ProductId::new(4)), Some(2));
            })
            .run();
    }

    #[test]
    fn test_increment_and_decrement() {
        ReducerTest::new(CartReducer)
            .given_state(cart_with(&[(0, 1)]))
            .when_actions([
                CartAction::increment_qty(ProductId::new(1)),
                CartAction::increment_qty(ProductId::new(1)),
                CartAction::decrement_qty(ProductId::new(1)),
            ])
            .then_state(|state| assert_eq!(state.qty(ProductId::new(1)), Some(2)))
            .run();
    }

    #[test]
    fn test_increment_absent_is_noop() {
        ReducerTest::new(CartReducer)
            .given_state(cart_with(&[(0, 1)]))
            .when_action(CartAction::increment_qty(ProductId::new(2)))
            .then_unchanged()
            .run();
    }

    #[test]
    fn test_decrement_stops_at_one() {
        ReducerTest::new(CartReducer)
            .given_state(cart_with(&[(0, 1)]))
            .when_action(CartAction::decrement_qty(ProductId::new(1)))
            .then_unchanged()
            .then_state(|state| assert_eq!(state.qty(ProductId::new(1)), Some(1)))
            .run();
    }

    #[test]
    fn test_increment_overflow_is_noop() {
        ReducerTest::new(CartReducer)
            .given_state(cart_with(&[(0, u32::MAX)]))
            .when_action(CartAction::increment_qty(ProductId::new(1)))
            .then_unchanged()
            .run();
    }

    #[test]
    fn test_clear() {
        ReducerTest::new(CartReducer)
            .given_state(cart_with(&[(0, 2), (1, 1)]))
            .when_action(CartAction::ClearCart)
            .then_changed()
            .then_state(|state| assert!(state.is_empty()))
            .run();
    }

    #[test]
    fn test_clear_empty_is_noop() {
        ReducerTest::new(CartReducer)
            .given_state(CartState::new())
            .when_action(CartAction::ClearCart)
            .then_unchanged()
            .run();
    }

    #[test]
    fn test_unknown_is_noop() {
        ReducerTest::new(CartReducer)
            .given_state(cart_with(&[(2, 1)]))
            .when_action(CartAction::Unknown)
            .then_unchanged()
            .run();
    }

    #[test]
    fn test_untouched_items_are_shared() {
        let before = Arc::new(cart_with(&[(0, 1), (3, 1)]));
        let after = CartReducer.reduce(Some(&before), &CartAction::increment_qty(ProductId::new(1)));

        let untouched_before = before.get(ProductId::new(4));
        let untouched_after = after.get(ProductId::new(4));
        assert!(matches!(
            (untouched_before, untouched_after),
            (Some(a), Some(b)) if Arc::ptr_eq(a, b)
        ));
        assert_eq!(before.qty(ProductId::new(1)), Some(1));
    }

    #[test]
    fn test_noops_on_a_store_slice_keep_its_reference() {
        let store = create_store(StoreConfig::default());
        store.dispatch(CartAction::add_to_cart(monstera()));

        ReducerTest::new(CartReducer)
            .given_shared_state(store.state(|app| Arc::clone(&app.cart)))
            .when_action(CartAction::add_to_cart(monstera()))
            .when_action(CartAction::decrement_qty(ProductId::new(1)))
            .then_unchanged()
            .run();
    }

    #[test]
    fn test_root_reducer_keeps_identity_for_noop() {
        let root = root_reducer();
        let state = root.reduce(None, &CartAction::init());
        let next = root.reduce(Some(&state), &CartAction::Unknown);
        assert!(Arc::ptr_eq(&state, &next));

        let added = root.reduce(Some(&state), &CartAction::add_to_cart(monstera()));
        assert!(!Arc::ptr_eq(&state, &added));
        assert_eq!(added.cart.len(), 1);
        assert!(state.cart.is_empty());
    }
}
