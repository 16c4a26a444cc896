//! Selectors: pure projections of [`AppState`].
//!
//! Selectors returning an `Arc` hand out the slice itself, so a binding
//! over them only updates when that slice was actually replaced.

use crate::types::{AppState, CartItems, CartState, ProductId};
use std::sync::Arc;

/// The whole cart slice
#[must_use]
pub fn cart_slice(state: &AppState) -> Arc<CartState> {
    Arc::clone(&state.cart)
}

/// The cart's item map
#[must_use]
pub fn cart_items(state: &AppState) -> Arc<CartItems> {
    Arc::clone(&state.cart.items)
}

/// Number of plants in the cart, counting quantities
#[must_use]
pub fn total_qty(state: &AppState) -> u64 {
    state.cart.total_qty()
}

/// Price of everything in the cart
#[must_use]
pub fn total_cost(state: &AppState) -> u64 {
    state.cart.total_cost()
}

/// Selector telling whether `id` is in the cart
pub fn is_in_cart(id: ProductId) -> impl Fn(&AppState) -> bool + Send + Sync + 'static {
    move |state| state.cart.contains(id)
}
