//! Cart actions.
//!
//! Encoded as tagged JSON objects, for example
//! `{"type": "INCREMENT_QTY", "id": 1}`. Any `type` not listed here decodes
//! to [`CartAction::Unknown`], which every reducer ignores.

use crate::types::{Product, ProductId};
use haven_macros::Action;
use serde::{Deserialize, Serialize};

/// Everything that can happen to the cart
#[derive(Action, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CartAction {
    /// Dispatched once when a store boots
    #[init]
    #[action_type = "@@INIT"]
    #[serde(rename = "@@INIT")]
    Init,

    /// Put a product in the cart with quantity 1
    AddToCart {
        /// The product to add
        plant: Product,
    },

    /// Take a product out of the cart
    RemoveFromCart {
        /// Product to remove
        id: ProductId,
    },

    /// Raise a product's quantity by one
    IncrementQty {
        /// Product to change
        id: ProductId,
    },

    /// Lower a product's quantity by one, never below 1
    DecrementQty {
        /// Product to change
        id: ProductId,
    },

    /// Empty the cart
    ClearCart,

    /// Any action type this application does not know
    #[serde(other)]
    Unknown,
}

impl CartAction {
    /// `AddToCart` for `plant`
    #[must_use]
    pub fn add_to_cart(plant: &Product) -> Self {
        Self::AddToCart {
            plant: plant.clone(),
        }
    }

    /// `RemoveFromCart` for `id`
    #[must_use]
    pub const fn remove_from_cart(id: ProductId) -> Self {
        Self::RemoveFromCart { id }
    }

    /// `IncrementQty` for `id`
    #[must_use]
    pub const fn increment_qty(id: ProductId) -> Self {
        Self::IncrementQty { id }
    }

    /// `DecrementQty` for `id`
    #[must_use]
    pub const fn decrement_qty(id: ProductId) -> Self {
        Self::DecrementQty { id }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use haven_core::Action as _;

    #[test]
    fn test_action_types() {
        assert_eq!(CartAction::init().action_type(), "@@INIT");
        assert_eq!(CartAction::ClearCart.action_type(), "CLEAR_CART");
        assert_eq!(
            CartAction::increment_qty(ProductId::new(1)).action_type(),
            "INCREMENT_QTY"
        );
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(CartAction::remove_from_cart(ProductId::new(4))).unwrap();
        assert_eq!(json, serde_json::json!({"type": "REMOVE_FROM_CART", "id": 4}));

        let decoded: CartAction = serde_json::from_str(r#"{"type":"DECREMENT_QTY","id":2}"#).unwrap();
        assert_eq!(decoded, CartAction::decrement_qty(ProductId::new(2)));
    }

    #[test]
    fn test_unknown_type_decodes_to_catch_all() {
        let decoded: CartAction = serde_json::from_str(r#"{"type":"WATER_PLANTS"}"#).unwrap();
        assert_eq!(decoded, CartAction::Unknown);
    }

    #[test]
    fn test_missing_type_is_an_error() {
        assert!(serde_json::from_str::<CartAction>(r#"{"id":2}"#).is_err());
    }
}
