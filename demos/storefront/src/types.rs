//! Domain types for the storefront.
//!
//! All state is immutable once built. Collections are held behind `Arc` so a
//! transition can copy the map and keep every untouched item by reference.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::sync::Arc;

/// Unique identifier for a catalog product
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u32);

impl ProductId {
    /// Creates a `ProductId` from its numeric value
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the numeric value
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A plant offered in the catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier
    pub id: ProductId,
    /// Display name
    pub name: String,
    /// Price in whole currency units
    pub price: u32,
    /// Catalog section the product is listed under
    pub category: String,
    /// Image URL
    pub image: String,
}

/// A product in the cart together with its quantity
///
/// Serializes flat, the product fields next to `qty`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// The product as it was when added
    #[serde(flatten)]
    pub product: Product,
    /// Quantity, never zero
    pub qty: NonZeroU32,
}

impl CartItem {
    /// A fresh cart line with quantity 1
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self {
            product,
            qty: NonZeroU32::MIN,
        }
    }

    /// The same line with a different quantity
    #[must_use]
    pub fn with_qty(&self, qty: NonZeroU32) -> Self {
        Self {
            product: self.product.clone(),
            qty,
        }
    }

    /// Product identifier
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// `qty × price`
    #[must_use]
    pub fn subtotal(&self) -> u64 {
        u64::from(self.qty.get()) * u64::from(self.product.price)
    }
}

/// Items in the cart, keyed by product id
pub type CartItems = BTreeMap<ProductId, Arc<CartItem>>;

/// The cart slice
///
/// Every key in `items` equals the id of the item stored under it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    /// Items in the cart
    pub items: Arc<CartItems>,
}

impl CartState {
    /// An empty cart
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A cart holding exactly `items`
    #[must_use]
    pub fn from_items(items: CartItems) -> Self {
        Self {
            items: Arc::new(items),
        }
    }

    /// Look up an item
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Arc<CartItem>> {
        self.items.get(&id)
    }

    /// Returns true if the product is in the cart
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.items.contains_key(&id)
    }

    /// Quantity of a product, if present
    #[must_use]
    pub fn qty(&self, id: ProductId) -> Option<u32> {
        self.get(id).map(|item| item.qty.get())
    }

    /// Number of distinct products
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the cart holds nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items ordered by product id
    pub fn iter(&self) -> impl Iterator<Item = &Arc<CartItem>> {
        self.items.values()
    }

    /// Sum of all quantities
    #[must_use]
    pub fn total_qty(&self) -> u64 {
        self.iter().map(|item| u64::from(item.qty.get())).sum()
    }

    /// Sum of `qty × price` over all items
    #[must_use]
    pub fn total_cost(&self) -> u64 {
        self.iter().map(|item| item.subtotal()).sum()
    }
}

/// The application state
///
/// One field per slice. Adding a slice means adding a field here and a
/// `slice` call in [`root_reducer`](crate::reducer::root_reducer).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    /// The cart slice
    pub cart: Arc<CartState>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;

    fn plant(id: u32, price: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Plant {id}"),
            price,
            category: "Test".to_string(),
            image: String::new(),
        }
    }

    #[test]
    fn test_totals() {
        let mut items = CartItems::new();
        let monstera = CartItem::new(plant(1, 25)).with_qty(NonZeroU32::new(2).unwrap());
        items.insert(ProductId::new(1), Arc::new(monstera));
        items.insert(ProductId::new(4), Arc::new(CartItem::new(plant(4, 15))));

        let cart = CartState::from_items(items);
        assert_eq!(cart.total_cost(), 65);
        assert_eq!(cart.total_qty(), 3);
        assert_eq!(cart.qty(ProductId::new(1)), Some(2));
    }

    #[test]
    fn test_cart_item_serializes_flat() {
        let item = CartItem::new(plant(2, 18));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], 2);
        assert_eq!(json["qty"], 1);
        assert_eq!(json["price"], 18);
    }

    #[test]
    fn test_empty_cart() {
        let cart = CartState::new();
        assert!(cart.is_empty());
        assert_eq!(cart.total_cost(), 0);
        assert_eq!(cart.qty(ProductId::new(1)), None);
    }
}
