//! # Houseplant Haven
//!
//! A small storefront built on the Haven state container.
//!
//! This crate showcases:
//! - A pure cart reducer with structural sharing
//! - A root reducer combined from named slices
//! - Selectors and views that only re-render when their slice changed
//! - Explicit store injection through [`StoreProvider`](haven_runtime::StoreProvider)
//!
//! ## Example
//!
//! ```
//! use haven_runtime::StoreConfig;
//! use haven_storefront::{CartAction, ProductId, catalog, create_store, selectors};
//!
//! let store = create_store(StoreConfig::default());
//! store.dispatch(CartAction::add_to_cart(&catalog::PLANTS[0]));
//! store.dispatch(CartAction::increment_qty(ProductId::new(1)));
//!
//! assert_eq!(store.state(selectors::total_cost), 50);
//! ```

/// Cart actions
pub mod action;

/// The product catalog
pub mod catalog;

/// Cart reducer and root reducer
pub mod reducer;

/// Selectors over the application state
pub mod selectors;

/// Domain types
pub mod types;

/// Text views and routing
pub mod views;

pub use action::CartAction;
pub use reducer::{CartReducer, RootReducer, StorefrontStore, create_store, root_reducer};
pub use types::{AppState, CartItem, CartItems, CartState, Product, ProductId};
pub use views::{App, CartPage, Header, LandingPage, Page, ProductListPage, Route};
