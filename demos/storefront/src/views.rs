//! Plain-text views.
//!
//! Every view is built from a [`StoreProvider`] and keeps only what it
//! selected. Navigation is never store state: view methods that navigate
//! return the [`Route`] to go to, and [`App`] mounts the matching page.
//! Unmounting a page drops its selections, which unsubscribes them.

use crate::action::CartAction;
use crate::catalog;
use crate::selectors;
use crate::types::{AppState, CartItems, CartState, ProductId};
use haven_runtime::{Dispatcher, Selected, StoreProvider};
use std::fmt;
use std::sync::Arc;

/// Provider type every storefront view is built from
pub type Provider = StoreProvider<AppState, CartAction>;

/// A navigable page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Landing page
    Home,
    /// Product listing
    Products,
    /// Cart and checkout
    Cart,
}

impl Route {
    /// URL path of the route
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Products => "/products",
            Self::Cart => "/cart",
        }
    }

    /// Resolve a URL path
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/" => Some(Self::Home),
            "/products" => Some(Self::Products),
            "/cart" => Some(Self::Cart),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Site header with navigation and the cart badge
pub struct Header {
    total_qty: Selected<AppState, u64>,
}

impl Header {
    /// Mount the header
    #[must_use]
    pub fn new(provider: &Provider) -> Self {
        Self {
            total_qty: provider.select(selectors::total_qty),
        }
    }

    /// Cart badge count, shown only while the cart is not empty
    #[must_use]
    pub fn badge(&self) -> Option<u64> {
        Some(self.total_qty.get()).filter(|&qty| qty > 0)
    }

    /// Returns true once after the badge changed
    pub fn needs_render(&self) -> bool {
        self.total_qty.take_changed()
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Houseplant Haven | Home | Shop | Cart")?;
        if let Some(qty) = self.badge() {
            write!(f, " ({qty})")?;
        }
        writeln!(f)
    }
}

/// Landing page
#[derive(Debug, Default, Clone, Copy)]
pub struct LandingPage;

impl LandingPage {
    /// The "Get Started" button
    #[must_use]
    pub const fn get_started(self) -> Route {
        Route::Products
    }
}

impl fmt::Display for LandingPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Houseplant Haven")?;
        writeln!(
            f,
            "Welcome to Houseplant Haven! Discover a curated selection of beautiful, \
             easy-to-care-for houseplants to brighten your home and purify your air."
        )?;
        writeln!(f, "[Get Started]")
    }
}

/// Catalog listing grouped by category
pub struct ProductListPage {
    dispatch: Dispatcher<CartAction>,
    items: Selected<AppState, Arc<CartItems>>,
}

impl ProductListPage {
    /// Mount the listing
    #[must_use]
    pub fn new(provider: &Provider) -> Self {
        Self {
            dispatch: provider.dispatcher(),
            items: provider.select(selectors::cart_items),
        }
    }

    /// Returns true if the product's add button reads "Added"
    #[must_use]
    pub fn is_added(&self, id: ProductId) -> bool {
        self.items.with(|items| items.contains_key(&id))
    }

    /// Press a product's add button
    ///
    /// Returns false without dispatching when the button is disabled
    /// (product already in the cart) or the product does not exist.
    pub fn add_to_cart(&self, id: ProductId) -> bool {
        let Some(plant) = catalog::find(id) else {
            tracing::warn!(%id, "No such product");
            return false;
        };
        if self.is_added(id) {
            return false;
        }
        self.dispatch.dispatch(CartAction::add_to_cart(plant));
        true
    }

    /// Returns true once after the cart's items changed
    pub fn needs_render(&self) -> bool {
        self.items.take_changed()
    }
}

impl fmt::Display for ProductListPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Shop Houseplants")?;
        for (category, plants) in catalog::by_category() {
            writeln!(f)?;
            writeln!(f, "== {category} ==")?;
            for plant in plants {
                let button = if self.is_added(plant.id) {
                    "(Added)"
                } else {
                    "[Add to Cart]"
                };
                writeln!(f, "  {:<20} ${:<4} {button}", plant.name, plant.price)?;
            }
        }
        Ok(())
    }
}

/// Cart contents, totals and the checkout stub
pub struct CartPage {
    dispatch: Dispatcher<CartAction>,
    cart: Selected<AppState, Arc<CartState>>,
    checkout_open: bool,
}

impl CartPage {
    /// Mount the cart page
    #[must_use]
    pub fn new(provider: &Provider) -> Self {
        Self {
            dispatch: provider.dispatcher(),
            cart: provider.select(selectors::cart_slice),
            checkout_open: false,
        }
    }

    /// Returns true if the "-" button of a line is enabled
    #[must_use]
    pub fn can_decrement(&self, id: ProductId) -> bool {
        self.cart.with(|cart| cart.qty(id).is_some_and(|qty| qty > 1))
    }

    /// Press "+" on a line
    pub fn increment(&self, id: ProductId) {
        self.dispatch.dispatch(CartAction::increment_qty(id));
    }

    /// Press "-" on a line
    ///
    /// Returns false without dispatching while the button is disabled.
    pub fn decrement(&self, id: ProductId) -> bool {
        if !self.can_decrement(id) {
            return false;
        }
        self.dispatch.dispatch(CartAction::decrement_qty(id));
        true
    }

    /// Press the remove button on a line
    pub fn remove(&self, id: ProductId) {
        self.dispatch.dispatch(CartAction::remove_from_cart(id));
    }

    /// Press "Clear Cart"
    pub fn clear(&self) {
        self.dispatch.dispatch(CartAction::ClearCart);
    }

    /// Press "Continue Shopping"
    #[must_use]
    pub const fn continue_shopping(&self) -> Route {
        Route::Products
    }

    /// Press "Checkout", which only opens the notice
    pub fn open_checkout(&mut self) {
        self.checkout_open = true;
    }

    /// Returns true while the checkout notice is shown
    #[must_use]
    pub const fn is_checkout_open(&self) -> bool {
        self.checkout_open
    }

    /// Close the checkout notice
    ///
    /// Empties the cart and sends the shopper back to the listing.
    pub fn checkout(&mut self) -> Route {
        self.checkout_open = false;
        self.dispatch.dispatch(CartAction::ClearCart);
        Route::Products
    }

    /// Returns true once after the cart changed
    pub fn needs_render(&self) -> bool {
        self.cart.take_changed()
    }
}

impl fmt::Display for CartPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cart = self.cart.get();
        writeln!(f, "Your Cart")?;

        if cart.is_empty() {
            writeln!(f, "Your cart is empty.")?;
            return writeln!(f, "[Continue Shopping]");
        }

        writeln!(f, "Total plants: {}", cart.total_qty())?;
        writeln!(f, "Total cost: ${}", cart.total_cost())?;
        for item in cart.iter() {
            let minus = if item.qty.get() > 1 { "[-]" } else { "(-)" };
            writeln!(
                f,
                "  {:<20} ${} each  {minus} {} [+]  [Remove]",
                item.product.name,
                item.product.price,
                item.qty
            )?;
        }
        writeln!(f, "[Checkout] [Continue Shopping] [Clear Cart]")?;

        if self.checkout_open {
            writeln!(f, "-- Checkout: Coming Soon! [Close] --")?;
        }
        Ok(())
    }
}

/// The mounted page
pub enum Page {
    /// Landing page
    Home(LandingPage),
    /// Product listing
    Products(ProductListPage),
    /// Cart
    Cart(CartPage),
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home(page) => fmt::Display::fmt(page, f),
            Self::Products(page) => fmt::Display::fmt(page, f),
            Self::Cart(page) => fmt::Display::fmt(page, f),
        }
    }
}

/// Header plus whichever page the current route mounts
pub struct App {
    provider: Provider,
    route: Route,
    header: Header,
    page: Page,
}

impl App {
    /// Mount the app at `route`
    #[must_use]
    pub fn new(provider: Provider, route: Route) -> Self {
        let header = Header::new(&provider);
        let page = Self::mount(&provider, route);
        Self {
            provider,
            route,
            header,
            page,
        }
    }

    fn mount(provider: &Provider, route: Route) -> Page {
        match route {
            Route::Home => Page::Home(LandingPage),
            Route::Products => Page::Products(ProductListPage::new(provider)),
            Route::Cart => Page::Cart(CartPage::new(provider)),
        }
    }

    /// Unmount the current page and mount the one for `route`
    pub fn navigate(&mut self, route: Route) {
        if route == self.route {
            return;
        }
        tracing::debug!(from = %self.route, to = %route, "Navigating");
        // Old page's selections are released before the new page subscribes
        self.page = Page::Home(LandingPage);
        self.page = Self::mount(&self.provider, route);
        self.route = route;
    }

    /// The current route
    #[must_use]
    pub const fn route(&self) -> Route {
        self.route
    }

    /// The header
    #[must_use]
    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// The mounted page
    #[must_use]
    pub const fn page(&self) -> &Page {
        &self.page
    }

    /// The mounted page, mutably
    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    /// Render header and page
    #[must_use]
    pub fn render(&self) -> String {
        format!("{}\n{}", self.header, self.page)
    }
}
