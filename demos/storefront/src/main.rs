//! Storefront walkthrough binary
//!
//! Drives the views through a short shopping session and prints every page
//! after each step.
//!
//! Environment:
//! - `RUST_LOG`: tracing filter
//! - `HAVEN_ISOLATE_LISTENERS=1`: keep notifying listeners after one panics
//! - `HAVEN_METRICS=1`: print Prometheus metrics at the end

use anyhow::{Context, bail};
use haven_runtime::StoreConfig;
use haven_runtime::metrics::MetricsRecorder;
use haven_storefront::views::Page;
use haven_storefront::{App, CartAction, ProductId, Route, create_store};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn env_flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|value| matches!(value.as_str(), "1" | "true" | "yes"))
}

fn show(step: &str, app: &App) {
    println!(">>> {step} ({})", app.route());
    println!("{}", app.render());
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "haven_storefront=info,haven_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut recorder = MetricsRecorder::new();
    if env_flag("HAVEN_METRICS") {
        recorder.install().context("installing metrics recorder")?;
    }

    let config = StoreConfig::default()
        .with_name("storefront")
        .with_isolated_listeners(env_flag("HAVEN_ISOLATE_LISTENERS"));
    let store = create_store(config);
    tracing::info!(?store, "Store ready");

    println!("=== Houseplant Haven ===\n");

    let mut app = App::new(store.provider(), Route::Home);
    show("Landing", &app);

    let Page::Home(landing) = app.page() else {
        bail!("expected the landing page at {}", app.route());
    };
    let next = landing.get_started();
    app.navigate(next);
    show("Get Started", &app);

    let monstera = ProductId::new(1);
    let aloe = ProductId::new(4);
    if let Page::Products(listing) = app.page() {
        listing.add_to_cart(monstera);
        listing.add_to_cart(aloe);
        // Already added, the button is disabled
        listing.add_to_cart(monstera);
    }
    show("Added Monstera Deliciosa and Aloe Vera", &app);

    app.navigate(Route::Cart);
    if let Page::Cart(cart) = app.page() {
        cart.increment(monstera);
        cart.increment(monstera);
        cart.decrement(monstera);
    }
    show("Adjusted quantities", &app);

    // Encoded actions go through the same reducer; unknown types are ignored
    let encoded = serde_json::to_string(&CartAction::increment_qty(aloe))?;
    store.dispatch_json(&encoded)?;
    store.dispatch_json(r#"{"type": "WATER_PLANTS"}"#)?;
    if let Err(error) = store.dispatch_json(r#"{"id": 4}"#) {
        tracing::warn!(%error, "Rejected encoded action");
    }
    show("Dispatched encoded actions", &app);

    let route = app.route();
    let next = match app.page_mut() {
        Page::Cart(cart) => {
            cart.open_checkout();
            cart.checkout()
        },
        _ => bail!("expected the cart page at {route}"),
    };
    app.navigate(next);
    show("Checked out", &app);

    println!(
        "Dispatches that changed state: {}, listeners: {}",
        store.version(),
        store.listener_count()
    );

    if let Some(rendered) = recorder.render() {
        println!("\n=== Metrics ===\n{rendered}");
    }

    Ok(())
}
