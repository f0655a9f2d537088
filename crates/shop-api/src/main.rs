//! # shopmate
//!
//! Storefront API server.
//!
//! ## Usage
//!
//! ```bash
//! export JWT_KEY=...
//! export STRIPE_SECRET_KEY=sk_test_...
//! # optional; without it the in-memory store is seeded from config/catalog.toml
//! export DATABASE_URL=postgres://localhost/shopmate
//!
//! shopmate
//! ```

use shop_api::{routes, AppConfig, AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    print_banner();

    let config = AppConfig::from_env()?;
    let addr = config.socket_addr()?;
    let is_prod = config.is_production();

    let state = AppState::new(config).await?;

    info!("Environment: {}", state.config.environment);
    info!("Store backend: {}", state.backend);
    info!("Currency: {}", state.config.currency);
    info!("Duplicate order policy: {:?}", state.orders.policy());

    let app = routes::create_router(state);

    info!("shopmate starting on http://{}", addr);

    if !is_prod {
        info!("Health: http://{}/health", addr);
        info!("Products: GET http://{}/products", addr);
        info!("Charge: POST http://{}/stripe/charge", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `LOG_FORMAT=json` switches to structured output; `RUST_LOG` filters
fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
}

fn print_banner() {
    println!(
        r#"
  shopmate
  ━━━━━━━━━━━━━━━━━━━━━━━
  Cart, orders and payments
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
