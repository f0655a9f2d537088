//! # Application State
//!
//! Configuration plus the services every handler shares. Stores, the token
//! service and the payment processor are built once here and injected.

use secrecy::{ExposeSecret, SecretString};
use shop_core::{
    AccountService, BoxedPaymentProcessor, CaptureService, CartService, CatalogSeed, Currency,
    DuplicateOrderPolicy, MemoryStore, OrderService, ShopError, ShopResult, Stores, TokenService,
    DEFAULT_TOKEN_TTL_HOURS,
};
use shop_pg::PgStore;
use shop_stripe::StripeChargeProcessor;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// HS256 signing key for customer tokens
    pub jwt_key: SecretString,
    pub token_ttl_hours: i64,
    /// Postgres connection string; in-memory store when absent
    pub database_url: Option<SecretString>,
    /// Catalog seed for the in-memory store
    pub catalog_path: String,
    pub currency: Currency,
    pub duplicate_order_policy: DuplicateOrderPolicy,
    /// Allowed browser origin; any origin when absent
    pub cors_origin: Option<String>,
    /// Put internal error text into 5xx bodies
    pub expose_error_details: bool,
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Load from environment variables (and `.env` when present)
    pub fn from_env() -> ShopResult<Self> {
        dotenvy::dotenv().ok();

        let jwt_key = var("JWT_KEY")
            .map(SecretString::from)
            .ok_or_else(|| ShopError::Configuration("JWT_KEY not set".to_string()))?;

        let port = match var("PORT") {
            Some(p) => p
                .parse()
                .map_err(|_| ShopError::Configuration(format!("invalid PORT: {p}")))?,
            None => 8080,
        };

        let token_ttl_hours = match var("TOKEN_TTL_HOURS") {
            Some(h) => h
                .parse()
                .map_err(|_| ShopError::Configuration(format!("invalid TOKEN_TTL_HOURS: {h}")))?,
            None => DEFAULT_TOKEN_TTL_HOURS,
        };

        let environment = var("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            expose_error_details: environment != "production",
            environment,
            jwt_key,
            token_ttl_hours,
            database_url: var("DATABASE_URL").map(SecretString::from),
            catalog_path: var("CATALOG_PATH").unwrap_or_else(|| "config/catalog.toml".to_string()),
            currency: var("CURRENCY").as_deref().unwrap_or("usd").parse()?,
            duplicate_order_policy: var("DUPLICATE_ORDER_POLICY")
                .as_deref()
                .unwrap_or("allow")
                .parse()?,
            cors_origin: var("CORS_ORIGIN"),
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> ShopResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ShopError::Configuration(format!("invalid socket address: {e}")))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Config for tests and embedding, with defaults for everything but the key
    pub fn with_jwt_key(jwt_key: impl Into<String>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: "development".to_string(),
            jwt_key: SecretString::from(jwt_key.into()),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            database_url: None,
            catalog_path: "config/catalog.toml".to_string(),
            currency: Currency::default(),
            duplicate_order_policy: DuplicateOrderPolicy::default(),
            cors_origin: None,
            expose_error_details: false,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub stores: Stores,
    pub tokens: Arc<TokenService>,
    pub carts: CartService,
    pub orders: OrderService,
    pub capture: CaptureService,
    pub accounts: AccountService,
    /// Which store backs the stores ("memory" or "postgres")
    pub backend: &'static str,
}

impl AppState {
    /// Wire services over already-built stores and processor
    pub fn from_parts(
        config: AppConfig,
        stores: Stores,
        processor: BoxedPaymentProcessor,
        backend: &'static str,
    ) -> Self {
        let tokens = Arc::new(
            TokenService::new(config.jwt_key.expose_secret().as_bytes())
                .with_ttl(chrono::Duration::hours(config.token_ttl_hours)),
        );

        let carts = CartService::new(stores.carts.clone());
        let orders = OrderService::new(
            stores.catalog.clone(),
            stores.carts.clone(),
            stores.orders.clone(),
        )
        .with_policy(config.duplicate_order_policy);
        let capture =
            CaptureService::new(stores.orders.clone(), processor).with_currency(config.currency);
        let accounts = AccountService::new(
            stores.customers.clone(),
            stores.catalog.clone(),
            tokens.clone(),
        );

        Self {
            config: Arc::new(config),
            stores,
            tokens,
            carts,
            orders,
            capture,
            accounts,
            backend,
        }
    }

    /// Build the store and processor named by the configuration
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let processor: BoxedPaymentProcessor = Arc::new(
            StripeChargeProcessor::from_env()
                .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {e}"))?,
        );

        let state = match &config.database_url {
            Some(url) => {
                let store = PgStore::connect(url).await?;
                store.migrate().await?;
                let stores = Stores::from_backend(Arc::new(store));
                Self::from_parts(config, stores, processor, "postgres")
            }
            None => {
                let seed = load_catalog(&config.catalog_path)?;
                let stores = Stores::from_backend(Arc::new(MemoryStore::with_catalog(seed)));
                Self::from_parts(config, stores, processor, "memory")
            }
        };

        Ok(state)
    }
}

/// Load the development catalog; an absent file gives an empty catalog
fn load_catalog(path: &str) -> anyhow::Result<CatalogSeed> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let seed = CatalogSeed::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {path}: {e}"))?;
            info!(
                products = seed.products.len(),
                shipping_types = seed.shipping_types.len(),
                "Loaded catalog from {path}"
            );
            Ok(seed)
        }
        Err(_) => {
            warn!("No catalog found at {path}, using empty catalog");
            Ok(CatalogSeed::default())
        }
    }
}
