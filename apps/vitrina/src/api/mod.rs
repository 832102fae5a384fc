//! # Vitrina HTTP API Module
//!
//! This module implements the JSON storefront API using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /sessions` - Open a customer session
//! - `GET /sessions/{id}/catalog` - Products (loaded on first use)
//! - `POST /sessions/{id}/reload` - Reload the catalog and clear the cart
//! - `GET /sessions/{id}/cart` - Current cart
//! - `PUT /sessions/{id}/cart` - Set the quantity of one product
//! - `POST /sessions/{id}/order` - Order preview, message and deep link
//!
//! ## Configuration (Environment Variables)
//!
//! - `VITRINA_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `VITRINA_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)

mod handlers;
mod middleware;
mod types;

pub use middleware::{create_rate_limiter, get_rate_limit_from_env};
// Re-export handlers and types for integration tests (via `vitrina::api::*`)
#[allow(unused_imports)]
pub use handlers::{
    cart_handler, catalog_handler, create_session_handler, health_handler, order_handler,
    reload_handler, update_cart_handler,
};
#[allow(unused_imports)]
pub use types::{
    CartResponse, CartUpdateRequest, CatalogResponse, EMPTY_CART_NOTICE, EMPTY_CATALOG_NOTICE,
    HealthResponse, LineItemJson, OrderRequest, OrderResponse, ProductJson, SessionResponse,
    missing_fields_notice,
};

use crate::config::AppConfig;
use crate::fetch::StoreSource;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use vitrina_core::{
    Catalog, LoadNotice, LoadOutcome, OrderComposer, PhoneNumber, StorefrontSession, VitrinaError,
};

/// Upper bound on open sessions. The oldest session is dropped beyond this.
pub const MAX_SESSIONS: usize = 10_000;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
///
/// Each customer gets an independent `StorefrontSession` and loads its own
/// catalog. Loads that produce the same products reuse one `Arc<Catalog>`,
/// so open sessions do not each hold a copy.
#[derive(Clone)]
pub struct AppState {
    /// Open sessions by id.
    pub sessions: Arc<RwLock<BTreeMap<u64, StorefrontSession>>>,
    next_session_id: Arc<AtomicU64>,
    /// Most recently loaded catalog.
    latest_catalog: Arc<Mutex<Arc<Catalog>>>,
    /// Where catalogs are loaded from.
    pub source: Arc<StoreSource>,
    /// Order formatting rules.
    pub composer: Arc<OrderComposer>,
    /// Messaging number for deep links.
    pub phone: Option<PhoneNumber>,
}

impl AppState {
    /// Create app state from parts.
    #[must_use]
    pub fn new(source: StoreSource, composer: OrderComposer, phone: Option<PhoneNumber>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(BTreeMap::new())),
            next_session_id: Arc::new(AtomicU64::new(1)),
            latest_catalog: Arc::new(Mutex::new(Arc::new(Catalog::new()))),
            source: Arc::new(source),
            composer: Arc::new(composer),
            phone,
        }
    }

    /// Create app state from the application config.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            StoreSource::new(config),
            config.composer(),
            config.phone_number.clone(),
        )
    }

    /// Open a new, empty session and return its id.
    pub async fn open_session(&self) -> u64 {
        let id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        let mut sessions = self.sessions.write().await;
        while sessions.len() >= MAX_SESSIONS {
            if sessions.pop_first().is_none() {
                break;
            }
        }
        sessions.insert(id, StorefrontSession::new());
        id
    }

    /// Make sure the session has a catalog, loading it if absent or empty.
    ///
    /// The load runs without holding the session lock, so a slow download
    /// does not block other customers. Returns `false` for an unknown session.
    pub async fn ensure_catalog(&self, id: u64) -> bool {
        let needs_load = match self.sessions.read().await.get(&id) {
            Some(session) => session.needs_load(),
            None => return false,
        };
        if needs_load {
            let (catalog, notice) = self.share(self.source.load().await).await;
            let mut sessions = self.sessions.write().await;
            match sessions.get_mut(&id) {
                Some(session) if session.needs_load() => {
                    session.install_shared(catalog, notice);
                }
                Some(_) => {}
                None => return false,
            }
        }
        true
    }

    /// Reload the session's catalog unconditionally. Returns `false` for an
    /// unknown session.
    pub async fn reload_catalog(&self, id: u64) -> bool {
        if !self.sessions.read().await.contains_key(&id) {
            return false;
        }
        let (catalog, notice) = self.share(self.source.load().await).await;
        match self.sessions.write().await.get_mut(&id) {
            Some(session) => {
                session.install_shared(catalog, notice);
                true
            }
            None => false,
        }
    }

    /// Turn a load outcome into a catalog handle, reusing the previous
    /// handle when the products are unchanged.
    async fn share(&self, outcome: LoadOutcome) -> (Arc<Catalog>, LoadNotice) {
        let notice = LoadNotice::from_outcome(&outcome);
        let catalog = outcome.into_catalog();
        let mut latest = self.latest_catalog.lock().await;
        if **latest != catalog {
            *latest = Arc::new(catalog);
        }
        (Arc::clone(&*latest), notice)
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from environment configuration.
///
/// Reads `VITRINA_CORS_ORIGINS`:
/// - "*": allows all origins
/// - unset: localhost only
/// - otherwise: comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("VITRINA_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins (VITRINA_CORS_ORIGINS=*)");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => Some(hv),
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins in VITRINA_CORS_ORIGINS, using localhost");
                build_localhost_cors()
            } else {
                tracing::info!("CORS: {} allowed origins", allowed_origins.len());
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE])
            }
        }
        None => build_localhost_cors(),
    }
}

/// CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate Limiting (if enabled)
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    let rate_limit = get_rate_limit_from_env();
    let rate_limiter = if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        Some(create_rate_limiter(rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    if state.phone.is_none() {
        tracing::warn!("No phone number configured; orders will be returned without a link");
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/sessions", post(handlers::create_session_handler))
        .route("/sessions/{id}/catalog", get(handlers::catalog_handler))
        .route("/sessions/{id}/reload", post(handlers::reload_handler))
        .route(
            "/sessions/{id}/cart",
            get(handlers::cart_handler).put(handlers::update_cart_handler),
        )
        .route("/sessions/{id}/order", post(handlers::order_handler));

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(64 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), VitrinaError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| VitrinaError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Vitrina HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| VitrinaError::IoError(format!("Server error: {}", e)))
}
