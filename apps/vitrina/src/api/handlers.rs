//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    types::{
        CartResponse, CartUpdateRequest, CatalogResponse, HealthResponse, OrderRequest,
        OrderResponse, SessionResponse,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use vitrina_core::{VitrinaError, build_link};

const SESSION_NOT_FOUND: &str = "Session not found";

/// Status code for a cart or order error.
fn error_status(error: &VitrinaError) -> StatusCode {
    match error {
        // The catalog changed under the customer's selection.
        VitrinaError::IndexOutOfRange { .. } => StatusCode::CONFLICT,
        VitrinaError::QuantityExceedsStock { .. }
        | VitrinaError::MissingRequiredField(_)
        | VitrinaError::EmptyOrder
        | VitrinaError::AmountOverflow => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// SESSION HANDLER
// =============================================================================

/// Open a new customer session.
pub async fn create_session_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session_id = state.open_session().await;
    tracing::debug!(session_id, "Session opened");
    (StatusCode::CREATED, Json(SessionResponse { session_id }))
}

// =============================================================================
// CATALOG HANDLERS
// =============================================================================

/// List products, loading the catalog on first use.
pub async fn catalog_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    if !state.ensure_catalog(id).await {
        return (StatusCode::NOT_FOUND, Json(None));
    }
    let sessions = state.sessions.read().await;
    match sessions.get(&id) {
        Some(session) => (
            StatusCode::OK,
            Json(Some(CatalogResponse::from_session(session))),
        ),
        None => (StatusCode::NOT_FOUND, Json(None)),
    }
}

/// Reload the catalog from the source. The cart is cleared.
pub async fn reload_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    if !state.reload_catalog(id).await {
        return (StatusCode::NOT_FOUND, Json(None));
    }
    let sessions = state.sessions.read().await;
    match sessions.get(&id) {
        Some(session) => (
            StatusCode::OK,
            Json(Some(CatalogResponse::from_session(session))),
        ),
        None => (StatusCode::NOT_FOUND, Json(None)),
    }
}

// =============================================================================
// CART HANDLERS
// =============================================================================

/// Current cart.
pub async fn cart_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;
    match sessions.get(&id) {
        Some(session) => (StatusCode::OK, Json(CartResponse::success(session.cart()))),
        None => (
            StatusCode::NOT_FOUND,
            Json(CartResponse::error(SESSION_NOT_FOUND)),
        ),
    }
}

/// Set the quantity of one product.
pub async fn update_cart_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<CartUpdateRequest>,
) -> impl IntoResponse {
    if !state.ensure_catalog(id).await {
        return (
            StatusCode::NOT_FOUND,
            Json(CartResponse::error(SESSION_NOT_FOUND)),
        );
    }

    let mut sessions = state.sessions.write().await;
    let Some(session) = sessions.get_mut(&id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(CartResponse::error(SESSION_NOT_FOUND)),
        );
    };

    match session.select(request.index, request.quantity) {
        Ok(()) => (StatusCode::OK, Json(CartResponse::success(session.cart()))),
        Err(e) => (error_status(&e), Json(CartResponse::error(e.to_string()))),
    }
}

// =============================================================================
// ORDER HANDLER
// =============================================================================

/// Order preview.
///
/// Always returns line items and total. When the cart is not empty and every
/// required field is filled, also returns the message and, with a configured
/// phone number, the deep link.
pub async fn order_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<OrderRequest>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;
    let Some(session) = sessions.get(&id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(OrderResponse::error(SESSION_NOT_FOUND)),
        );
    };

    let summary = match session.order_summary(&state.composer) {
        Ok(summary) => summary,
        Err(e) => return (error_status(&e), Json(OrderResponse::error(e.to_string()))),
    };

    let mut response = OrderResponse::preview(&summary, state.composer.form(), &request.customer);
    if summary.is_empty() || !response.submittable {
        return (StatusCode::OK, Json(response));
    }

    match state.composer.format_message(&summary, &request.customer) {
        Ok(message) => {
            response.link = state.phone.as_ref().map(|phone| build_link(phone, &message));
            response.message = Some(message.as_str().to_string());
            tracing::info!(
                session_id = id,
                items = summary.line_items.len(),
                "Order message composed"
            );
            (StatusCode::OK, Json(response))
        }
        Err(e) => (error_status(&e), Json(OrderResponse::error(e.to_string()))),
    }
}
