//! Unit tests for API types serialization/deserialization.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use rust_decimal::Decimal;
use std::str::FromStr;
use vitrina::api::{
    CartResponse, CartUpdateRequest, CatalogResponse, HealthResponse, LineItemJson, OrderRequest,
    OrderResponse,
};
use vitrina_core::{
    CartSelection, Catalog, ContactForm, CustomerInfo, LineItem, LoadOutcome, OrderSummary,
    Product, StorefrontSession,
};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// =============================================================================
// HEALTH RESPONSE TESTS
// =============================================================================

#[test]
fn test_health_response_serialization() {
    let health = HealthResponse::default();
    let json = serde_json::to_string(&health).unwrap();
    assert!(json.contains("\"status\":\"ok\""));
    assert!(json.contains(env!("CARGO_PKG_VERSION")));
}

// =============================================================================
// CATALOG RESPONSE TESTS
// =============================================================================

#[test]
fn test_catalog_response_formats_prices() {
    let catalog: Catalog = vec![
        Product::new("Mesa", dec("10.5"), 3).with_code("A-1"),
        Product::new("Silla", dec("4"), 0),
    ]
    .into();

    let session = StorefrontSession::with_catalog(catalog);
    let response = CatalogResponse::from_session(&session);
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["products"][0]["index"], 0);
    assert_eq!(json["products"][0]["price"], "10.50");
    assert_eq!(json["products"][1]["price"], "4.00");
    assert_eq!(json["products"][1]["image"], serde_json::Value::Null);
    assert_eq!(json["notice"], serde_json::Value::Null);
    assert_eq!(json["products_loaded"], 2);
    assert_eq!(json["rejected_rows"], 0);
    assert_eq!(json["source_unavailable"], false);
}

#[test]
fn test_catalog_response_counts_rejected_rows() {
    let mut session = StorefrontSession::new();
    session.install(LoadOutcome::Loaded {
        catalog: vec![Product::new("Mesa", dec("10"), 1)].into(),
        rejected: 4,
    });

    let response = CatalogResponse::from_session(&session);
    assert_eq!(response.products_loaded, 1);
    assert_eq!(response.rejected_rows, 4);
    assert!(!response.source_unavailable);
    assert!(response.notice.is_none());
}

// =============================================================================
// CART TESTS
// =============================================================================

#[test]
fn test_cart_update_request_deserialization() {
    let request: CartUpdateRequest =
        serde_json::from_str(r#"{"index": 3, "quantity": 2}"#).unwrap();
    assert_eq!(request.index, 3);
    assert_eq!(request.quantity, 2);
}

#[test]
fn test_cart_update_rejects_negative_quantity() {
    let result = serde_json::from_str::<CartUpdateRequest>(r#"{"index": 0, "quantity": -1}"#);
    assert!(result.is_err());
}

#[test]
fn test_cart_response_round_trip() {
    let cart: CartSelection = [(2, 1), (0, 5)].into_iter().collect();
    let json = serde_json::to_string(&CartResponse::success(&cart)).unwrap();
    let back: CartResponse = serde_json::from_str(&json).unwrap();

    assert!(back.success);
    assert_eq!(back.items.into_iter().collect::<Vec<_>>(), vec![(0, 5), (2, 1)]);
}

#[test]
fn test_cart_error_response() {
    let response = CartResponse::error("boom");
    assert!(!response.success);
    assert!(response.items.is_empty());
    assert_eq!(response.error.as_deref(), Some("boom"));
}

// =============================================================================
// ORDER TESTS
// =============================================================================

#[test]
fn test_order_request_customer_defaults_to_empty() {
    let request: OrderRequest = serde_json::from_str("{}").unwrap();
    assert_eq!(request.customer, CustomerInfo::new());

    let request: OrderRequest =
        serde_json::from_str(r#"{"customer": {"nombre": "Ana"}}"#).unwrap();
    assert_eq!(request.customer.get("nombre"), Some("Ana"));
}

#[test]
fn test_line_item_json_formats_money() {
    let item = LineItem {
        index: 1,
        quantity: 3,
        name: "Silla".to_string(),
        code: String::new(),
        unit_price: dec("4.1"),
        subtotal: dec("12.3"),
    };
    let json = LineItemJson::from(&item);
    assert_eq!(json.unit_price, "4.10");
    assert_eq!(json.subtotal, "12.30");
}

#[test]
fn test_order_preview_reports_missing_fields() {
    let summary = OrderSummary {
        line_items: Vec::new(),
        total: Decimal::ZERO,
    };
    let customer = CustomerInfo::new().with("cuit", "20-1");

    let preview = OrderResponse::preview(&summary, &ContactForm::default(), &customer);

    assert!(preview.success);
    assert!(!preview.submittable);
    assert_eq!(preview.missing_fields, vec!["Razón Social", "Nombre", "Email"]);
    assert_eq!(preview.total, "0.00");
}

#[test]
fn test_order_error_response() {
    let response = OrderResponse::error("stale cart");
    assert!(!response.success);
    assert!(response.line_items.is_empty());
    assert_eq!(response.error.as_deref(), Some("stale cart"));
}
