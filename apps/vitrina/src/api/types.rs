//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//! Money is sent as strings with two fractional digits.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vitrina_core::{
    CartSelection, ContactForm, CustomerInfo, LineItem, LoadNotice, OrderSummary, Product,
    StorefrontSession, format_money,
};

/// Shown instead of an empty product grid.
pub const EMPTY_CATALOG_NOTICE: &str = "Todavía no hay productos cargados. Vuelve más tarde.";

/// Shown while the cart is empty.
pub const EMPTY_CART_NOTICE: &str =
    "Seleccioná la cantidad de los productos que deseas comprar.";

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// SESSION RESPONSE
// =============================================================================

/// Returned when a session is opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: u64,
}

// =============================================================================
// CATALOG RESPONSE
// =============================================================================

/// One product as shown in the grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductJson {
    /// Position used when selecting quantities.
    pub index: usize,
    pub name: String,
    pub price: String,
    pub stock: u32,
    pub code: String,
    pub image: Option<String>,
}

impl ProductJson {
    fn new(index: usize, product: &Product) -> Self {
        Self {
            index,
            name: product.name.clone(),
            price: format_money(product.price),
            stock: product.stock,
            code: product.code.clone(),
            image: product.image.clone(),
        }
    }
}

/// Catalog listing. `notice` is set when there is nothing to show.
///
/// `products_loaded` and `rejected_rows` describe the last load, and
/// `source_unavailable` tells a failed read apart from an empty sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub products: Vec<ProductJson>,
    pub notice: Option<String>,
    pub products_loaded: usize,
    pub rejected_rows: usize,
    pub source_unavailable: bool,
}

impl CatalogResponse {
    pub fn from_session(session: &StorefrontSession) -> Self {
        let products: Vec<ProductJson> = session
            .catalog()
            .iter()
            .enumerate()
            .map(|(index, product)| ProductJson::new(index, product))
            .collect();
        let notice = products
            .is_empty()
            .then(|| EMPTY_CATALOG_NOTICE.to_string());
        let load = session.notice();
        Self {
            products_loaded: load.map_or(0, LoadNotice::products),
            rejected_rows: load.map_or(0, LoadNotice::rejected),
            source_unavailable: load.is_some_and(LoadNotice::is_unavailable),
            products,
            notice,
        }
    }
}

// =============================================================================
// CART REQUEST/RESPONSE
// =============================================================================

/// Set the quantity of one product. Zero removes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartUpdateRequest {
    pub index: usize,
    pub quantity: u32,
}

/// Current cart, keyed by product index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    pub success: bool,
    pub items: BTreeMap<usize, u32>,
    pub error: Option<String>,
}

impl CartResponse {
    pub fn success(cart: &CartSelection) -> Self {
        Self {
            success: true,
            items: cart.iter().collect(),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            items: BTreeMap::new(),
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// ORDER REQUEST/RESPONSE
// =============================================================================

/// Customer details submitted with an order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderRequest {
    #[serde(default)]
    pub customer: CustomerInfo,
}

/// One order line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemJson {
    pub index: usize,
    pub quantity: u32,
    pub name: String,
    pub code: String,
    pub unit_price: String,
    pub subtotal: String,
}

impl From<&LineItem> for LineItemJson {
    fn from(item: &LineItem) -> Self {
        Self {
            index: item.index,
            quantity: item.quantity,
            name: item.name.clone(),
            code: item.code.clone(),
            unit_price: format_money(item.unit_price),
            subtotal: format_money(item.subtotal),
        }
    }
}

/// Order preview.
///
/// `message` and `link` are only set when the cart is not empty and every
/// required contact field is filled. Otherwise `notice` says what is missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub success: bool,
    pub line_items: Vec<LineItemJson>,
    pub total: String,
    pub submittable: bool,
    pub missing_fields: Vec<String>,
    pub message: Option<String>,
    pub link: Option<String>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

impl OrderResponse {
    pub fn preview(summary: &OrderSummary, form: &ContactForm, customer: &CustomerInfo) -> Self {
        let missing_fields: Vec<String> = form
            .missing(customer)
            .into_iter()
            .map(|f| f.label.clone())
            .collect();
        let notice = if summary.is_empty() {
            Some(EMPTY_CART_NOTICE.to_string())
        } else if !missing_fields.is_empty() {
            Some(missing_fields_notice(&missing_fields))
        } else {
            None
        };

        Self {
            success: true,
            line_items: summary.line_items.iter().map(LineItemJson::from).collect(),
            total: format_money(summary.total),
            submittable: missing_fields.is_empty(),
            missing_fields,
            message: None,
            link: None,
            notice,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            line_items: Vec::new(),
            total: format_money(rust_decimal::Decimal::ZERO),
            submittable: false,
            missing_fields: Vec::new(),
            message: None,
            link: None,
            notice: None,
            error: Some(msg.into()),
        }
    }
}

/// "Por favor, completa todos los campos obligatorios (A, B y C) ..."
pub fn missing_fields_notice(labels: &[String]) -> String {
    let list = match labels {
        [] => String::new(),
        [only] => only.clone(),
        [rest @ .., last] => format!("{} y {}", rest.join(", "), last),
    };
    format!(
        "Por favor, completa todos los campos obligatorios ({}) para poder generar el mensaje de pedido.",
        list
    )
}

// =============================================================================
// TESTS
// =============================================================================
