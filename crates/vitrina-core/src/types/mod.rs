//! # Core Type Definitions
//!
//! This module contains the value types shared by every part of Vitrina:
//! - Catalog records (`Product`, `Catalog`)
//! - Cart and order structures (`CartSelection`, `LineItem`, `OrderSummary`)
//! - Error types (`VitrinaError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use `Decimal` for money (no floating-point)
//! - Use `BTreeMap` where iteration order is observable
//! - Are never mutated after a load or a composition; new values are built instead

use crate::primitives::MONEY_DECIMAL_PLACES;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// =============================================================================
// PRODUCT
// =============================================================================

/// A product row that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Display name, trimmed and never empty.
    pub name: String,
    /// Unit price, never negative.
    pub price: Decimal,
    /// Units available. The upper bound for a cart quantity.
    pub stock: u32,
    /// Vendor code, empty when the sheet has none.
    pub code: String,
    /// Image URL or path.
    pub image: Option<String>,
}

impl Product {
    /// Create a product without code or image.
    #[must_use]
    pub fn new(name: impl Into<String>, price: Decimal, stock: u32) -> Self {
        Self {
            name: name.into(),
            price,
            stock,
            code: String::new(),
            image: None,
        }
    }

    /// Set the vendor code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Set the image reference.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Whether a cart may hold `quantity` units of this product.
    #[must_use]
    pub fn allows_quantity(&self, quantity: u32) -> bool {
        quantity <= self.stock
    }
}

// =============================================================================
// CATALOG
// =============================================================================

/// The ordered list of products for one session.
///
/// Positions are the source row order with rejected rows removed.
/// A catalog is read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// True when there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Product at a display position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Product> {
        self.products.get(index)
    }

    /// Product at a display position, or `IndexOutOfRange`.
    pub fn product(&self, index: usize) -> Result<&Product, VitrinaError> {
        self.products
            .get(index)
            .ok_or(VitrinaError::IndexOutOfRange {
                index,
                len: self.products.len(),
            })
    }

    /// Iterate products in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.products.iter()
    }

    /// All products as a slice.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }
}

impl From<Vec<Product>> for Catalog {
    fn from(products: Vec<Product>) -> Self {
        Self { products }
    }
}

impl FromIterator<Product> for Catalog {
    fn from_iter<I: IntoIterator<Item = Product>>(iter: I) -> Self {
        Self {
            products: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.iter()
    }
}

// =============================================================================
// CART SELECTION
// =============================================================================

/// Requested quantities keyed by catalog position.
///
/// Uses BTreeMap so iteration is always in ascending index order,
/// which is the order products were displayed in.
/// A quantity of zero is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartSelection {
    quantities: BTreeMap<usize, u32>,
}

impl CartSelection {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the quantity for a position. Zero removes the entry.
    ///
    /// No catalog checks happen here; see `StorefrontSession::select`
    /// for the checked variant.
    pub fn set(&mut self, index: usize, quantity: u32) {
        if quantity == 0 {
            self.quantities.remove(&index);
        } else {
            self.quantities.insert(index, quantity);
        }
    }

    /// Quantity selected at a position (zero if none).
    #[must_use]
    pub fn quantity(&self, index: usize) -> u32 {
        self.quantities.get(&index).copied().unwrap_or(0)
    }

    /// Iterate `(index, quantity)` pairs in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.quantities.iter().map(|(&index, &quantity)| (index, quantity))
    }

    /// Number of products with a non-zero quantity.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    /// True when nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// Drop every selection.
    pub fn clear(&mut self) {
        self.quantities.clear();
    }
}

impl FromIterator<(usize, u32)> for CartSelection {
    fn from_iter<I: IntoIterator<Item = (usize, u32)>>(iter: I) -> Self {
        let mut selection = Self::new();
        for (index, quantity) in iter {
            selection.set(index, quantity);
        }
        selection
    }
}

// =============================================================================
// ORDER OUTPUT
// =============================================================================

/// One selected product at a chosen quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Catalog position the item was selected from.
    pub index: usize,
    pub quantity: u32,
    pub name: String,
    pub code: String,
    pub unit_price: Decimal,
    /// `quantity * unit_price`, unrounded.
    pub subtotal: Decimal,
}

/// Line items plus their total.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderSummary {
    pub line_items: Vec<LineItem>,
    pub total: Decimal,
}

impl OrderSummary {
    /// True when no product has a positive quantity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }
}

/// Render an amount with two fractional digits, rounding half away from zero.
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    let rounded =
        amount.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in Vitrina.
///
/// Row rejection during a load is not an error and has no variant here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VitrinaError {
    /// The catalog source could not be read (missing file, parse failure, failed download).
    #[error("Catalog source unavailable: {0}")]
    SourceUnavailable(String),

    /// A selection refers to a position the catalog does not have.
    #[error("Product index {index} out of range (catalog has {len} products)")]
    IndexOutOfRange { index: usize, len: usize },

    /// A selection asks for more units than are in stock.
    #[error("Requested {requested} units of product {index}, only {stock} in stock")]
    QuantityExceedsStock {
        index: usize,
        requested: u32,
        stock: u32,
    },

    /// A required contact field is empty.
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// An order message was requested for an empty cart.
    #[error("Order has no products")]
    EmptyOrder,

    /// An order amount does not fit the money type.
    #[error("Order amount is too large")]
    AmountOverflow,

    /// The messaging phone number is not a plain digit string.
    #[error("Invalid phone number: {0:?}")]
    InvalidPhoneNumber(String),

    /// A configuration value is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
