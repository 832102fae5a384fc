//! # Composer Module
//!
//! Order assembly for Vitrina.
//!
//! - Turns a cart selection into line items and a total
//! - Formats the order message sent to the shop
//! - Pure: no I/O, no clocks, same input gives the same output

use crate::contact::{ContactForm, CustomerInfo};
use crate::primitives::{CODE_PLACEHOLDER, DEFAULT_GREETING};
use crate::{CartSelection, Catalog, LineItem, OrderSummary, VitrinaError, format_money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Compute line items and total for a selection.
///
/// Items come out in ascending catalog position. Positions with quantity 0
/// never appear. A position outside the catalog fails the whole computation
/// with `IndexOutOfRange`, since it means the selection was made against a
/// different catalog. A subtotal or total that does not fit a `Decimal`
/// fails with `AmountOverflow` rather than being capped.
pub fn compute_order(
    catalog: &Catalog,
    selection: &CartSelection,
) -> Result<OrderSummary, VitrinaError> {
    let mut line_items = Vec::with_capacity(selection.len());
    let mut total = Decimal::ZERO;

    for (index, quantity) in selection.iter() {
        if quantity == 0 {
            continue;
        }
        let product = catalog.product(index)?;
        let subtotal = product
            .price
            .checked_mul(Decimal::from(quantity))
            .ok_or(VitrinaError::AmountOverflow)?;
        total = total
            .checked_add(subtotal)
            .ok_or(VitrinaError::AmountOverflow)?;

        line_items.push(LineItem {
            index,
            quantity,
            name: product.name.clone(),
            code: product.code.clone(),
            unit_price: product.price,
            subtotal,
        });
    }

    Ok(OrderSummary { line_items, total })
}

// =============================================================================
// ORDER MESSAGE
// =============================================================================

/// The human-readable order text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderMessage(String);

impl OrderMessage {
    /// The message as plain text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The message percent-encoded for use as a URL query value.
    #[must_use]
    pub fn encoded(&self) -> String {
        urlencoding::encode(&self.0).into_owned()
    }
}

impl fmt::Display for OrderMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// COMPOSER
// =============================================================================

/// Formats orders using a contact form and a greeting line.
#[derive(Debug, Clone)]
pub struct OrderComposer {
    form: ContactForm,
    greeting: String,
}

impl Default for OrderComposer {
    fn default() -> Self {
        Self::new(ContactForm::default())
    }
}

impl OrderComposer {
    /// Composer with the default greeting.
    #[must_use]
    pub fn new(form: ContactForm) -> Self {
        Self {
            form,
            greeting: DEFAULT_GREETING.to_string(),
        }
    }

    /// Replace the greeting line.
    #[must_use]
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }

    /// The contact form orders are checked against.
    #[must_use]
    pub fn form(&self) -> &ContactForm {
        &self.form
    }

    /// See [`compute_order`].
    pub fn compute_order(
        &self,
        catalog: &Catalog,
        selection: &CartSelection,
    ) -> Result<OrderSummary, VitrinaError> {
        compute_order(catalog, selection)
    }

    /// Whether the customer filled every required field.
    #[must_use]
    pub fn is_submittable(&self, info: &CustomerInfo) -> bool {
        self.form.is_submittable(info)
    }

    /// Build the order message.
    ///
    /// Layout:
    /// ```text
    /// {greeting}
    ///
    /// - {quantity} x {name} (Código: {code}) = ${subtotal}
    /// Total: ${total}
    ///
    /// {label}: {value}
    /// ```
    ///
    /// Required fields are always written; optional ones only when filled.
    /// Fails with `EmptyOrder` for an empty summary and with
    /// `MissingRequiredField` (first missing label) when the form is incomplete.
    pub fn format_message(
        &self,
        summary: &OrderSummary,
        info: &CustomerInfo,
    ) -> Result<OrderMessage, VitrinaError> {
        if summary.is_empty() {
            return Err(VitrinaError::EmptyOrder);
        }
        if let Some(field) = self.form.missing(info).first() {
            return Err(VitrinaError::MissingRequiredField(field.label.clone()));
        }

        let mut text = String::new();
        text.push_str(&self.greeting);
        text.push_str("\n\n");

        for item in &summary.line_items {
            text.push_str(&format_line_item(item));
            text.push('\n');
        }
        text.push_str(&format!("Total: ${}", format_money(summary.total)));
        text.push('\n');

        for field in self.form.fields() {
            if let Some(value) = info.filled(&field.key) {
                text.push_str(&format!("\n{}: {}", field.label, value));
            }
        }

        Ok(OrderMessage(text))
    }
}

/// `- 2 x Bed (Código: A-1) = $20.00`
#[must_use]
pub fn format_line_item(item: &LineItem) -> String {
    let code = if item.code.trim().is_empty() {
        CODE_PLACEHOLDER
    } else {
        item.code.as_str()
    };
    format!(
        "- {} x {} (Código: {}) = ${}",
        item.quantity,
        item.name,
        code,
        format_money(item.subtotal)
    )
}

// =============================================================================
// TESTS
// =============================================================================
