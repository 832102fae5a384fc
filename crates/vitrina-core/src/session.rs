//! # Session Module
//!
//! Per-customer state: the cached catalog and the cart.
//!
//! - One `StorefrontSession` per customer session; carts are never shared
//! - The catalog is loaded on first use and reloaded only while empty
//! - A loaded catalog is immutable, so sessions may hold the same `Arc`
//! - The cart is volatile and never persisted

use crate::composer::{OrderComposer, OrderMessage};
use crate::contact::CustomerInfo;
use crate::loader::{CatalogSource, LoadOutcome};
use crate::{CartSelection, Catalog, OrderSummary, VitrinaError};
use std::sync::Arc;

/// Result of the last catalog load, kept for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadNotice {
    /// Products were loaded.
    Loaded { products: usize, rejected: usize },
    /// The source could not be read; the reason is for the log, not the customer.
    Unavailable(String),
}

impl LoadNotice {
    /// Summarize a load outcome.
    #[must_use]
    pub fn from_outcome(outcome: &LoadOutcome) -> Self {
        match outcome {
            LoadOutcome::Loaded { catalog, rejected } => Self::Loaded {
                products: catalog.len(),
                rejected: *rejected,
            },
            LoadOutcome::SourceUnavailable(e) => Self::Unavailable(e.to_string()),
        }
    }

    /// Products in the catalog (0 when the source was unavailable).
    #[must_use]
    pub fn products(&self) -> usize {
        match self {
            Self::Loaded { products, .. } => *products,
            Self::Unavailable(_) => 0,
        }
    }

    /// Rows that did not become products.
    #[must_use]
    pub fn rejected(&self) -> usize {
        match self {
            Self::Loaded { rejected, .. } => *rejected,
            Self::Unavailable(_) => 0,
        }
    }

    /// True when the source could not be read.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// A Session holds the catalog and cart of a single customer.
#[derive(Debug, Clone, Default)]
pub struct StorefrontSession {
    catalog: Arc<Catalog>,
    loaded: bool,
    notice: Option<LoadNotice>,
    cart: CartSelection,
}

impl StorefrontSession {
    /// Create a session with nothing loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session around an existing catalog.
    #[must_use]
    pub fn with_catalog(catalog: Catalog) -> Self {
        let mut session = Self::new();
        let notice = LoadNotice::Loaded {
            products: catalog.len(),
            rejected: 0,
        };
        session.install_shared(Arc::new(catalog), notice);
        session
    }

    /// True when the next `ensure_catalog` will hit the source.
    #[must_use]
    pub fn needs_load(&self) -> bool {
        !self.loaded || self.catalog.is_empty()
    }

    /// True once any load has been installed, even an empty one.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Return the cached catalog, loading it first if absent or empty.
    pub fn ensure_catalog<S: CatalogSource + ?Sized>(&mut self, source: &S) -> &Catalog {
        if self.needs_load() {
            self.install(source.load());
        }
        self.catalog()
    }

    /// Replace the catalog with a fresh load and clear the cart.
    ///
    /// Cart positions refer to the old catalog, so they cannot survive a reload.
    pub fn reload<S: CatalogSource + ?Sized>(&mut self, source: &S) -> &Catalog {
        self.install(source.load());
        self.catalog()
    }

    /// Install the result of a load performed elsewhere (e.g. an async fetch).
    ///
    /// The cart is cleared because its positions may no longer match.
    pub fn install(&mut self, outcome: LoadOutcome) {
        let notice = LoadNotice::from_outcome(&outcome);
        self.install_shared(Arc::new(outcome.into_catalog()), notice);
    }

    /// Install a catalog that other sessions may also hold.
    ///
    /// Clears the cart, like [`install`](Self::install).
    pub fn install_shared(&mut self, catalog: Arc<Catalog>, notice: LoadNotice) {
        self.catalog = catalog;
        self.loaded = true;
        self.notice = Some(notice);
        self.cart.clear();
    }

    /// The cached catalog (empty if never loaded).
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Another handle to the cached catalog.
    #[must_use]
    pub fn shared_catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    /// What happened on the last load, if any.
    #[must_use]
    pub fn notice(&self) -> Option<&LoadNotice> {
        self.notice.as_ref()
    }

    /// Current cart.
    #[must_use]
    pub fn cart(&self) -> &CartSelection {
        &self.cart
    }

    /// Set the quantity for a catalog position.
    ///
    /// Zero removes the product from the cart. Fails with `IndexOutOfRange`
    /// for an unknown position and `QuantityExceedsStock` above stock.
    pub fn select(&mut self, index: usize, quantity: u32) -> Result<(), VitrinaError> {
        if quantity == 0 {
            self.cart.set(index, 0);
            return Ok(());
        }
        let product = self.catalog.product(index)?;
        if !product.allows_quantity(quantity) {
            return Err(VitrinaError::QuantityExceedsStock {
                index,
                requested: quantity,
                stock: product.stock,
            });
        }
        self.cart.set(index, quantity);
        Ok(())
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    /// Line items and total for the current cart.
    pub fn order_summary(&self, composer: &OrderComposer) -> Result<OrderSummary, VitrinaError> {
        composer.compute_order(&self.catalog, &self.cart)
    }

    /// Order message for the current cart.
    pub fn order_message(
        &self,
        composer: &OrderComposer,
        info: &CustomerInfo,
    ) -> Result<OrderMessage, VitrinaError> {
        let summary = self.order_summary(composer)?;
        composer.format_message(&summary, info)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Product;
    use rust_decimal::Decimal;
    use std::cell::Cell;

    struct CountingSource {
        calls: Cell<usize>,
        catalog: Catalog,
    }

    impl CountingSource {
        fn new(catalog: Catalog) -> Self {
            Self {
                calls: Cell::new(0),
                catalog,
            }
        }
    }

    impl CatalogSource for CountingSource {
        fn load(&self) -> LoadOutcome {
            self.calls.set(self.calls.get() + 1);
            LoadOutcome::Loaded {
                catalog: self.catalog.clone(),
                rejected: 0,
            }
        }
    }

    fn two_products() -> Catalog {
        Catalog::from(vec![
            Product::new("Bed", Decimal::new(500, 2), 2),
            Product::new("Bowl", Decimal::new(300, 2), 0),
        ])
    }

    #[test]
    fn catalog_loaded_once() {
        let source = CountingSource::new(two_products());
        let mut session = StorefrontSession::new();

        assert_eq!(session.ensure_catalog(&source).len(), 2);
        assert_eq!(session.ensure_catalog(&source).len(), 2);
        assert_eq!(source.calls.get(), 1);
    }

    #[test]
    fn empty_catalog_is_retried() {
        let source = CountingSource::new(Catalog::new());
        let mut session = StorefrontSession::new();

        session.ensure_catalog(&source);
        session.ensure_catalog(&source);
        assert_eq!(source.calls.get(), 2);
        assert!(session.needs_load());
    }

    #[test]
    fn sessions_are_independent() {
        let source = CountingSource::new(two_products());
        let mut first = StorefrontSession::new();
        let second = StorefrontSession::new();

        first.ensure_catalog(&source);
        first.select(0, 1).expect("select");

        assert!(second.needs_load());
        assert!(second.cart().is_empty());
    }

    #[test]
    fn select_checks_stock_and_index() {
        let mut session = StorefrontSession::with_catalog(two_products());

        assert!(session.select(0, 2).is_ok());
        assert_eq!(
            session.select(0, 3),
            Err(VitrinaError::QuantityExceedsStock {
                index: 0,
                requested: 3,
                stock: 2
            })
        );
        assert_eq!(
            session.select(1, 1),
            Err(VitrinaError::QuantityExceedsStock {
                index: 1,
                requested: 1,
                stock: 0
            })
        );
        assert_eq!(
            session.select(9, 1),
            Err(VitrinaError::IndexOutOfRange { index: 9, len: 2 })
        );
        assert_eq!(session.cart().quantity(0), 2);
    }

    #[test]
    fn select_zero_removes() {
        let mut session = StorefrontSession::with_catalog(two_products());
        session.select(0, 1).expect("select");
        session.select(0, 0).expect("deselect");
        assert!(session.cart().is_empty());
    }

    #[test]
    fn reload_clears_cart() {
        let source = CountingSource::new(two_products());
        let mut session = StorefrontSession::new();
        session.ensure_catalog(&source);
        session.select(0, 1).expect("select");

        session.reload(&source);
        assert!(session.cart().is_empty());
        assert_eq!(source.calls.get(), 2);
    }

    #[test]
    fn unavailable_source_leaves_empty_catalog_and_notice() {
        let mut session = StorefrontSession::new();
        session.install(LoadOutcome::SourceUnavailable(
            VitrinaError::SourceUnavailable("offline".to_string()),
        ));
        assert!(session.catalog().is_empty());
        assert!(matches!(session.notice(), Some(LoadNotice::Unavailable(_))));
    }

    #[test]
    fn new_session_is_empty_and_unloaded() {
        let session = StorefrontSession::new();
        assert!(session.needs_load());
        assert!(!session.is_loaded());
        assert!(session.catalog().is_empty());
        assert!(session.notice().is_none());
        assert_eq!(
            session.order_summary(&OrderComposer::default()),
            Ok(OrderSummary::default())
        );
    }

    #[test]
    fn empty_load_counts_as_loaded_but_retries() {
        let mut session = StorefrontSession::new();
        session.install(LoadOutcome::Loaded {
            catalog: Catalog::new(),
            rejected: 3,
        });
        assert!(session.is_loaded());
        assert!(session.needs_load());
        assert_eq!(session.notice().map(LoadNotice::rejected), Some(3));
    }

    #[test]
    fn shared_catalog_is_not_copied() {
        let catalog = Arc::new(two_products());
        let notice = LoadNotice::Loaded {
            products: 2,
            rejected: 0,
        };
        let mut first = StorefrontSession::new();
        let mut second = StorefrontSession::new();
        first.install_shared(Arc::clone(&catalog), notice.clone());
        second.install_shared(Arc::clone(&catalog), notice);

        assert!(Arc::ptr_eq(&first.shared_catalog(), &second.shared_catalog()));
        assert!(!first.needs_load());

        first.select(0, 1).expect("select");
        assert!(second.cart().is_empty());
    }

    #[test]
    fn order_summary_uses_cart() {
        let mut session = StorefrontSession::with_catalog(two_products());
        session.select(0, 2).expect("select");
        let summary = session
            .order_summary(&OrderComposer::default())
            .expect("summary");
        assert_eq!(summary.total, Decimal::new(1000, 2));
    }
}
