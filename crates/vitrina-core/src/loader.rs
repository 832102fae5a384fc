//! # Catalog Loader
//!
//! Row validation and product extraction for Vitrina.
//!
//! - Validate each row before it becomes a product
//! - Skip invalid rows silently (counted, never reported one by one)
//! - Keep source order
//! - Never fail past this boundary: an unreadable source is an empty catalog

use crate::primitives::{COLUMN_CODE, COLUMN_IMAGE, COLUMN_NAME, COLUMN_PRICE, COLUMN_STOCK};
use crate::row::{Row, Sheet};
use crate::sheet::read_sheet;
use crate::{Catalog, Product, VitrinaError};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// =============================================================================
// COLUMN MAP
// =============================================================================

/// Names of the source columns, matched case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub code: String,
    pub name: String,
    pub price: String,
    pub stock: String,
    pub image: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            code: COLUMN_CODE.to_string(),
            name: COLUMN_NAME.to_string(),
            price: COLUMN_PRICE.to_string(),
            stock: COLUMN_STOCK.to_string(),
            image: COLUMN_IMAGE.to_string(),
        }
    }
}

// =============================================================================
// LOAD OUTCOME
// =============================================================================

/// Result of one catalog load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The source was read. `rejected` rows did not become products.
    Loaded { catalog: Catalog, rejected: usize },
    /// The source could not be read at all.
    /// Callers show this as an empty catalog.
    SourceUnavailable(VitrinaError),
}

impl LoadOutcome {
    /// The loaded catalog, empty when the source was unavailable.
    #[must_use]
    pub fn catalog(&self) -> Catalog {
        match self {
            Self::Loaded { catalog, .. } => catalog.clone(),
            Self::SourceUnavailable(_) => Catalog::new(),
        }
    }

    /// Take the catalog out of the outcome.
    #[must_use]
    pub fn into_catalog(self) -> Catalog {
        match self {
            Self::Loaded { catalog, .. } => catalog,
            Self::SourceUnavailable(_) => Catalog::new(),
        }
    }

    /// Number of rows that were read but did not become products.
    #[must_use]
    pub fn rejected(&self) -> usize {
        match self {
            Self::Loaded { rejected, .. } => *rejected,
            Self::SourceUnavailable(_) => 0,
        }
    }

    /// The read failure, if any.
    #[must_use]
    pub fn source_error(&self) -> Option<&VitrinaError> {
        match self {
            Self::Loaded { .. } => None,
            Self::SourceUnavailable(e) => Some(e),
        }
    }

    /// True when the source could not be read.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::SourceUnavailable(_))
    }
}

// =============================================================================
// CATALOG SOURCE
// =============================================================================

/// Anything that can produce a catalog on demand.
///
/// Implementors must not panic and must report unreadable sources through
/// `LoadOutcome::SourceUnavailable`.
pub trait CatalogSource {
    fn load(&self) -> LoadOutcome;
}

/// A spreadsheet file on local disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    loader: CatalogLoader,
}

impl FileSource {
    /// Source reading `path` with the given loader.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, loader: CatalogLoader) -> Self {
        Self {
            path: path.into(),
            loader,
        }
    }

    /// The file this source reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for FileSource {
    fn load(&self) -> LoadOutcome {
        self.loader.load_path(&self.path)
    }
}

// =============================================================================
// LOADER
// =============================================================================

/// Builds a catalog from tabular rows.
#[derive(Debug, Clone, Default)]
pub struct CatalogLoader {
    columns: ColumnMap,
}

impl CatalogLoader {
    /// Loader using the given column names.
    #[must_use]
    pub fn new(columns: ColumnMap) -> Self {
        Self { columns }
    }

    /// Column names this loader reads.
    #[must_use]
    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// Load a catalog from a spreadsheet file.
    pub fn load_path(&self, path: &Path) -> LoadOutcome {
        match read_sheet(path) {
            Ok(sheet) => self.load_sheet(&sheet),
            Err(e) => LoadOutcome::SourceUnavailable(e),
        }
    }

    /// Load a catalog from rows already in memory.
    pub fn load_sheet(&self, sheet: &Sheet) -> LoadOutcome {
        let mut products = Vec::with_capacity(sheet.row_count());
        let mut rejected = 0usize;

        for row in sheet.rows() {
            match self.product_from_row(&row) {
                Some(product) => products.push(product),
                None => rejected = rejected.saturating_add(1),
            }
        }

        LoadOutcome::Loaded {
            catalog: Catalog::from(products),
            rejected,
        }
    }

    /// Validate and convert a single row.
    ///
    /// A row is valid if:
    /// - the name column has non-empty text
    /// - the price column is present, numeric, and not negative
    /// - the stock column is present
    ///
    /// Stock that is present but not numeric becomes 0 instead of rejecting
    /// the row. Fractional stock is truncated and negative stock becomes 0.
    #[must_use]
    pub fn product_from_row(&self, row: &Row<'_>) -> Option<Product> {
        let columns = &self.columns;

        let name = row.text(&columns.name)?;
        let price = row.number(&columns.price)?;
        if price.is_sign_negative() && !price.is_zero() {
            return None;
        }
        if !row.is_present(&columns.stock) {
            return None;
        }
        let stock = row
            .number(&columns.stock)
            .map(coerce_stock)
            .unwrap_or(0);

        Some(Product {
            name,
            price,
            stock,
            code: row.text(&columns.code).unwrap_or_default(),
            image: row.text(&columns.image),
        })
    }
}

/// Truncate toward zero and clamp into `0..=u32::MAX`.
fn coerce_stock(value: Decimal) -> u32 {
    if value.is_sign_negative() {
        return 0;
    }
    value.trunc().to_u32().unwrap_or(u32::MAX)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Cell;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).expect("decimal literal")
    }

    fn headers() -> Vec<String> {
        ["COD_ALFA", "DETALLE", "PRECIO", "STOCK", "Link"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn text_row(cells: [&str; 5]) -> Vec<Cell> {
        cells.iter().map(|c| Cell::from_text(c)).collect()
    }

    fn load(rows: Vec<Vec<Cell>>) -> LoadOutcome {
        CatalogLoader::default().load_sheet(&Sheet::new(headers(), rows))
    }

    #[test]
    fn valid_row_becomes_product() {
        let outcome = load(vec![text_row([
            " A-1 ",
            " Bed ",
            "10",
            "4",
            "https://img/bed.png",
        ])]);
        let catalog = outcome.into_catalog();
        assert_eq!(catalog.len(), 1);

        let product = catalog.get(0).expect("product");
        assert_eq!(product.name, "Bed");
        assert_eq!(product.price, dec("10"));
        assert_eq!(product.stock, 4);
        assert_eq!(product.code, "A-1");
        assert_eq!(product.image.as_deref(), Some("https://img/bed.png"));
    }

    #[test]
    fn non_numeric_stock_becomes_zero() {
        let outcome = load(vec![text_row(["", "Bed", "10", "abc", ""])]);
        let catalog = outcome.into_catalog();
        let product = catalog.get(0).expect("product");
        assert_eq!(product.stock, 0);
        assert_eq!(product.price, dec("10"));
        assert_eq!(product.code, "");
        assert_eq!(product.image, None);
    }

    #[test]
    fn rows_missing_required_fields_are_rejected() {
        let outcome = load(vec![
            text_row(["", "", "10", "1", ""]),
            text_row(["", "Bed", "", "1", ""]),
            text_row(["", "Bed", "cheap", "1", ""]),
            text_row(["", "Bed", "10", "", ""]),
            text_row(["", "Bed", "NaN", "1", ""]),
            text_row(["", "Bed", "-1", "1", ""]),
            text_row(["", "Bed", "1_0", "1", ""]),
        ]);
        assert_eq!(outcome.rejected(), 7);
        assert!(outcome.catalog().is_empty());
    }

    #[test]
    fn source_order_is_kept_without_gaps() {
        let outcome = load(vec![
            text_row(["", "First", "1", "1", ""]),
            text_row(["", "", "2", "1", ""]),
            text_row(["", "Third", "3", "1", ""]),
        ]);
        let names: Vec<_> = outcome.catalog().iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["First", "Third"]);
        assert_eq!(outcome.rejected(), 1);
    }

    #[test]
    fn stock_is_truncated_and_clamped() {
        assert_eq!(coerce_stock(dec("3.7")), 3);
        assert_eq!(coerce_stock(dec("-2")), 0);
        assert_eq!(coerce_stock(dec("99999999999")), u32::MAX);
    }

    #[test]
    fn numeric_code_reads_as_integer_text() {
        let rows = vec![vec![
            Cell::Number(dec("1234.0")),
            Cell::from_text("Bowl"),
            Cell::Number(dec("5.5")),
            Cell::Number(dec("2")),
            Cell::Empty,
        ]];
        let catalog = load(rows).into_catalog();
        assert_eq!(catalog.get(0).expect("product").code, "1234");
    }

    #[test]
    fn custom_column_names() {
        let columns = ColumnMap {
            name: "Name".to_string(),
            price: "Price".to_string(),
            stock: "Qty".to_string(),
            ..ColumnMap::default()
        };
        let sheet = Sheet::new(
            vec!["Name".to_string(), "Price".to_string(), "Qty".to_string()],
            vec![text_row_3("Toy", "2", "9")],
        );
        let catalog = CatalogLoader::new(columns).load_sheet(&sheet).into_catalog();
        assert_eq!(catalog.get(0).expect("product").name, "Toy");
    }

    fn text_row_3(a: &str, b: &str, c: &str) -> Vec<Cell> {
        vec![Cell::from_text(a), Cell::from_text(b), Cell::from_text(c)]
    }

    #[test]
    fn missing_file_gives_empty_catalog() {
        let source = FileSource::new("/no/such/catalog.xlsx", CatalogLoader::default());
        let outcome = source.load();
        assert!(outcome.is_unavailable());
        assert!(outcome.catalog().is_empty());
        assert!(matches!(
            outcome.source_error(),
            Some(VitrinaError::SourceUnavailable(_))
        ));
    }
}
