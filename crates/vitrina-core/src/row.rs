//! # Typed Rows
//!
//! Tabular data as read from a spreadsheet, with tolerant typing.
//!
//! - A `Cell` is empty, numeric, or text. NaN-like texts are empty.
//! - A `Row` looks cells up by column name and reports absence explicitly.
//! - Coercion policy per field lives in the loader, not here.

use crate::primitives::MISSING_MARKERS;
use rust_decimal::Decimal;
use std::str::FromStr;

// =============================================================================
// CELL
// =============================================================================

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cell {
    /// Blank, missing, or a NaN marker.
    #[default]
    Empty,
    /// A value the source stored as a number.
    Number(Decimal),
    /// Any other value, already trimmed and non-empty.
    Text(String),
}

impl Cell {
    /// Build a cell from raw text.
    ///
    /// Whitespace-only text and missing markers (`NaN`, `N/A`, ...) become `Empty`.
    #[must_use]
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || is_missing_marker(trimmed) {
            Self::Empty
        } else {
            Self::Text(trimmed.to_string())
        }
    }

    /// True for `Cell::Empty`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Numeric value, parsing text when needed.
    #[must_use]
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Self::Empty => None,
            Self::Number(n) => Some(*n),
            Self::Text(s) => parse_decimal(s),
        }
    }

    /// Text value. Numbers are rendered without trailing zeros,
    /// so a code stored as `1234.0` reads back as `"1234"`.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Number(n) => Some(n.normalize().to_string()),
            Self::Text(s) => Some(s.clone()),
        }
    }
}

fn is_missing_marker(text: &str) -> bool {
    MISSING_MARKERS
        .iter()
        .any(|marker| marker.eq_ignore_ascii_case(text))
}

/// Parse a decimal from plain (`12.50`) or scientific (`1.25e1`) notation.
///
/// Digit separators (`1_0`) are not numbers in a spreadsheet cell.
#[must_use]
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.contains('_') {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

// =============================================================================
// SHEET
// =============================================================================

/// A header row plus data rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sheet {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Create a sheet. Header names are trimmed.
    #[must_use]
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            headers: headers.into_iter().map(|h| h.trim().to_string()).collect(),
            rows,
        }
    }

    /// Column names in source order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Iterate data rows in source order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|cells| Row {
            headers: &self.headers,
            cells,
        })
    }
}

// =============================================================================
// ROW ACCESSOR
// =============================================================================

/// Borrowed view of one data row, addressed by column name.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    headers: &'a [String],
    cells: &'a [Cell],
}

impl<'a> Row<'a> {
    /// Cell under `column`, or `None` when the column does not exist,
    /// the row is short, or the cell is empty.
    #[must_use]
    pub fn cell(&self, column: &str) -> Option<&'a Cell> {
        let position = self.headers.iter().position(|h| h == column)?;
        self.cells.get(position).filter(|cell| !cell.is_empty())
    }

    /// True when `column` holds a non-empty value.
    #[must_use]
    pub fn is_present(&self, column: &str) -> bool {
        self.cell(column).is_some()
    }

    /// Trimmed text under `column`.
    #[must_use]
    pub fn text(&self, column: &str) -> Option<String> {
        self.cell(column).and_then(Cell::as_text)
    }

    /// Numeric value under `column`. Present but non-numeric cells give `None`.
    #[must_use]
    pub fn number(&self, column: &str) -> Option<Decimal> {
        self.cell(column).and_then(Cell::as_number)
    }
}

// =============================================================================
// TESTS
// =============================================================================
