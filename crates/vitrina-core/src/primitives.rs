//! # Primitives
//!
//! Fixed constants for the Vitrina core.
//!
//! Anything an operator may want to change (column names, the contact form,
//! the greeting, the phone number) has a default here and an override in
//! the app's configuration file.

// =============================================================================
// SOURCE SCHEMA
// =============================================================================

/// Default column holding the vendor code.
pub const COLUMN_CODE: &str = "COD_ALFA";

/// Default column holding the product name. Required.
pub const COLUMN_NAME: &str = "DETALLE";

/// Default column holding the unit price. Required and numeric.
pub const COLUMN_PRICE: &str = "PRECIO";

/// Default column holding the stock count. Required.
pub const COLUMN_STOCK: &str = "STOCK";

/// Default column holding the image URL.
pub const COLUMN_IMAGE: &str = "Link";

/// Cell texts treated as a missing value, matched case-insensitively
/// after trimming. Mirrors what spreadsheet exports commonly write for NaN.
pub const MISSING_MARKERS: &[&str] = &["nan", "na", "n/a", "null", "none", "#n/a"];

// =============================================================================
// INPUT LIMITS
// =============================================================================

/// Maximum size of a catalog file (50 MB).
///
/// Larger files are reported as an unavailable source rather than read.
pub const MAX_SOURCE_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Maximum number of data rows read from one source.
pub const MAX_SOURCE_ROWS: usize = 100_000;

// =============================================================================
// ORDER MESSAGE
// =============================================================================

/// First line of every order message.
pub const DEFAULT_GREETING: &str = "¡Hola! Quiero hacer el siguiente pedido:";

/// Shown in place of an empty product code.
pub const CODE_PLACEHOLDER: &str = "N/A";

/// Fractional digits used when displaying money.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

// =============================================================================
// DEEP LINK
// =============================================================================

/// Base of the messaging-app deep link; the phone number follows directly.
pub const DEEP_LINK_BASE: &str = "https://wa.me/";

/// Query parameter carrying the encoded message.
pub const DEEP_LINK_TEXT_PARAM: &str = "text";
