//! # vitrina-core
//!
//! Catalog loading and order composition for the Vitrina storefront - THE LOGIC.
//!
//! A shop keeps its products in a spreadsheet. This crate turns that
//! spreadsheet into a typed catalog, tracks what a customer selects, and
//! formats the resulting order as a message plus a messaging-app deep link.
//!
//! ## Architectural Constraints
//!
//! - No async, no network: remote spreadsheets are downloaded by the app
//!   layer and handed to the loader as local files
//! - No floats: prices and totals are `rust_decimal::Decimal`
//! - No logging: load results are returned, the caller decides what to report
//! - Loader never fails past its boundary; an unreadable source is an empty catalog

// =============================================================================
// MODULES
// =============================================================================

pub mod composer;
pub mod contact;
pub mod link;
pub mod loader;
pub mod primitives;
pub mod row;
pub mod session;
pub mod sheet;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    CartSelection, Catalog, LineItem, OrderSummary, Product, VitrinaError, format_money,
};

// =============================================================================
// RE-EXPORTS: Loading and Composition
// =============================================================================

pub use composer::{OrderComposer, OrderMessage, compute_order, format_line_item};
pub use contact::{ContactField, ContactForm, CustomerInfo, is_submittable};
pub use link::{PhoneNumber, build_link, message_from_link};
pub use loader::{CatalogLoader, CatalogSource, ColumnMap, FileSource, LoadOutcome};
pub use row::{Cell, Row, Sheet};
pub use session::{LoadNotice, StorefrontSession};
