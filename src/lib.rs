//! xlsxquote - Pure-Rust quote normalizer for Excel line-item sheets
//!
//! This crate reads a loosely structured spreadsheet of line items (products,
//! services, bills of materials), resolves its inconsistently named columns to a
//! fixed set of fields, derives normalized line items, groups them by category,
//! and issues a sequential quote number. The result is a `QuoteDocument` that a
//! renderer (HTML template, PDF writer) can consume directly.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::fs::File;
//! use xlsxquote::{title_from_stem, QuoteBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create an engine with default settings
//!     let engine = QuoteBuilder::new().build()?;
//!
//!     // Normalize the sheet and issue the next quote number
//!     let input = File::open("Acme_Renewal.xlsx")?;
//!     let document = engine.prepare(input, &title_from_stem("Acme_Renewal"))?;
//!
//!     // Hand the document to a renderer
//!     let output = File::create(format!("{}.json", document.file_stem()))?;
//!     document.write_json(output)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use std::fs::File;
//! use xlsxquote::{CanonicalField, QuoteBuilder, QuoteDefaults, SheetSelector};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = QuoteBuilder::new()
//!         .with_sheet_selector(SheetSelector::Name("Lines".to_string()))
//!         .with_aliases(CanonicalField::Sku, ["part no", "sku"])
//!         .with_counter_path("state/quote_number.txt")
//!         .with_prefix("BOM-")
//!         .with_defaults(QuoteDefaults::from_path("quote_defaults.json")?)
//!         .build()?;
//!
//!     let document = engine.prepare(File::open("deal.xlsx")?, "Deal")?;
//!     println!("{} total: {:.2}", document.quote_number, document.total);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Normalization Without I/O
//!
//! ```rust
//! use xlsxquote::{Cell, QuoteBuilder, RawTable};
//!
//! # fn main() -> Result<(), xlsxquote::QuoteError> {
//! let engine = QuoteBuilder::new().build()?;
//! let table = RawTable::new(
//!     vec!["SKU".to_string(), "Qty".to_string(), "Your Price".to_string()],
//!     vec![vec![Cell::from("A-1"), Cell::Number(2.0), Cell::Number(10.0)]],
//! );
//!
//! let normalized = engine.normalize(&table);
//! assert_eq!(normalized.items[0].subtotal, 20.0);
//! assert_eq!(normalized.total, 20.0);
//! # Ok(())
//! # }
//! ```

mod aggregate;
mod api;
mod builder;
mod config;
mod counter;
mod dates;
mod document;
mod error;
mod filename;
mod headers;
mod items;
mod parser;
mod security;
mod types;

// 公開API
pub use aggregate::{grand_total, group_by_category, nan_tolerant_sum};
pub use api::{CanonicalField, SheetSelector};
pub use builder::{QuoteBuilder, QuoteEngine};
pub use config::QuoteDefaults;
pub use counter::{issue_next, QuoteCounter, DEFAULT_COUNTER_PATH, DEFAULT_PREFIX};
pub use dates::DateNormalizer;
pub use document::{NormalizedQuote, QuoteDocument};
pub use error::QuoteError;
pub use filename::{safe_filename, title_from_stem};
pub use headers::{resolve_columns, ColumnMapping, FieldCandidates, ResolvedColumn};
pub use items::{parse_number, ItemDeriver};
pub use types::{CategoryGroup, Cell, LineItem, RawTable, UNCATEGORIZED};
