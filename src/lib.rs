#![forbid(unsafe_code)]
//! PO/POT translation catalogs driven by a CSV string table.
//!
//! Parses and writes the gettext subset used for game string tables (one
//! `msgctxt` key per entry, no plurals), keeps header timestamps stable while
//! content is unchanged, and batches untranslated entries through a pluggable
//! [`Translator`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pocodec::{Document, HeaderOptions, Parser, SourceTable, source_table};
//!
//! let table = SourceTable::read_from("strings.csv")?;
//! let existing = Document::read_from("l18n/russian.po")?;
//! let merged = source_table::merge_into(
//!     &table,
//!     Some(&existing),
//!     "russian",
//!     &HeaderOptions::new(),
//!     chrono::Utc::now(),
//! );
//! merged.write_to("l18n/russian.po")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Modules
//!
//! - [`parser`] / [`writer`]: text to [`Document`] and back
//! - [`header`]: fingerprint and change-gated date headers
//! - [`source_table`]: CSV loading, template generation, merging, export
//! - [`translate`]: batched machine translation
//! - [`operations`] / [`store`]: maintenance passes and per-language files

pub mod error;
pub mod escape;
pub mod header;
pub mod languages;
pub mod operations;
pub mod parser;
pub mod source_table;
pub mod store;
pub mod traits;
pub mod translate;
pub mod types;
pub mod writer;

// Re-export most used types for easy consumption
pub use crate::{
    error::Error,
    header::HeaderOptions,
    languages::LanguageMap,
    operations::{
        DocumentStats, LanguageStats, clean_identical, document_stats, remove_unused, table_stats,
    },
    source_table::{SourceRow, SourceTable},
    traits::Parser,
    translate::{TranslateOptions, TranslationRequest, Translator, translate_document},
    types::{Document, Entry},
};
