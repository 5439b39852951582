//! Core types for pricelist-rs
//!
//! This crate holds everything the extraction crates share: the data model
//! (documents, raw tables, product records, batch results), the error kinds,
//! vendor identity derivation, currency token helpers, bounding-box geometry
//! and the tunable extraction options.
//!
//! It deliberately has no PDF, raster or OCR dependencies — those live behind
//! capability seams in `pricelist-extract` and `pricelist-ocr`.

pub mod error;
pub mod geometry;
pub mod money;
pub mod options;
pub mod record;
pub mod table;
pub mod vendor;

pub use error::{ErrorKind, ExtractError, Result};
pub use geometry::BoundingBox;
pub use options::ExtractionOptions;
pub use record::{BatchResult, BatchStats, DocumentResult, DocumentStats, FailureEntry, ProductRecord};
pub use table::{Provenance, RawTable, SourceDocument};
pub use vendor::{vendor_label, VendorLabel};
