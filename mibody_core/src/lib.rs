#![forbid(unsafe_code)]

//! Reader for the `BODYDATA.TXT` export written by Salter MiBody scales.
//!
//! This crate provides:
//! - Decoding of the scale's fixed 18-byte record blocks
//! - Rows with derived metrics (BMI, BMR, classification, imperial units)
//! - The ordered `BodyData` collection
//! - CSV / JSON export and CSV re-ingestion
//! - Configuration and logging setup

pub mod types;
pub mod error;
pub mod record;
pub mod row;
pub mod collection;
pub mod export;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{DecodeError, Error, Result};
pub use types::*;
pub use record::{parse_records, ParseReport, SkippedRecord};
pub use row::{BodyDataRow, FieldValue};
pub use collection::BodyData;
pub use export::ExportOptions;
pub use config::Config;
