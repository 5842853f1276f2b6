//! Error types for the mibody_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for mibody_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The export file could not be opened or read
    #[error("File, '{source_name}' could not be read: {source}")]
    SourceUnreadable {
        source_name: String,
        #[source]
        source: io::Error,
    },

    /// The export file is larger than the configured read bound
    #[error("Input exceeds the {limit} byte limit")]
    SourceTooLarge { limit: u64 },

    /// Collection accessed outside `[0, len)`
    #[error("Index {index} out of range for {len} weigh-ins")]
    IndexOutOfRange { index: usize, len: usize },

    /// Unknown export format or unit name
    #[error("{0}")]
    UnsupportedExportFormat(String),

    /// Strict parsing requested and at least one record was rejected
    #[error("{skipped} record(s) could not be decoded")]
    StrictParse { skipped: usize },

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A previously exported CSV row could not be read back
    #[error("Import error: {0}")]
    Import(String),
}

impl Error {
    pub(crate) fn unsupported(kind: &str, value: &str) -> Self {
        Error::UnsupportedExportFormat(format!("{}, '{}' is invalid", kind, value))
    }
}

/// Why a single 18-byte block was rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("truncated record: {len} of 18 bytes")]
    Truncated { len: usize },

    #[error("invalid timestamp {year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}")]
    InvalidTimestamp {
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    },

    #[error("age must be positive")]
    ZeroAge,

    #[error("height must be positive")]
    ZeroHeight,

    #[error("weight must be positive")]
    ZeroWeight,

    #[error("body fat {0}% is outside 0-100%")]
    BodyFatOutOfRange(f64),

    #[error("muscle mass {0} is negative")]
    MuscleMassOutOfRange(f64),
}
