// In: src/error.rs

//! This module defines the single, unified error type for the entire smlm loader.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmlmError {
    // =========================================================================
    // === Manifest-Level Errors (always abort the whole load)
    // =========================================================================
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Unsupported format version '{found}' (expected '{expected}')")]
    UnsupportedVersion { found: String, expected: &'static str },

    // =========================================================================
    // === Format Resolution Errors
    // =========================================================================
    #[error("Unknown format key: {0}")]
    UnknownFormat(String),

    #[error("Malformed format spec '{format}': {reason}")]
    MalformedFormatSpec { format: String, reason: String },

    #[error("Format mode '{0}' is not supported")]
    UnsupportedMode(String),

    #[error("Unknown dtype: {0}")]
    UnknownDType(String),

    // =========================================================================
    // === Entry-Level Errors
    // =========================================================================
    #[error("Archive entry not found: {0}")]
    MissingArchiveEntry(String),

    #[error("Unrecognized entry type: {0}")]
    UnrecognizedEntryType(String),

    #[error("Table buffer too short: expected {expected} bytes, got {actual}")]
    TruncatedTable { expected: usize, actual: usize },

    #[error("Table buffer too long: expected {expected} bytes, got {actual}")]
    OversizedTable { expected: usize, actual: usize },

    #[error("Cannot compute statistics of an empty table")]
    EmptyTable,

    #[error("Column '{0}' not found in table")]
    MissingColumn(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Image decoding failed: {0}")]
    ImageDecode(String),

    #[error("Failed to load entry '{entry}': {source}")]
    EntryFailed {
        entry: String,
        #[source]
        source: Box<SmlmError>,
    },

    #[error("Internal logic error (this is a bug): {0}")]
    InternalError(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, raised while reading manifests or configs.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// An error from the zip container layer.
    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// An error originating from the Arrow library.
    #[error("Arrow operation failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// An error from a safe byte-casting operation failing.
    #[error("Byte slice casting error: {0}")]
    PodCast(String), // bytemuck::PodCastError doesn't impl Error
}

impl SmlmError {
    /// Returns `true` for failures the loader may step over without aborting:
    /// a payload that is listed in the manifest but absent from the archive.
    pub fn is_missing_payload(&self) -> bool {
        matches!(self, SmlmError::MissingArchiveEntry(_))
    }
}

// =============================================================================
// === Manual `From` Implementations ===
// =============================================================================

impl From<bytemuck::PodCastError> for SmlmError {
    fn from(err: bytemuck::PodCastError) -> Self {
        SmlmError::PodCast(err.to_string())
    }
}
