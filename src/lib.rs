//! This file is the root of the `smlm_loader` Rust crate.
//!
//! The crate reads `.smlm` archives: a zip container holding a `manifest.json`
//! and a set of payload entries. Tables are stored as packed little-endian
//! rows and come back as typed columns with per-column min / max / mean;
//! images are handed to a pluggable decoder.
//!
//! Its responsibilities here are strictly limited to:
//! 1.  Declaring all the top-level modules of the library so the compiler
//!     knows they exist.
//! 2.  Re-exporting the handful of types most callers need.
//!
//! ```no_run
//! use smlm_loader::{import_smlm, SmlmError};
//!
//! fn main() -> Result<(), SmlmError> {
//!     let archive = import_smlm("localization_table.smlm")?;
//!     for (name, table) in archive.tables() {
//!         println!("{}: {} rows, columns {:?}", name, table.rows(), table.headers);
//!     }
//!     Ok(())
//! }
//! ```

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

#[doc(hidden)]
pub use log as __log;

pub mod archive;
pub mod bridge;
pub mod config;
pub mod error;
#[cfg(feature = "ndarray")]
pub mod histogram;
pub mod manifest;
pub mod table;
pub mod types;

//==================================================================================
// 2. Public Re-exports
//==================================================================================
pub use archive::{import_smlm, ArchiveLoader, ArchiveSource, EntryData, LoadedArchive, LoadedEntry};
pub use config::{DecodeStrategy, EntryFailurePolicy, LoaderConfig, LoggingConfig};
pub use error::SmlmError;
pub use manifest::{parse_manifest, FileEntry, FormatSpec, Manifest};
pub use observability::init_logging;
pub use table::TableData;
pub use types::{ColumnData, DType};
