//! This module defines the core, strongly-typed data representations used
//! throughout the loader.
//!
//! It currently includes the canonical `DType` enum which replaces string-keyed
//! width and codec lookups with a closed, exhaustively-matched enum, and the
//! `ColumnData` storage the decoders fill.

pub mod dtype;

// Re-export the main type(s) for easier access.
pub use dtype::{ColumnData, DType, LeScalar};
