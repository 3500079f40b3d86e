// In: src/manifest/mod.rs

//! Defines the `manifest.json` document at the root of every `.smlm` archive
//! and the parser that validates it.
//!
//! The manifest is the single contract between the archive writer and this
//! loader: it names every payload entry, its kind, and (for tables) the
//! column layout the payload bytes follow. Parsing is strict about the
//! top-level schema and the format version, and lenient about additional
//! keys, which are preserved verbatim in each struct's `extra` map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SmlmError;

pub mod format_spec;

pub use format_spec::{resolve_format, ColumnLayout, FormatMode, FormatSpec, TableLayout};

//==================================================================================
// I. Format Constants
//==================================================================================

/// The only manifest `format_version` this loader understands.
pub const SUPPORTED_FORMAT_VERSION: &str = "0.2";
/// Name of the manifest member inside the archive.
pub const MANIFEST_ENTRY_NAME: &str = "manifest.json";

//==================================================================================
// II. Manifest Structures
//==================================================================================

/// The parsed archive manifest.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Manifest {
    pub format_version: String,
    /// Column-layout descriptors, keyed by the name `FileEntry::format` refers to.
    pub formats: BTreeMap<String, FormatSpec>,
    /// Payload entries in archive-declared order. Callers index this positionally.
    pub files: Vec<FileEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The kind of payload a `FileEntry` describes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum EntryKind {
    Table,
    Image,
    /// Any other type string. Such entries are listed but never decoded.
    Other(String),
}

impl From<String> for EntryKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "table" => EntryKind::Table,
            "image" => EntryKind::Image,
            _ => EntryKind::Other(value),
        }
    }
}

impl From<EntryKind> for String {
    fn from(kind: EntryKind) -> Self {
        kind.as_str().to_string()
    }
}

impl EntryKind {
    pub fn as_str(&self) -> &str {
        match self {
            EntryKind::Table => "table",
            EntryKind::Image => "image",
            EntryKind::Other(other) => other,
        }
    }
}

/// One payload entry listed in the manifest.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FileEntry {
    /// Archive member holding the payload bytes.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Key into `Manifest::formats`. Required for tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Number of rows in a table payload. Required for tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manifest {
    /// Looks up and validates the format a table entry refers to.
    pub fn format_for(&self, entry: &FileEntry) -> Result<&FormatSpec, SmlmError> {
        let key = entry.format.as_deref().ok_or_else(|| {
            SmlmError::UnknownFormat(format!("<none> (entry '{}' has no format key)", entry.name))
        })?;
        resolve_format(key, &self.formats)
    }
}

//==================================================================================
// III. Parsing
//==================================================================================

/// Parses and validates the raw bytes of `manifest.json`.
///
/// # Errors
/// * `InvalidManifest` if the bytes are not a JSON object with `format_version`,
///   `formats` and `files`, if any of them has the wrong shape, or if a table
///   entry lacks `format` or `rows`.
/// * `UnsupportedVersion` if `format_version` is not `SUPPORTED_FORMAT_VERSION`.
pub fn parse_manifest(bytes: &[u8]) -> Result<Manifest, SmlmError> {
    let document: Value = serde_json::from_slice(bytes)
        .map_err(|e| SmlmError::InvalidManifest(format!("manifest is not valid JSON: {}", e)))?;

    let object = document
        .as_object()
        .ok_or_else(|| SmlmError::InvalidManifest("manifest root must be an object".to_string()))?;

    let version = object
        .get("format_version")
        .ok_or_else(|| SmlmError::InvalidManifest("missing field 'format_version'".to_string()))?
        .as_str()
        .ok_or_else(|| SmlmError::InvalidManifest("'format_version' must be a string".to_string()))?;

    if version != SUPPORTED_FORMAT_VERSION {
        return Err(SmlmError::UnsupportedVersion {
            found: version.to_string(),
            expected: SUPPORTED_FORMAT_VERSION,
        });
    }

    for field in ["formats", "files"] {
        if !object.contains_key(field) {
            return Err(SmlmError::InvalidManifest(format!("missing field '{}'", field)));
        }
    }

    let manifest: Manifest = serde_json::from_value(document)
        .map_err(|e| SmlmError::InvalidManifest(e.to_string()))?;

    for (index, entry) in manifest.files.iter().enumerate() {
        if entry.kind != EntryKind::Table {
            continue;
        }
        if entry.format.is_none() {
            return Err(SmlmError::InvalidManifest(format!(
                "table entry {} ('{}') has no 'format'",
                index, entry.name
            )));
        }
        if entry.rows.is_none() {
            return Err(SmlmError::InvalidManifest(format!(
                "table entry {} ('{}') has no 'rows'",
                index, entry.name
            )));
        }
    }

    log::debug!(
        "Parsed manifest v{} with {} format(s) and {} file(s)",
        manifest.format_version,
        manifest.formats.len(),
        manifest.files.len()
    );
    Ok(manifest)
}

#[cfg(test)]
mod tests;
