//! Column-layout descriptors and their resolution into byte offsets.
//!
//! A `FormatSpec` is what the manifest says; a `TableLayout` is what the
//! decoders consume: every dtype string mapped through `DType`, every column
//! given its width and its offset inside a row, and the row stride summed up.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SmlmError;
use crate::types::DType;

/// The payload encoding a format declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatMode {
    /// Row-major packed little-endian records.
    Binary,
}

/// A named column-layout descriptor, as written in the manifest.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FormatSpec {
    pub mode: String,
    /// Column names; order is significant.
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub dtype: Vec<String>,
    #[serde(default)]
    pub shape: Vec<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Returns the format registered under `key`, validated.
///
/// # Errors
/// `UnknownFormat` if `key` is absent, `MalformedFormatSpec` if the format
/// fails `FormatSpec::validate`.
pub fn resolve_format<'a>(
    key: &str,
    formats: &'a BTreeMap<String, FormatSpec>,
) -> Result<&'a FormatSpec, SmlmError> {
    let spec = formats
        .get(key)
        .ok_or_else(|| SmlmError::UnknownFormat(key.to_string()))?;
    spec.validate(key)?;
    Ok(spec)
}

impl FormatSpec {
    /// Checks the structural invariants of the descriptor.
    ///
    /// `headers`, `dtype` and `shape` must have the same length, header names
    /// must be unique, and every `shape` entry must be 1.
    pub fn validate(&self, key: &str) -> Result<(), SmlmError> {
        let malformed = |reason: String| SmlmError::MalformedFormatSpec {
            format: key.to_string(),
            reason,
        };

        if self.headers.len() != self.dtype.len() || self.headers.len() != self.shape.len() {
            return Err(malformed(format!(
                "headers ({}), dtype ({}) and shape ({}) lengths differ",
                self.headers.len(),
                self.dtype.len(),
                self.shape.len()
            )));
        }

        let mut seen = HashSet::with_capacity(self.headers.len());
        for header in &self.headers {
            if !seen.insert(header.as_str()) {
                return Err(malformed(format!("duplicate header '{}'", header)));
            }
        }

        if let Some((i, shape)) = self.shape.iter().enumerate().find(|(_, s)| **s != 1) {
            return Err(malformed(format!(
                "column '{}' has shape {}; only scalar columns are supported",
                self.headers[i], shape
            )));
        }
        Ok(())
    }

    /// Parses the declared `mode`.
    pub fn mode(&self) -> Result<FormatMode, SmlmError> {
        match self.mode.as_str() {
            "binary" => Ok(FormatMode::Binary),
            other => Err(SmlmError::UnsupportedMode(other.to_string())),
        }
    }

    /// Resolves this descriptor into a byte layout.
    pub fn layout(&self, key: &str) -> Result<TableLayout, SmlmError> {
        self.validate(key)?;
        if self.headers.is_empty() {
            return Err(SmlmError::MalformedFormatSpec {
                format: key.to_string(),
                reason: "format declares no columns".to_string(),
            });
        }

        let mut columns = Vec::with_capacity(self.headers.len());
        let mut offset = 0;
        for (name, dtype) in self.headers.iter().zip(&self.dtype) {
            let dtype: DType = dtype.parse()?;
            let width = dtype.byte_width();
            columns.push(ColumnLayout {
                name: name.clone(),
                dtype,
                offset,
                width,
            });
            offset += width;
        }

        Ok(TableLayout {
            format_key: key.to_string(),
            columns,
            row_stride: offset,
        })
    }
}

/// Placement of one column inside a packed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub name: String,
    pub dtype: DType,
    /// Byte offset of the column from the start of the row.
    pub offset: usize,
    pub width: usize,
}

/// A fully resolved table layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    format_key: String,
    columns: Vec<ColumnLayout>,
    row_stride: usize,
}

impl TableLayout {
    pub fn format_key(&self) -> &str {
        &self.format_key
    }

    pub fn columns(&self) -> &[ColumnLayout] {
        &self.columns
    }

    /// Total byte width of one row: the sum of all column widths.
    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Checks that a payload of `actual` bytes holds exactly `rows` rows.
    pub fn check_buffer(&self, actual: usize, rows: usize) -> Result<(), SmlmError> {
        let expected = rows.checked_mul(self.row_stride).ok_or_else(|| {
            SmlmError::InvalidArgument(format!(
                "{} rows of {} bytes overflow the address space",
                rows, self.row_stride
            ))
        })?;
        if actual < expected {
            return Err(SmlmError::TruncatedTable { expected, actual });
        }
        if actual > expected {
            return Err(SmlmError::OversizedTable { expected, actual });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(headers: &[&str], dtype: &[&str], shape: &[u64]) -> FormatSpec {
        FormatSpec {
            mode: "binary".to_string(),
            headers: headers.iter().map(|s| s.to_string()).collect(),
            dtype: dtype.iter().map(|s| s.to_string()).collect(),
            shape: shape.to_vec(),
            extra: Map::new(),
        }
    }

    #[test]
    fn test_layout_offsets_and_stride() {
        let layout = spec(
            &["frame", "x", "y", "flag"],
            &["uint32", "float64", "float32", "uint8"],
            &[1, 1, 1, 1],
        )
        .layout("smlm-table(binary)")
        .unwrap();

        let offsets: Vec<usize> = layout.columns().iter().map(|c| c.offset).collect();
        let widths: Vec<usize> = layout.columns().iter().map(|c| c.width).collect();
        assert_eq!(offsets, vec![0, 4, 12, 16]);
        assert_eq!(widths, vec![4, 8, 4, 1]);
        assert_eq!(layout.row_stride(), 17);
        assert_eq!(layout.headers(), vec!["frame", "x", "y", "flag"]);
        assert_eq!(layout.format_key(), "smlm-table(binary)");
    }

    #[test]
    fn test_length_mismatch_is_malformed() {
        let result = spec(&["x", "y"], &["float32"], &[1, 1]).validate("f");
        assert!(matches!(result, Err(SmlmError::MalformedFormatSpec { .. })));
    }

    #[test]
    fn test_duplicate_header_is_malformed() {
        let result = spec(&["x", "x"], &["float32", "float32"], &[1, 1]).validate("f");
        match result {
            Err(SmlmError::MalformedFormatSpec { reason, .. }) => assert!(reason.contains("duplicate")),
            other => panic!("Expected MalformedFormatSpec, got {:?}", other),
        }
    }

    #[test]
    fn test_non_scalar_shape_is_malformed() {
        let result = spec(&["xy"], &["float32"], &[2]).layout("f");
        assert!(matches!(result, Err(SmlmError::MalformedFormatSpec { .. })));
    }

    #[test]
    fn test_unknown_dtype_fails_layout() {
        let result = spec(&["x"], &["int64"], &[1]).layout("f");
        assert!(matches!(result, Err(SmlmError::UnknownDType(ref d)) if d == "int64"));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(spec(&[], &[], &[]).mode().unwrap(), FormatMode::Binary);
        let mut json = spec(&[], &[], &[]);
        json.mode = "json".to_string();
        assert!(matches!(json.mode(), Err(SmlmError::UnsupportedMode(ref m)) if m == "json"));
    }

    #[test]
    fn test_resolve_unknown_key() {
        let formats = BTreeMap::new();
        assert!(matches!(
            resolve_format("missing", &formats),
            Err(SmlmError::UnknownFormat(ref k)) if k == "missing"
        ));
    }

    #[test]
    fn test_check_buffer_policy() {
        let layout = spec(&["a", "b"], &["uint32", "float64"], &[1, 1]).layout("f").unwrap();
        assert!(layout.check_buffer(24, 2).is_ok());
        assert!(layout.check_buffer(0, 0).is_ok());
        assert!(matches!(
            layout.check_buffer(23, 2),
            Err(SmlmError::TruncatedTable { expected: 24, actual: 23 })
        ));
        assert!(matches!(
            layout.check_buffer(36, 2),
            Err(SmlmError::OversizedTable { expected: 24, actual: 36 })
        ));
    }
}
