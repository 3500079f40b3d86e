// In: src/table/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Table Decoding Pipeline
// ====================================================================================
//
//   1. [FormatSpec]        -> mode checked (binary only), resolved to a `TableLayout`
//         |
//   2. [TableLayout]       -> payload length checked against `rows * row_stride`
//         |
//   3. [TableDecoder]      -> packed rows split into one typed `ColumnData` per header
//         |                   (`StridedViewDecoder` or `SequentialUnpackDecoder`,
//         |                    chosen once by `select_decoder`)
//         |
//   4. [stats]             -> min / max / mean per column, in header order
//         |
//   5. [TableData]         -> handed back to the archive loader
//
// Both decoders honour the same contract and are cross-tested for bit-identical
// output; which one runs is invisible to callers.
// ====================================================================================

use crate::config::DecodeStrategy;
use crate::error::SmlmError;
use crate::manifest::{FormatMode, FormatSpec, TableLayout};
use crate::types::ColumnData;

mod sequential;
pub mod stats;
#[cfg(feature = "ndarray")]
mod strided;

pub use self::sequential::SequentialUnpackDecoder;
pub use self::stats::{compute_stats, ColumnStats};
#[cfg(feature = "ndarray")]
pub use self::strided::StridedViewDecoder;

//==================================================================================
// 1. Decoder Contract
//==================================================================================

/// **CONTRACT:** Splits a row-major packed payload into typed columns.
///
/// Callers guarantee `bytes.len() == rows * layout.row_stride()`. The returned
/// vector holds one column per `layout.columns()` entry, in the same order,
/// each exactly `rows` long. On error no partial column is returned.
pub trait TableDecoder: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn decode(
        &self,
        bytes: &[u8],
        layout: &TableLayout,
        rows: usize,
    ) -> Result<Vec<ColumnData>, SmlmError>;
}

/// Picks the decoder for the lifetime of a loader.
///
/// `Auto` and `StridedView` resolve to the strided-view decoder when the
/// `ndarray` feature is compiled in; without it both fall back to sequential
/// unpacking.
pub fn select_decoder(strategy: DecodeStrategy) -> Box<dyn TableDecoder> {
    let decoder: Box<dyn TableDecoder> = match strategy {
        DecodeStrategy::SequentialUnpack => Box::new(SequentialUnpackDecoder),
        DecodeStrategy::Auto | DecodeStrategy::StridedView => strided_or_fallback(strategy),
    };
    log::debug!("Selected table decoder: {}", decoder.name());
    decoder
}

#[cfg(feature = "ndarray")]
fn strided_or_fallback(_strategy: DecodeStrategy) -> Box<dyn TableDecoder> {
    Box::new(StridedViewDecoder)
}

#[cfg(not(feature = "ndarray"))]
fn strided_or_fallback(strategy: DecodeStrategy) -> Box<dyn TableDecoder> {
    if strategy == DecodeStrategy::StridedView {
        log::warn!(
            "Strided-view decoding requested but the `ndarray` feature is disabled; \
             falling back to sequential unpacking, performance will drop."
        );
    }
    Box::new(SequentialUnpackDecoder)
}

//==================================================================================
// 2. Decoded Table
//==================================================================================

/// A decoded table with its per-column summary statistics.
///
/// `headers`, `columns`, `min`, `max` and `avg` are all index-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct TableData {
    pub headers: Vec<String>,
    pub columns: Vec<ColumnData>,
    pub min: Vec<f64>,
    pub max: Vec<f64>,
    pub avg: Vec<f64>,
}

impl TableData {
    /// Computes statistics for already-decoded columns and assembles the table.
    pub fn from_columns(headers: Vec<String>, columns: Vec<ColumnData>) -> Result<Self, SmlmError> {
        let ColumnStats { min, max, avg } = compute_stats(&headers, &columns)?;
        Ok(Self {
            headers,
            columns,
            min,
            max,
            avg,
        })
    }

    /// Number of rows; every column has this length.
    pub fn rows(&self) -> usize {
        self.columns.first().map_or(0, ColumnData::len)
    }

    pub fn column(&self, header: &str) -> Option<&ColumnData> {
        self.headers
            .iter()
            .position(|h| h == header)
            .map(|i| &self.columns[i])
    }

    /// Iterates `(header, column)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnData)> {
        self.headers.iter().map(String::as_str).zip(&self.columns)
    }

    /// Compares two tables on the bit patterns of their values and statistics.
    pub fn bit_identical(&self, other: &TableData) -> bool {
        let same_bits = |a: &[f64], b: &[f64]| {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
        };
        self.headers == other.headers
            && self.columns.len() == other.columns.len()
            && self
                .columns
                .iter()
                .zip(&other.columns)
                .all(|(a, b)| a.bit_identical(b))
            && same_bits(&self.min, &other.min)
            && same_bits(&self.max, &other.max)
            && same_bits(&self.avg, &other.avg)
    }
}

//==================================================================================
// 3. Pipeline Entry Points
//==================================================================================

/// Decodes a table payload into columns without computing statistics.
///
/// # Errors
/// `UnsupportedMode` for any mode other than `binary`, `MalformedFormatSpec` /
/// `UnknownDType` if the format cannot be laid out, and `TruncatedTable` /
/// `OversizedTable` if `bytes` does not hold exactly `rows` rows.
pub fn decode_columns(
    decoder: &dyn TableDecoder,
    format_key: &str,
    spec: &FormatSpec,
    bytes: &[u8],
    rows: usize,
) -> Result<(TableLayout, Vec<ColumnData>), SmlmError> {
    match spec.mode()? {
        FormatMode::Binary => {}
    }
    let layout = spec.layout(format_key)?;
    layout.check_buffer(bytes.len(), rows)?;

    log_metric!(
        "event" = "decode_table",
        "decoder" = decoder.name(),
        "format" = format_key,
        "rows" = rows,
        "stride" = layout.row_stride(),
        "bytes" = bytes.len()
    );

    let columns = decoder.decode(bytes, &layout, rows)?;
    debug_assert!(columns.iter().all(|c| c.len() == rows));
    Ok((layout, columns))
}

/// Full table pipeline: decode, then compute statistics.
pub fn decode_table(
    decoder: &dyn TableDecoder,
    format_key: &str,
    spec: &FormatSpec,
    bytes: &[u8],
    rows: usize,
) -> Result<TableData, SmlmError> {
    let (layout, columns) = decode_columns(decoder, format_key, spec, bytes, rows)?;
    TableData::from_columns(layout.headers(), columns)
}

#[cfg(test)]
pub(crate) mod test_support;
