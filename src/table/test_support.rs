//! Builders shared by the table and archive tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Map;

use crate::manifest::FormatSpec;
use crate::types::{ColumnData, DType};

/// Packs index-aligned columns into a row-major little-endian payload.
pub(crate) fn pack_columns(columns: &[ColumnData]) -> Vec<u8> {
    let rows = columns.first().map_or(0, ColumnData::len);
    let stride: usize = columns.iter().map(|c| c.dtype().byte_width()).sum();
    let mut out = Vec::with_capacity(rows * stride);
    for row in 0..rows {
        for column in columns {
            match column {
                ColumnData::Uint8(v) => out.push(v[row]),
                ColumnData::Uint32(v) => out.extend_from_slice(&v[row].to_le_bytes()),
                ColumnData::Float32(v) => out.extend_from_slice(&v[row].to_le_bytes()),
                ColumnData::Float64(v) => out.extend_from_slice(&v[row].to_le_bytes()),
            }
        }
    }
    out
}

/// A binary-mode format with scalar columns.
pub(crate) fn binary_spec(headers: &[&str], dtypes: &[DType]) -> FormatSpec {
    FormatSpec {
        mode: "binary".to_string(),
        headers: headers.iter().map(|h| h.to_string()).collect(),
        dtype: dtypes.iter().map(|d| d.as_str().to_string()).collect(),
        shape: vec![1; headers.len()],
        extra: Map::new(),
    }
}

/// Random column of `rows` values. Float columns draw arbitrary bit patterns,
/// NaNs and infinities included.
pub(crate) fn random_column(rng: &mut StdRng, dtype: DType, rows: usize) -> ColumnData {
    match dtype {
        DType::Uint8 => ColumnData::Uint8((0..rows).map(|_| rng.random()).collect()),
        DType::Uint32 => ColumnData::Uint32((0..rows).map(|_| rng.random()).collect()),
        DType::Float32 => {
            ColumnData::Float32((0..rows).map(|_| f32::from_bits(rng.random())).collect())
        }
        DType::Float64 => {
            ColumnData::Float64((0..rows).map(|_| f64::from_bits(rng.random())).collect())
        }
    }
}

pub(crate) fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
