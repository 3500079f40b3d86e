//! This module defines the canonical, type-safe representation of the column
//! data types an `.smlm` table may declare, together with the typed column
//! storage produced by the table decoders.

use crate::error::SmlmError;
use bytemuck::Pod;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of fixed-width numeric types a binary table column can hold.
///
/// Each variant carries its byte width and its little-endian decode routine,
/// so a dtype string from the manifest is resolved exactly once, at format
/// resolution time, instead of being looked up for every value.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Uint8,
    Uint32,
    Float32,
    Float64,
}

impl DType {
    /// All supported dtypes, in manifest-vocabulary order.
    pub const ALL: [DType; 4] = [DType::Uint8, DType::Uint32, DType::Float32, DType::Float64];

    /// Number of bytes one value of this dtype occupies inside a row.
    pub const fn byte_width(&self) -> usize {
        match self {
            Self::Uint8 => 1,
            Self::Uint32 => 4,
            Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }

    /// The manifest spelling of this dtype.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Uint8 => "uint8",
            Self::Uint32 => "uint32",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Returns `true` if the data type is a floating-point number.
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// Creates an empty column of this dtype with room for `rows` values.
    pub fn empty_column(&self, rows: usize) -> ColumnData {
        match self {
            Self::Uint8 => ColumnData::Uint8(Vec::with_capacity(rows)),
            Self::Uint32 => ColumnData::Uint32(Vec::with_capacity(rows)),
            Self::Float32 => ColumnData::Float32(Vec::with_capacity(rows)),
            Self::Float64 => ColumnData::Float64(Vec::with_capacity(rows)),
        }
    }
}

impl FromStr for DType {
    type Err = SmlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uint8" => Ok(Self::Uint8),
            "uint32" => Ok(Self::Uint32),
            "float32" => Ok(Self::Float32),
            "float64" => Ok(Self::Float64),
            other => Err(SmlmError::UnknownDType(other.to_string())),
        }
    }
}

/// Provides the canonical string representation for a `DType`.
impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // These strings are part of the manifest contract.
        f.write_str(self.as_str())
    }
}

//==================================================================================
// Little-Endian Scalar Decoding
//==================================================================================

/// A primitive that can be read from an unaligned little-endian byte slice.
pub trait LeScalar: Pod {
    /// Converts a value read with native byte order into its little-endian meaning.
    fn from_le(raw: Self) -> Self;

    /// Reads one value from exactly `size_of::<Self>()` bytes.
    fn read_le(bytes: &[u8]) -> Result<Self, SmlmError> {
        let raw: Self = bytemuck::try_pod_read_unaligned(bytes)?;
        Ok(Self::from_le(raw))
    }
}

impl LeScalar for u8 {
    fn from_le(raw: Self) -> Self {
        raw
    }
}

impl LeScalar for u32 {
    fn from_le(raw: Self) -> Self {
        u32::from_le(raw)
    }
}

impl LeScalar for f32 {
    fn from_le(raw: Self) -> Self {
        f32::from_bits(u32::from_le(raw.to_bits()))
    }
}

impl LeScalar for f64 {
    fn from_le(raw: Self) -> Self {
        f64::from_bits(u64::from_le(raw.to_bits()))
    }
}

//==================================================================================
// Typed Column Storage
//==================================================================================

/// One decoded table column. The variant always matches the column's `DType`.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Uint8(Vec<u8>),
    Uint32(Vec<u32>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

/// Dispatches an expression over the inner `Vec` of a `ColumnData`.
macro_rules! with_column {
    ($column:expr, $values:ident => $body:expr) => {
        match $column {
            ColumnData::Uint8($values) => $body,
            ColumnData::Uint32($values) => $body,
            ColumnData::Float32($values) => $body,
            ColumnData::Float64($values) => $body,
        }
    };
}

impl ColumnData {
    pub fn dtype(&self) -> DType {
        match self {
            Self::Uint8(_) => DType::Uint8,
            Self::Uint32(_) => DType::Uint32,
            Self::Float32(_) => DType::Float32,
            Self::Float64(_) => DType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        with_column!(self, values => values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes one value of this column's dtype from `bytes` and appends it.
    ///
    /// `bytes` must be exactly `dtype().byte_width()` long.
    pub fn push_le(&mut self, bytes: &[u8]) -> Result<(), SmlmError> {
        with_column!(self, values => values.push(LeScalar::read_le(bytes)?));
        Ok(())
    }

    /// Returns the value at `row` widened to `f64`, which is lossless for every dtype.
    pub fn get_f64(&self, row: usize) -> Option<f64> {
        with_column!(self, values => values.get(row).map(|&v| f64::from(v)))
    }

    /// Iterates over all values widened to `f64`.
    pub fn iter_f64(&self) -> Box<dyn Iterator<Item = f64> + '_> {
        with_column!(self, values => {
            Box::new(values.iter().map(|&v| f64::from(v))) as Box<dyn Iterator<Item = f64> + '_>
        })
    }

    /// Collects the column into a `Vec<f64>`.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.iter_f64().collect()
    }

    /// Compares two columns value-by-value on their bit patterns, so that two
    /// NaN-bearing columns decoded from the same bytes compare equal.
    pub fn bit_identical(&self, other: &ColumnData) -> bool {
        match (self, other) {
            (Self::Uint8(a), Self::Uint8(b)) => a == b,
            (Self::Uint32(a), Self::Uint32(b)) => a == b,
            (Self::Float32(a), Self::Float32(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (Self::Float64(a), Self::Float64(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            _ => false,
        }
    }
}
