//! Conversions between decoded columns and Arrow arrays.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float32Array, Float64Array, UInt32Array, UInt8Array};
use arrow::datatypes::DataType;

use crate::types::{ColumnData, DType};

pub(crate) fn arrow_type(dtype: DType) -> DataType {
    match dtype {
        DType::Uint8 => DataType::UInt8,
        DType::Uint32 => DataType::UInt32,
        DType::Float32 => DataType::Float32,
        DType::Float64 => DataType::Float64,
    }
}

/// Copies a column into a null-free Arrow array of the matching primitive type.
pub(crate) fn column_to_array(column: &ColumnData) -> ArrayRef {
    match column {
        ColumnData::Uint8(v) => Arc::new(UInt8Array::from(v.clone())),
        ColumnData::Uint32(v) => Arc::new(UInt32Array::from(v.clone())),
        ColumnData::Float32(v) => Arc::new(Float32Array::from(v.clone())),
        ColumnData::Float64(v) => Arc::new(Float64Array::from(v.clone())),
    }
}
