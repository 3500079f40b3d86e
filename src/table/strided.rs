//! Column-at-a-time table decoding through zero-copy strided views.
//!
//! For every column an `ndarray` view of shape `(rows, width)` with strides
//! `(row_stride, 1)` is laid over the payload, starting at the column's offset.
//! Each lane of the view is exactly one value's bytes, so the column is decoded
//! by walking the view's outer axis without copying the payload.

use ndarray::{ArrayView2, ShapeBuilder};

use super::TableDecoder;
use crate::error::SmlmError;
use crate::manifest::{ColumnLayout, TableLayout};
use crate::types::{ColumnData, DType, LeScalar};

pub struct StridedViewDecoder;

impl TableDecoder for StridedViewDecoder {
    fn name(&self) -> &'static str {
        "strided_view"
    }

    fn decode(
        &self,
        bytes: &[u8],
        layout: &TableLayout,
        rows: usize,
    ) -> Result<Vec<ColumnData>, SmlmError> {
        layout
            .columns()
            .iter()
            .map(|col| {
                if rows == 0 {
                    return Ok(col.dtype.empty_column(0));
                }
                let view = column_view(bytes, col, layout.row_stride(), rows)?;
                Ok(match col.dtype {
                    DType::Uint8 => ColumnData::Uint8(decode_lanes(view)?),
                    DType::Uint32 => ColumnData::Uint32(decode_lanes(view)?),
                    DType::Float32 => ColumnData::Float32(decode_lanes(view)?),
                    DType::Float64 => ColumnData::Float64(decode_lanes(view)?),
                })
            })
            .collect()
    }
}

/// Builds the `(rows, width)` view of one column, strided by the row width.
fn column_view<'a>(
    bytes: &'a [u8],
    col: &ColumnLayout,
    stride: usize,
    rows: usize,
) -> Result<ArrayView2<'a, u8>, SmlmError> {
    let tail = bytes.get(col.offset..).ok_or_else(|| SmlmError::TruncatedTable {
        expected: rows * stride,
        actual: bytes.len(),
    })?;
    ArrayView2::from_shape((rows, col.width).strides((stride, 1)), tail).map_err(|e| {
        SmlmError::InternalError(format!(
            "Failed to build strided view for column '{}': {}",
            col.name, e
        ))
    })
}

fn decode_lanes<T: LeScalar>(view: ArrayView2<'_, u8>) -> Result<Vec<T>, SmlmError> {
    view.outer_iter()
        .map(|lane| match lane.as_slice() {
            Some(bytes) => T::read_le(bytes),
            // Unreachable while the inner stride is 1.
            None => T::read_le(&lane.to_vec()),
        })
        .collect()
}
