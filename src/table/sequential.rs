//! Row-by-row table decoding with no array-library dependency.
//!
//! Each row's full stride is sliced out of the payload, every column's bytes
//! are unpacked from it, and the scalars are appended to growable per-column
//! vectors. Always available; slower than the strided-view decoder on wide
//! tables.

use super::TableDecoder;
use crate::error::SmlmError;
use crate::manifest::TableLayout;
use crate::types::ColumnData;

pub struct SequentialUnpackDecoder;

impl TableDecoder for SequentialUnpackDecoder {
    fn name(&self) -> &'static str {
        "sequential_unpack"
    }

    fn decode(
        &self,
        bytes: &[u8],
        layout: &TableLayout,
        rows: usize,
    ) -> Result<Vec<ColumnData>, SmlmError> {
        let stride = layout.row_stride();
        let mut columns: Vec<ColumnData> = layout
            .columns()
            .iter()
            .map(|c| c.dtype.empty_column(rows))
            .collect();

        if rows == 0 {
            return Ok(columns);
        }

        let mut decoded_rows = 0;
        for row in bytes.chunks_exact(stride).take(rows) {
            for (col, out) in layout.columns().iter().zip(columns.iter_mut()) {
                out.push_le(&row[col.offset..col.offset + col.width])?;
            }
            decoded_rows += 1;
        }

        if decoded_rows != rows {
            return Err(SmlmError::TruncatedTable {
                expected: rows * stride,
                actual: bytes.len(),
            });
        }
        Ok(columns)
    }
}
