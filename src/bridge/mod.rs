// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` hands decoded tables to the Arrow ecosystem. It sits strictly
// downstream of the loader and never feeds back into decoding.
//
//   1. [ArchiveLoader]           -> produces `TableData` (typed columns + stats)
//         |
//   2. [arrow_impl]              -> one non-nullable primitive array per column
//         |
//   3. [table_to_record_batch]   -> `RecordBatch` whose schema mirrors the headers,
//                                   optionally tagged with the source entry name
//
// ====================================================================================
pub(crate) mod arrow_impl;

use std::collections::HashMap;
use std::sync::Arc;

use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::error::SmlmError;
use crate::table::TableData;

/// Schema metadata key holding the archive entry a batch came from.
pub const ENTRY_NAME_METADATA_KEY: &str = "smlm.entry";

/// Converts a decoded table into an Arrow `RecordBatch`.
pub fn table_to_record_batch(table: &TableData) -> Result<RecordBatch, SmlmError> {
    build_record_batch(table, HashMap::new())
}

/// Like `table_to_record_batch`, recording `entry_name` in the schema metadata.
pub fn table_to_record_batch_named(
    table: &TableData,
    entry_name: &str,
) -> Result<RecordBatch, SmlmError> {
    let metadata = HashMap::from([(ENTRY_NAME_METADATA_KEY.to_string(), entry_name.to_string())]);
    build_record_batch(table, metadata)
}

fn build_record_batch(
    table: &TableData,
    metadata: HashMap<String, String>,
) -> Result<RecordBatch, SmlmError> {
    if table.headers.len() != table.columns.len() {
        return Err(SmlmError::InternalError(format!(
            "table has {} headers but {} columns",
            table.headers.len(),
            table.columns.len()
        )));
    }

    let fields: Vec<Field> = table
        .iter()
        .map(|(name, column)| Field::new(name, arrow_impl::arrow_type(column.dtype()), false))
        .collect();
    let arrays = table.columns.iter().map(arrow_impl::column_to_array).collect();

    let schema = Arc::new(Schema::new_with_metadata(fields, metadata));
    Ok(RecordBatch::try_new(schema, arrays)?)
}
