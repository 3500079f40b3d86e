//! Per-column summary statistics for decoded tables.
//!
//! All statistics are computed in `f64`, which represents every supported
//! dtype exactly. A NaN anywhere in a column makes all three of that column's
//! statistics NaN.

use num_traits::Float;

use crate::error::SmlmError;
use crate::types::ColumnData;

/// Index-aligned min / max / mean vectors, one entry per column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub min: Vec<f64>,
    pub max: Vec<f64>,
    pub avg: Vec<f64>,
}

/// Computes min, max and arithmetic mean of every column, in header order.
///
/// # Errors
/// `EmptyTable` if the table has no rows, `InternalError` if `headers` and
/// `columns` disagree in length.
pub fn compute_stats(headers: &[String], columns: &[ColumnData]) -> Result<ColumnStats, SmlmError> {
    if headers.len() != columns.len() {
        return Err(SmlmError::InternalError(format!(
            "{} headers but {} columns",
            headers.len(),
            columns.len()
        )));
    }

    let mut stats = ColumnStats {
        min: Vec::with_capacity(columns.len()),
        max: Vec::with_capacity(columns.len()),
        avg: Vec::with_capacity(columns.len()),
    };

    for (header, column) in headers.iter().zip(columns) {
        let (min, max, avg) = summarize(column.iter_f64()).ok_or(SmlmError::EmptyTable)?;
        log::trace!("stats '{}': min={} max={} avg={}", header, min, max, avg);
        stats.min.push(min);
        stats.max.push(max);
        stats.avg.push(avg);
    }
    Ok(stats)
}

/// Returns `(min, max, mean)` of `values`, or `None` if it is empty.
fn summarize<F: Float>(values: impl Iterator<Item = F>) -> Option<(F, F, F)> {
    let mut count = 0usize;
    let mut min = F::infinity();
    let mut max = F::neg_infinity();
    let mut sum = F::zero();

    for v in values {
        count += 1;
        min = nan_min(min, v);
        max = nan_max(max, v);
        sum = sum + v;
    }
    if count == 0 {
        return None;
    }

    let mean = sum / F::from(count)?;
    if min.is_nan() {
        return Some((F::nan(), F::nan(), F::nan()));
    }
    if mean.is_nan() {
        // Both infinities present.
        return Some((min, max, mean));
    }
    // Rounding in the running sum can push the mean one ulp past the extremes.
    Some((min, max, mean.max(min).min(max)))
}

fn nan_min<F: Float>(a: F, b: F) -> F {
    if a.is_nan() || b.is_nan() {
        F::nan()
    } else {
        a.min(b)
    }
}

fn nan_max<F: Float>(a: F, b: F) -> F {
    if a.is_nan() || b.is_nan() {
        F::nan()
    } else {
        a.max(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("c{}", i)).collect()
    }

    #[test]
    fn test_stats_follow_header_order() {
        let columns = vec![
            ColumnData::Uint32(vec![1, 3]),
            ColumnData::Float64(vec![2.0, 4.0]),
        ];
        let stats = compute_stats(&headers(2), &columns).unwrap();
        assert_eq!(stats.min, vec![1.0, 2.0]);
        assert_eq!(stats.max, vec![3.0, 4.0]);
        assert_eq!(stats.avg, vec![2.0, 3.0]);
    }

    #[test]
    fn test_empty_table_is_an_error() {
        let columns = vec![ColumnData::Float32(vec![])];
        let result = compute_stats(&headers(1), &columns);
        assert!(matches!(result, Err(SmlmError::EmptyTable)));
    }

    #[test]
    fn test_nan_propagates() {
        let columns = vec![
            ColumnData::Float32(vec![1.0, f32::NAN, 3.0]),
            ColumnData::Uint8(vec![7]),
        ];
        let stats = compute_stats(&headers(2), &columns).unwrap();
        assert!(stats.min[0].is_nan() && stats.max[0].is_nan() && stats.avg[0].is_nan());
        assert_eq!((stats.min[1], stats.max[1], stats.avg[1]), (7.0, 7.0, 7.0));
    }

    #[test]
    fn test_mean_of_identical_values_stays_within_bounds() {
        let columns = vec![ColumnData::Float64(vec![0.1; 3])];
        let stats = compute_stats(&headers(1), &columns).unwrap();
        assert!(stats.min[0] <= stats.avg[0] && stats.avg[0] <= stats.max[0]);
    }

    #[test]
    fn test_infinities_are_ordinary_extremes() {
        let columns = vec![ColumnData::Float64(vec![f64::NEG_INFINITY, 0.0, 5.0])];
        let stats = compute_stats(&headers(1), &columns).unwrap();
        assert_eq!(stats.min[0], f64::NEG_INFINITY);
        assert_eq!(stats.max[0], 5.0);
        assert_eq!(stats.avg[0], f64::NEG_INFINITY);
    }

    #[test]
    fn test_header_column_mismatch_is_internal_error() {
        let result = compute_stats(&headers(2), &[ColumnData::Uint8(vec![1])]);
        assert!(matches!(result, Err(SmlmError::InternalError(_))));
    }
}
