// In: src/histogram.rs

//! Renders a localization table as a 2-D count image.
//!
//! Localizations are binned on a square grid of `pixel_size` (in the units of
//! the `x` / `y` columns). The result is indexed `[y_bin, x_bin]` so it can be
//! displayed directly as an image. Optional post-processing steps run in this
//! order: zero-padding to a target size, clipping to a value range, Gaussian
//! smoothing.

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::SmlmError;
use crate::table::TableData;

/// Default edge length of one histogram pixel.
pub const DEFAULT_PIXEL_SIZE: f64 = 20.0;
/// Largest number of bins allowed along either axis of a histogram, after
/// padding. Also bounds the radius of the smoothing kernel.
pub const MAX_BINS_PER_AXIS: usize = 65_536;
/// Gaussian kernels are cut off at this many standard deviations.
const GAUSSIAN_TRUNCATE: f64 = 4.0;

//==================================================================================
// 1. Options
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct HistogramOptions {
    /// Half-open `[start, end)` range of frames to keep. When unset the first
    /// and last localizations of the table are dropped instead.
    pub frame_range: Option<(f64, f64)>,
    /// Counts are clipped into this closed range.
    pub value_range: Option<(f64, f64)>,
    /// `((xmin, xmax), (ymin, ymax))`. Defaults to the extents of the data.
    pub xy_range: Option<((f64, f64), (f64, f64))>,
    pub pixel_size: f64,
    /// Standard deviation of the smoothing kernel, in pixels. `None` or `0`
    /// disables smoothing.
    pub sigma: Option<f64>,
    /// Minimum `(rows, cols)` of the output; smaller histograms are zero-padded
    /// at the bottom and right.
    pub target_size: Option<(usize, usize)>,
}

impl Default for HistogramOptions {
    fn default() -> Self {
        Self {
            frame_range: None,
            value_range: None,
            xy_range: None,
            pixel_size: DEFAULT_PIXEL_SIZE,
            sigma: None,
            target_size: None,
        }
    }
}

//==================================================================================
// 2. Public API
//==================================================================================

/// Bins the `x` / `y` columns of `table` into a 2-D histogram.
///
/// # Errors
/// * `MissingColumn` if `x` or `y` is absent, or `frame` when a frame range is set.
/// * `InvalidArgument` for a non-positive `pixel_size`, a negative or non-finite
///   `sigma`, a non-finite range or extent, any axis (binned or padded) longer
///   than `MAX_BINS_PER_AXIS`, or when no localization is left to derive the
///   extents from.
pub fn localization_histogram(
    table: &TableData,
    options: &HistogramOptions,
) -> Result<Array2<f64>, SmlmError> {
    if !(options.pixel_size > 0.0) {
        return Err(SmlmError::InvalidArgument(format!(
            "pixel_size must be positive, got {}",
            options.pixel_size
        )));
    }
    let sigma = match options.sigma {
        Some(s) if !s.is_finite() || s < 0.0 => {
            return Err(SmlmError::InvalidArgument(format!(
                "sigma must be finite and non-negative, got {}",
                s
            )))
        }
        Some(s) if GAUSSIAN_TRUNCATE * s > MAX_BINS_PER_AXIS as f64 => {
            return Err(SmlmError::InvalidArgument(format!(
                "sigma {} gives a kernel wider than {} pixels",
                s, MAX_BINS_PER_AXIS
            )))
        }
        Some(s) if s > 0.0 => Some(s),
        _ => None,
    };
    if let Some((rows, cols)) = options.target_size {
        if rows > MAX_BINS_PER_AXIS || cols > MAX_BINS_PER_AXIS {
            return Err(SmlmError::InvalidArgument(format!(
                "target_size ({}, {}) exceeds {} bins per axis",
                rows, cols, MAX_BINS_PER_AXIS
            )));
        }
    }

    let (x, y) = select_points(table, options.frame_range)?;

    let ((xmin, xmax), (ymin, ymax)) = match options.xy_range {
        Some(range) => range,
        None => data_extents(&x, &y)?,
    };
    let xedges = arange("x", xmin, xmax, options.pixel_size)?;
    let yedges = arange("y", ymin, ymax, options.pixel_size)?;

    let mut hist = histogram2d(&y, &x, &yedges, &xedges);
    log::debug!(
        "Binned {} localizations into a {:?} histogram",
        x.len(),
        hist.shape()
    );

    if let Some(target) = options.target_size {
        hist = pad_to(hist, target);
    }
    if let Some((lo, hi)) = options.value_range {
        hist.mapv_inplace(|v| v.max(lo).min(hi));
    }
    if let Some(sigma) = sigma {
        hist = gaussian_filter(&hist, sigma);
    }
    Ok(hist)
}

//==================================================================================
// 3. Internal Helpers
//==================================================================================

fn required_column(table: &TableData, name: &str) -> Result<Vec<f64>, SmlmError> {
    table
        .column(name)
        .map(|c| c.to_f64_vec())
        .ok_or_else(|| SmlmError::MissingColumn(name.to_string()))
}

/// Returns the `(x, y)` coordinates that take part in the histogram.
fn select_points(
    table: &TableData,
    frame_range: Option<(f64, f64)>,
) -> Result<(Vec<f64>, Vec<f64>), SmlmError> {
    let x = required_column(table, "x")?;
    let y = required_column(table, "y")?;

    match frame_range {
        Some((start, end)) => {
            let frames = required_column(table, "frame")?;
            let (xs, ys): (Vec<f64>, Vec<f64>) = frames
                .iter()
                .zip(x.iter().zip(&y))
                .filter(|(f, _)| start <= **f && **f < end)
                .map(|(_, (&xv, &yv))| (xv, yv))
                .unzip();
            Ok((xs, ys))
        }
        None => {
            if x.len() <= 2 {
                return Ok((Vec::new(), Vec::new()));
            }
            let inner = 1..x.len() - 1;
            Ok((x[inner.clone()].to_vec(), y[inner].to_vec()))
        }
    }
}

fn data_extents(x: &[f64], y: &[f64]) -> Result<((f64, f64), (f64, f64)), SmlmError> {
    if x.is_empty() {
        return Err(SmlmError::InvalidArgument(
            "no localizations left to derive the histogram range from".to_string(),
        ));
    }
    let extent = |v: &[f64]| {
        v.iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &p| (lo.min(p), hi.max(p)))
    };
    Ok((extent(x), extent(y)))
}

/// `start, start + step, ...` strictly below `stop`.
///
/// Both bounds must be finite and the result may hold at most
/// `MAX_BINS_PER_AXIS + 1` edges.
fn arange(axis: &str, start: f64, stop: f64, step: f64) -> Result<Vec<f64>, SmlmError> {
    if !start.is_finite() || !stop.is_finite() {
        return Err(SmlmError::InvalidArgument(format!(
            "{} range [{}, {}) is not finite",
            axis, start, stop
        )));
    }
    let count = ((stop - start) / step).ceil();
    if !(count > 0.0) {
        return Ok(Vec::new());
    }
    if !(count <= (MAX_BINS_PER_AXIS + 1) as f64) {
        return Err(SmlmError::InvalidArgument(format!(
            "{} range [{}, {}) at pixel size {} needs more than {} bins",
            axis, start, stop, step, MAX_BINS_PER_AXIS
        )));
    }
    Ok((0..count as usize).map(|k| start + k as f64 * step).collect())
}

/// Counts `(row, col)` points into the bins delimited by `row_edges` x `col_edges`.
///
/// Bins are half-open except the last one along each axis, which also holds
/// values equal to the final edge. Points outside the edges (and NaNs) are ignored.
fn histogram2d(rows: &[f64], cols: &[f64], row_edges: &[f64], col_edges: &[f64]) -> Array2<f64> {
    let shape = (
        row_edges.len().saturating_sub(1),
        col_edges.len().saturating_sub(1),
    );
    let mut hist = Array2::<f64>::zeros(shape);
    if shape.0 == 0 || shape.1 == 0 {
        return hist;
    }
    for (&r, &c) in rows.iter().zip(cols) {
        if let (Some(i), Some(j)) = (bin_index(r, row_edges), bin_index(c, col_edges)) {
            hist[[i, j]] += 1.0;
        }
    }
    hist
}

fn bin_index(value: f64, edges: &[f64]) -> Option<usize> {
    let (first, last) = (*edges.first()?, *edges.last()?);
    if !(value >= first && value <= last) {
        return None;
    }
    if value == last {
        return Some(edges.len() - 2);
    }
    Some(edges.partition_point(|&e| e <= value) - 1)
}

fn pad_to(hist: Array2<f64>, (rows, cols): (usize, usize)) -> Array2<f64> {
    let (h, w) = hist.dim();
    if h >= rows && w >= cols {
        return hist;
    }
    let mut padded = Array2::<f64>::zeros((h.max(rows), w.max(cols)));
    padded.slice_mut(ndarray::s![..h, ..w]).assign(&hist);
    padded
}

/// Separable Gaussian smoothing with mirror-reflected borders (`d c b a | a b c d`).
fn gaussian_filter(input: &Array2<f64>, sigma: f64) -> Array2<f64> {
    let kernel = gaussian_kernel(sigma);
    let smoothed_rows = correlate_axis(input, &kernel, Axis(0));
    correlate_axis(&smoothed_rows, &kernel, Axis(1))
}

fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5) as isize;
    let weights: Vec<f64> = (-radius..=radius)
        .map(|x| (-0.5 * (x as f64 / sigma).powi(2)).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

fn correlate_axis(input: &Array2<f64>, kernel: &[f64], axis: Axis) -> Array2<f64> {
    let radius = (kernel.len() / 2) as isize;
    let mut output = Array2::<f64>::zeros(input.raw_dim());
    for (src, mut dst) in input.lanes(axis).into_iter().zip(output.lanes_mut(axis)) {
        let n = src.len() as isize;
        for i in 0..n {
            dst[i as usize] = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * src[reflect(i + k as isize - radius, n)])
                .sum();
        }
    }
    output
}

fn reflect(mut index: isize, len: isize) -> usize {
    loop {
        if index < 0 {
            index = -index - 1;
        } else if index >= len {
            index = 2 * len - index - 1;
        } else {
            return index as usize;
        }
    }
}
