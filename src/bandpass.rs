//! Christiano-Fitzgerald band-pass filter.
//!
//! The ideal band-pass filter passing periods in `[period_low, period_high]`
//! has the infinite, two-sided impulse response
//!
//! ```text
//! B_0 = (b - a) / π
//! B_j = (sin(j b) - sin(j a)) / (π j),   j ≥ 1
//! a = 2π / period_high,   b = 2π / period_low
//! ```
//!
//! A finite sample only supports a truncated version of it. The
//! Christiano-Fitzgerald approximation uses, for every output sample, all
//! observations available on either side, so weights are asymmetric away from
//! the middle of the sample and no observations are padded, mirrored or
//! dropped. Samples within roughly one `period_high` of either end are less
//! reliable than interior samples.
//!
//! Options:
//! - `unit_root = false` (default): the series is treated as stationary; it is
//!   demeaned and filtered with the truncated ideal weights.
//! - `unit_root = true`: random-walk assumption; the weights on the first and
//!   last observation absorb the truncated tails so each row sums to zero.
//! - `drift = true`: a straight line through the first and last observation
//!   is removed before filtering.
//! - [`FilterKind::Symmetric`]: fixed symmetric windows (Baxter-King style).

use crate::error::{CycleError, Result};
use crate::helpers::{ensure_finite, mean};
use crate::iter_maybe_parallel;
#[cfg(feature = "parallel")]
use rayon::iter::ParallelIterator;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

/// Minimum admissible period: two samples per oscillation (Nyquist).
pub const MIN_PERIOD: f64 = 2.0;

/// A pass band expressed in periods, in units of one sampling step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Shortest period passed (highest frequency)
    pub period_low: f64,
    /// Longest period passed (lowest frequency)
    pub period_high: f64,
}

impl Band {
    /// Create a band, checking it is well formed.
    ///
    /// # Errors
    /// [`CycleError::InvalidBand`] unless both periods are finite,
    /// `period_low >= 2` and `period_low < period_high`.
    pub fn new(period_low: f64, period_high: f64) -> Result<Self> {
        let band = Self {
            period_low,
            period_high,
        };
        band.check_shape(0)?;
        Ok(band)
    }

    /// Check the band against a series of `len` samples.
    ///
    /// In addition to the checks in [`Band::new`], `period_high` may not
    /// exceed the series length.
    pub fn validate_for(&self, len: usize) -> Result<()> {
        self.check_shape(len)?;
        if self.period_high > len as f64 {
            return Err(self.invalid(len));
        }
        Ok(())
    }

    fn check_shape(&self, len: usize) -> Result<()> {
        let finite = self.period_low.is_finite() && self.period_high.is_finite();
        if !finite || self.period_low < MIN_PERIOD || self.period_low >= self.period_high {
            return Err(self.invalid(len));
        }
        Ok(())
    }

    fn invalid(&self, len: usize) -> CycleError {
        CycleError::InvalidBand {
            period_low: self.period_low,
            period_high: self.period_high,
            len,
        }
    }

    /// Angular frequency of the long-period edge, `2π / period_high`.
    pub fn low_frequency(&self) -> f64 {
        2.0 * PI / self.period_high
    }

    /// Angular frequency of the short-period edge, `2π / period_low`.
    pub fn high_frequency(&self) -> f64 {
        2.0 * PI / self.period_low
    }

    /// Whether a period falls inside the band (edges included).
    pub fn contains_period(&self, period: f64) -> bool {
        period >= self.period_low && period <= self.period_high
    }
}

/// Shape of the finite filter window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Full-sample asymmetric weights (Christiano-Fitzgerald).
    #[default]
    Asymmetric,
    /// Symmetric window of half-width `min(t, n - 1 - t, max_half_width)`,
    /// weights shifted to sum to zero. The two end samples are zero.
    Symmetric { max_half_width: Option<usize> },
}

/// Filter configuration. The default asserts no unit root and no drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FilterOptions {
    /// Treat the series as a random walk (I(1)) rather than stationary
    pub unit_root: bool,
    /// Remove the line through the first and last observation first
    pub drift: bool,
    /// Window shape
    pub kind: FilterKind,
}

/// Output of a band-pass filter together with the band that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredComponent {
    /// Filtered values, same length as the input
    pub values: Vec<f64>,
    /// Pass band
    pub band: Band,
}

/// Ideal band-pass weights `B_0..=B_len` for the given band.
///
/// This is the full coefficient generator for the filter: a pure function of
/// `(period_low, period_high, len)`.
pub fn ideal_weights(band: &Band, len: usize) -> Vec<f64> {
    let a = band.low_frequency();
    let b = band.high_frequency();
    let mut weights = Vec::with_capacity(len + 1);
    weights.push((b - a) / PI);
    for j in 1..=len {
        let jf = j as f64;
        weights.push(((jf * b).sin() - (jf * a).sin()) / (PI * jf));
    }
    weights
}

/// Band-pass filter with the default options.
///
/// Returns the component of `series` whose period lies between `period_low`
/// and `period_high`. Output length equals input length.
///
/// # Errors
/// * [`CycleError::InvalidBand`] for a malformed band or `period_high > series.len()`
/// * [`CycleError::IncompleteData`] if the series contains NaN or infinite values
pub fn bandpass(series: &[f64], period_low: f64, period_high: f64) -> Result<Vec<f64>> {
    let band = Band {
        period_low,
        period_high,
    };
    Ok(bandpass_with(series, &band, &FilterOptions::default())?.values)
}

/// Band-pass filter with explicit options.
///
/// # Arguments
/// * `series` - Input values, one per sampling step
/// * `band` - Pass band in periods
/// * `options` - Unit-root, drift and window assumptions
///
/// # Returns
/// Filtered component of the same length as `series`, tagged with its band
///
/// # Errors
/// Same as [`bandpass`].
pub fn bandpass_with(
    series: &[f64],
    band: &Band,
    options: &FilterOptions,
) -> Result<FilteredComponent> {
    let n = series.len();
    band.validate_for(n)?;
    ensure_finite(series, "filter input")?;

    debug!(
        len = n,
        period_low = band.period_low,
        period_high = band.period_high,
        unit_root = options.unit_root,
        drift = options.drift,
        kind = ?options.kind,
        "band-pass filter"
    );

    let x = if options.drift {
        remove_drift(series)
    } else {
        series.to_vec()
    };
    let weights = ideal_weights(band, n);

    let values = match options.kind {
        FilterKind::Asymmetric if options.unit_root => filter_random_walk(&x, &weights),
        FilterKind::Asymmetric => filter_stationary(&x, &weights),
        FilterKind::Symmetric { max_half_width } => {
            let x = if options.unit_root { x } else { demean(&x) };
            filter_symmetric(&x, &weights, max_half_width.unwrap_or(n))
        }
    };

    Ok(FilteredComponent {
        values,
        band: *band,
    })
}

/// Subtract `t * (x[n-1] - x[0]) / (n - 1)` from each sample.
fn remove_drift(x: &[f64]) -> Vec<f64> {
    let n = x.len();
    if n < 2 {
        return x.to_vec();
    }
    let slope = (x[n - 1] - x[0]) / (n - 1) as f64;
    x.iter()
        .enumerate()
        .map(|(t, &v)| v - t as f64 * slope)
        .collect()
}

fn demean(x: &[f64]) -> Vec<f64> {
    let mu = mean(x);
    x.iter().map(|&v| v - mu).collect()
}

/// Stationary case: truncated ideal weights over the whole demeaned sample.
fn filter_stationary(x: &[f64], weights: &[f64]) -> Vec<f64> {
    let n = x.len();
    let xd = demean(x);
    iter_maybe_parallel!(0..n)
        .map(|t| {
            let mut acc = 0.0;
            for (s, &v) in xd.iter().enumerate() {
                acc += weights[t.abs_diff(s)] * v;
            }
            acc
        })
        .collect()
}

/// Random-walk case: end weights on `x[0]` and `x[n-1]` make each row sum to zero.
fn filter_random_walk(x: &[f64], weights: &[f64]) -> Vec<f64> {
    let n = x.len();
    // prefix[k] = B_1 + ... + B_k
    let mut prefix = vec![0.0; n + 1];
    for k in 1..=n {
        prefix[k] = prefix[k - 1] + weights[k];
    }
    let tail_sum = |k: isize| if k > 0 { prefix[k as usize] } else { 0.0 };
    let b0 = weights[0];

    iter_maybe_parallel!(0..n)
        .map(|t| {
            let ahead = n as isize - t as isize - 2;
            let behind = t as isize - 1;
            let end_high = -0.5 * b0 - tail_sum(ahead);
            let end_low = -b0 - tail_sum(ahead) - tail_sum(behind) - end_high;

            let mut acc = b0 * x[t] + end_high * x[n - 1] + end_low * x[0];
            for k in 1..(n.saturating_sub(t + 1)) {
                acc += weights[k] * x[t + k];
            }
            for k in 1..t {
                acc += weights[k] * x[t - k];
            }
            acc
        })
        .collect()
}

/// Symmetric windows that shrink toward the ends of the sample.
fn filter_symmetric(x: &[f64], weights: &[f64], max_half_width: usize) -> Vec<f64> {
    let n = x.len();
    iter_maybe_parallel!(0..n)
        .map(|t| {
            let h = t.min(n - 1 - t).min(max_half_width);
            let width = (2 * h + 1) as f64;
            let total = weights[0] + 2.0 * weights[1..=h].iter().sum::<f64>();
            let shift = total / width;
            let mut acc = (weights[0] - shift) * x[t];
            for j in 1..=h {
                acc += (weights[j] - shift) * (x[t - j] + x[t + j]);
            }
            acc
        })
        .collect()
}
