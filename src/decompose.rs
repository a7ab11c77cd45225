//! Two-pass band-pass decomposition into trend, seasonal and residual parts.
//!
//! 1. The trend cycle is the long-period band of the transformed series.
//! 2. It is subtracted to give the detrended series.
//! 3. The seasonal cycle is the seasonal band of the detrended series.
//!
//! Isolating a narrow seasonal band directly from the raw data mixes
//! long-term drift into the annual oscillation, so the trend is always removed
//! first. The residual is whatever the seasonal pass leaves of the detrended
//! series, so `trend + seasonal + residual` reproduces the input.

use crate::bandpass::{bandpass_with, Band, FilterOptions};
use crate::error::{CycleError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Trend and seasonal pass bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecompositionBands {
    pub trend: Band,
    pub seasonal: Band,
}

impl DecompositionBands {
    /// Default bands for cycle length `cycle_length` and a series of `len`
    /// samples: trend periods `[2L, len]`, seasonal periods `[L/4, 2L]`.
    ///
    /// A band edge sitting exactly at the cycle length would split the
    /// annual oscillation between both passes, because a finite sample cannot
    /// resolve periods closer than about `L^2 / len`. The edges are therefore
    /// kept a full cycle away from `L`, and the seasonal band reaches down to
    /// a quarter cycle so the harmonics of a skewed annual shape stay in it.
    pub fn for_cycle(cycle_length: usize, len: usize) -> Result<Self> {
        if cycle_length < 8 {
            return Err(CycleError::invalid_parameter(
                "cycle_length",
                format!("must be at least 8 samples, got {}", cycle_length),
            ));
        }
        let l = cycle_length as f64;
        let trend = Band::new(2.0 * l, len as f64)?;
        let seasonal = Band::new(l / 4.0, 2.0 * l)?;
        Ok(Self { trend, seasonal })
    }
}

/// Components of a decomposed series; every vector has the input length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    /// Long-period component
    pub trend: Vec<f64>,
    /// Input minus trend
    pub detrended: Vec<f64>,
    /// Seasonal-band component of the detrended series
    pub seasonal: Vec<f64>,
    /// Detrended minus seasonal
    pub residual: Vec<f64>,
    pub trend_band: Band,
    pub seasonal_band: Band,
}

impl Decomposition {
    /// `trend + seasonal + residual`, elementwise.
    pub fn reconstruct(&self) -> Vec<f64> {
        self.trend
            .iter()
            .zip(self.seasonal.iter())
            .zip(self.residual.iter())
            .map(|((t, s), r)| t + s + r)
            .collect()
    }
}

/// Decompose a transformed series with explicit bands.
///
/// Use [`decompose_with`] to pass a [`DecompositionBands`] pair.
///
/// # Errors
/// Propagates [`CycleError::InvalidBand`] and [`CycleError::IncompleteData`]
/// from the filter; the seasonal pass never runs if the trend pass fails.
pub fn decompose(
    transformed: &[f64],
    trend_band: &Band,
    seasonal_band: &Band,
    options: &FilterOptions,
) -> Result<Decomposition> {
    let n = transformed.len();
    // both bands are checked before any filtering
    trend_band.validate_for(n)?;
    seasonal_band.validate_for(n)?;

    let trend = bandpass_with(transformed, trend_band, options)?.values;
    let detrended: Vec<f64> = transformed
        .iter()
        .zip(trend.iter())
        .map(|(x, t)| x - t)
        .collect();

    let seasonal = bandpass_with(&detrended, seasonal_band, options)?.values;
    let residual: Vec<f64> = detrended
        .iter()
        .zip(seasonal.iter())
        .map(|(d, s)| d - s)
        .collect();

    debug!(
        len = n,
        trend_band = ?trend_band,
        seasonal_band = ?seasonal_band,
        "decomposition complete"
    );

    Ok(Decomposition {
        trend,
        detrended,
        seasonal,
        residual,
        trend_band: *trend_band,
        seasonal_band: *seasonal_band,
    })
}

/// [`decompose`] with both bands taken from `bands`.
pub fn decompose_with(
    transformed: &[f64],
    bands: &DecompositionBands,
    options: &FilterOptions,
) -> Result<Decomposition> {
    decompose(transformed, &bands.trend, &bands.seasonal, options)
}
