//! Forecast accuracy metrics.
//!
//! Errors are `e = observed - forecast`. Percentage metrics are expressed in
//! percent and skip zero observations, which are common in precipitation
//! records; [`Accuracy::zero_observations`] reports how many were skipped.

use crate::error::{CycleError, Result};
use crate::helpers::ensure_finite;
use crate::series::DatedSeries;
use serde::{Deserialize, Serialize};

/// Accuracy of a forecast against held-out observations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Accuracy {
    /// Number of compared samples
    pub n: usize,
    /// Mean error
    pub me: f64,
    /// Mean squared error
    pub mse: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Mean absolute error
    pub mae: f64,
    /// Mean percentage error; `None` when every observation is zero
    pub mpe: Option<f64>,
    /// Mean absolute percentage error; `None` when every observation is zero
    pub mape: Option<f64>,
    /// Observations excluded from MPE/MAPE because they are zero
    pub zero_observations: usize,
}

/// Compare a forecast with observations over the same dates.
///
/// # Arguments
/// * `forecast` - Forecast in original units
/// * `observed` - Held-out observations over the same dates
///
/// # Returns
/// [`Accuracy`] with errors taken as `observed - forecast`
///
/// # Errors
/// * [`CycleError::Alignment`] if the series start on different dates or
///   differ in length
/// * [`CycleError::IncompleteData`] if either series holds NaN or infinite
///   values; missing values are never skipped
pub fn evaluate(forecast: &DatedSeries, observed: &DatedSeries) -> Result<Accuracy> {
    if forecast.start() != observed.start() {
        return Err(CycleError::alignment(
            "evaluate start date",
            observed.start(),
            forecast.start(),
        ));
    }
    evaluate_values(forecast.values(), observed.values())
}

/// Compare two unindexed slices, assumed to share their index.
pub fn evaluate_values(forecast: &[f64], observed: &[f64]) -> Result<Accuracy> {
    if forecast.len() != observed.len() {
        return Err(CycleError::alignment(
            "evaluate length",
            observed.len(),
            forecast.len(),
        ));
    }
    if forecast.is_empty() {
        return Err(CycleError::incomplete(0, "no samples to compare"));
    }
    ensure_finite(forecast, "forecast")?;
    ensure_finite(observed, "observed")?;

    let n = forecast.len();
    let mut sum_e = 0.0;
    let mut sum_sq = 0.0;
    let mut sum_abs = 0.0;
    let mut sum_pe = 0.0;
    let mut sum_ape = 0.0;
    let mut n_pct = 0usize;

    for (&f, &o) in forecast.iter().zip(observed.iter()) {
        let e = o - f;
        sum_e += e;
        sum_sq += e * e;
        sum_abs += e.abs();
        if o != 0.0 {
            let pe = 100.0 * e / o;
            sum_pe += pe;
            sum_ape += pe.abs();
            n_pct += 1;
        }
    }

    let nf = n as f64;
    let mse = sum_sq / nf;
    let (mpe, mape) = if n_pct > 0 {
        (Some(sum_pe / n_pct as f64), Some(sum_ape / n_pct as f64))
    } else {
        (None, None)
    };

    Ok(Accuracy {
        n,
        me: sum_e / nf,
        mse,
        rmse: mse.sqrt(),
        mae: sum_abs / nf,
        mpe,
        mape,
        zero_observations: n - n_pct,
    })
}
