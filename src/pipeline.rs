//! End-to-end decomposition and forecast run.
//!
//! [`run`] splits a dated series into a training part and a held-out part,
//! and performs these steps on the training part:
//!
//! 1. fit the [`SeriesTransform`] and transform
//! 2. decompose into trend, seasonal and residual components
//! 3. average the seasonal component into a representative cycle
//! 4. optionally smooth it onto a few harmonics
//!
//! It then tiles the cycle over the forecast horizon and scores the forecast
//! against whatever part of the held-out data it overlaps.

use crate::config::PipelineConfig;
use crate::cycle::{average_cycle, smooth_harmonics, RepresentativeCycle};
use crate::decompose::{decompose_with, Decomposition, DecompositionBands};
use crate::error::Result;
use crate::forecast::project_dates;
use crate::helpers::{ensure_finite, mean};
use crate::metrics::{evaluate, Accuracy};
use crate::series::DatedSeries;
use crate::spectrum::{band_power_fraction, dominant_period};
use crate::transform::SeriesTransform;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Relative gap between dominant and configured period that triggers a warning.
const PERIOD_MISMATCH_TOLERANCE: f64 = 0.1;

/// Everything a run produced, serializable for downstream reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub config: PipelineConfig,
    /// Scaling parameters fitted on the training data
    pub transform: SeriesTransform,
    pub bands: DecompositionBands,
    /// Components of the transformed training series
    pub decomposition: Decomposition,
    /// Per-position average of the seasonal component
    pub representative_cycle: RepresentativeCycle,
    /// Cycle actually projected (smoothed and level-shifted if configured)
    pub projected_cycle: Vec<f64>,
    /// Forecast in original units
    pub forecast: DatedSeries,
    /// Observations after the split
    pub held_out: DatedSeries,
    /// Accuracy over the overlap of forecast and held-out data
    pub accuracy: Option<Accuracy>,
    /// Dominant period of the transformed training series
    pub dominant_period: Option<f64>,
    /// Share of the transformed training variance inside the seasonal band
    pub seasonal_power_fraction: f64,
}

/// Run the full pipeline on `series`.
///
/// # Arguments
/// * `series` - Contiguous daily observations, training part first
/// * `config` - Cycle length, split, bands and alignment
///
/// # Returns
/// [`ForecastReport`] with every intermediate result and the forecast accuracy
///
/// # Errors
/// Any error raised by a stage; the run stops at the first one.
pub fn run(series: &DatedSeries, config: &PipelineConfig) -> Result<ForecastReport> {
    config.validate()?;
    ensure_finite(series.values(), "series")?;

    let split = config.resolve_split(series.len())?;
    let (train, held_out) = series.split_at(split)?;
    let horizon = config.horizon.unwrap_or(held_out.len());
    info!(
        len = series.len(),
        train = train.len(),
        horizon,
        cycle_length = config.cycle_length,
        "starting forecast run"
    );

    let transform = SeriesTransform::fit(train.values())?;
    let transformed = transform.forward(train.values());

    let bands = config.bands(train.len())?;
    let dominant = dominant_period(&transformed);
    let seasonal_power_fraction = band_power_fraction(&transformed, &bands.seasonal);
    check_dominant_period(dominant, config.cycle_length);

    let decomposition = decompose_with(&transformed, &bands, &config.filter)?;

    let alignment = config.alignment(train.start());
    let representative_cycle = average_cycle(&decomposition.seasonal, &train.dates(), &alignment)?;

    let mut projected_cycle = match config.smoothing_harmonics {
        Some(h) => smooth_harmonics(&representative_cycle.values, h)?,
        None => representative_cycle.values.clone(),
    };
    if config.restore_level {
        let level = mean(&transformed);
        debug!(level, "restoring level of transformed series");
        projected_cycle.iter_mut().for_each(|v| *v += level);
    }

    let forecast = project_dates(
        &projected_cycle,
        &alignment,
        held_out.start(),
        horizon,
        &transform,
    )?;

    let overlap = horizon.min(held_out.len());
    let accuracy = if overlap > 0 {
        Some(evaluate(&forecast.head(overlap), &held_out.head(overlap))?)
    } else {
        None
    };

    match &accuracy {
        Some(acc) => info!(n = acc.n, rmse = acc.rmse, mae = acc.mae, "forecast run complete"),
        None => info!("forecast run complete; no held-out overlap to score"),
    }

    Ok(ForecastReport {
        config: config.clone(),
        transform,
        bands,
        decomposition,
        representative_cycle,
        projected_cycle,
        forecast,
        held_out,
        accuracy,
        dominant_period: dominant,
        seasonal_power_fraction,
    })
}

fn check_dominant_period(dominant: Option<f64>, cycle_length: usize) {
    let l = cycle_length as f64;
    match dominant {
        Some(p) if (p - l).abs() > PERIOD_MISMATCH_TOLERANCE * l => warn!(
            dominant_period = p,
            cycle_length,
            "dominant period of training data differs from configured cycle length"
        ),
        Some(p) => debug!(dominant_period = p, "dominant period matches cycle length"),
        None => warn!("training data has no dominant period"),
    }
}
