//! Reversible variance-stabilizing transform for non-negative measurements.
//!
//! Raw values are standardized with the mean and sample standard deviation of
//! the full series, then passed through the inverse hyperbolic sine:
//!
//! ```text
//! z = asinh((x - mean) / sd) = ln(u + sqrt(u^2 + 1)),   u = (x - mean) / sd
//! x = sinh(z) * sd + mean
//! ```
//!
//! `asinh` behaves like a logarithm for large values but, unlike `ln`, is
//! defined at zero, which matters for records with many dry days. The fitted
//! parameters are kept in [`SeriesTransform`] and every inversion must use
//! them, never parameters recomputed from a subset of the data.

use crate::error::{CycleError, Result};
use crate::helpers::{ensure_finite, mean, sample_std_dev, NUMERICAL_EPS};
use crate::slice_maybe_parallel;
#[cfg(feature = "parallel")]
use rayon::iter::ParallelIterator;
use serde::{Deserialize, Serialize};

/// Standardization parameters fitted once on the full training series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesTransform {
    /// Mean of the raw series
    pub mean: f64,
    /// Sample standard deviation of the raw series
    pub std_dev: f64,
}

impl SeriesTransform {
    /// Fit standardization parameters to a raw series.
    ///
    /// # Errors
    /// * [`CycleError::IncompleteData`] if any value is NaN or infinite
    /// * [`CycleError::DegenerateSeries`] for fewer than two values or zero variance
    pub fn fit(values: &[f64]) -> Result<Self> {
        ensure_finite(values, "raw series")?;
        let std_dev = sample_std_dev(values);
        if values.len() < 2 || std_dev <= NUMERICAL_EPS {
            return Err(CycleError::DegenerateSeries {
                len: values.len(),
                std_dev,
            });
        }
        Ok(Self {
            mean: mean(values),
            std_dev,
        })
    }

    /// `(v - mean) / std_dev`
    #[inline]
    pub fn scale(&self, v: f64) -> f64 {
        (v - self.mean) / self.std_dev
    }

    /// `v * std_dev + mean`
    #[inline]
    pub fn unscale(&self, v: f64) -> f64 {
        v * self.std_dev + self.mean
    }

    /// Standardize then normalize every value.
    pub fn forward(&self, values: &[f64]) -> Vec<f64> {
        slice_maybe_parallel!(values)
            .map(|&v| normalize(self.scale(v)))
            .collect()
    }

    /// Denormalize then unscale every value, returning original units.
    pub fn inverse(&self, values: &[f64]) -> Vec<f64> {
        slice_maybe_parallel!(values)
            .map(|&v| self.unscale(denormalize(v)))
            .collect()
    }
}

/// Standardize a raw series, returning the scaled values with their parameters.
pub fn standardize(values: &[f64]) -> Result<(Vec<f64>, SeriesTransform)> {
    let params = SeriesTransform::fit(values)?;
    let scaled = values.iter().map(|&v| params.scale(v)).collect();
    Ok((scaled, params))
}

/// Inverse hyperbolic sine, `ln(v + sqrt(v^2 + 1))`.
#[inline]
pub fn normalize(v: f64) -> f64 {
    v.asinh()
}

/// Hyperbolic sine, the exact inverse of [`normalize`].
#[inline]
pub fn denormalize(v: f64) -> f64 {
    v.sinh()
}
