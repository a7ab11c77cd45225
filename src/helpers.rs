//! Small numerical helpers shared across modules.

use crate::error::{CycleError, Result};

/// Small epsilon for numerical comparisons (e.g., avoiding division by zero).
pub const NUMERICAL_EPS: f64 = 1e-10;

/// Arithmetic mean; zero for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator); zero for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mu = mean(values);
    let ss: f64 = values.iter().map(|&v| (v - mu).powi(2)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Root mean square of the elementwise difference of two equal-length slices.
pub fn rms_difference(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let ss: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum();
    (ss / n as f64).sqrt()
}

/// Fail with [`CycleError::IncompleteData`] at the first NaN or infinite value.
pub fn ensure_finite(values: &[f64], what: &str) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(CycleError::incomplete(
            index,
            format!("{} contains non-finite value {}", what, values[index]),
        )),
        None => Ok(()),
    }
}
