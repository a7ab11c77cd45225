//! Periodogram diagnostics for checking filter bands against the data.

use crate::bandpass::Band;
use crate::helpers::mean;
use num_complex::Complex;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};

/// One-sided power spectrum of a demeaned series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Periodogram {
    /// Frequencies in cycles per sample, `k / n` for `k = 0..=n/2`
    pub frequencies: Vec<f64>,
    /// Power at each frequency; sums to the population variance
    pub power: Vec<f64>,
}

impl Periodogram {
    /// Period (in samples) of each frequency; infinite at frequency zero.
    pub fn periods(&self) -> Vec<f64> {
        self.frequencies
            .iter()
            .map(|&f| if f > 0.0 { 1.0 / f } else { f64::INFINITY })
            .collect()
    }
}

/// Compute the periodogram of a series using FFT.
pub fn periodogram(values: &[f64]) -> Periodogram {
    let n = values.len();
    if n < 2 {
        return Periodogram {
            frequencies: Vec::new(),
            power: Vec::new(),
        };
    }

    let mu = mean(values);
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    let mut buffer: Vec<Complex<f64>> = values.iter().map(|&x| Complex::new(x - mu, 0.0)).collect();
    fft.process(&mut buffer);

    let n_freq = n / 2 + 1;
    let mut frequencies = Vec::with_capacity(n_freq);
    let mut power = Vec::with_capacity(n_freq);
    for k in 0..n_freq {
        frequencies.push(k as f64 / n as f64);
        let p = buffer[k].norm_sqr() / (n as f64 * n as f64);
        // one-sided: double everything except DC and Nyquist
        let nyquist = n % 2 == 0 && k == n / 2;
        power.push(if k > 0 && !nyquist { 2.0 * p } else { p });
    }

    Periodogram { frequencies, power }
}

/// Fraction of the series variance at periods inside `band`.
///
/// Returns 0 for a constant or too-short series.
pub fn band_power_fraction(values: &[f64], band: &Band) -> f64 {
    let pg = periodogram(values);
    let total: f64 = pg.power.iter().skip(1).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let inside: f64 = pg
        .periods()
        .iter()
        .zip(pg.power.iter())
        .skip(1)
        .filter(|&(&p, _)| band.contains_period(p))
        .map(|(_, &w)| w)
        .sum();
    inside / total
}

/// Period of the strongest non-zero frequency, if any.
pub fn dominant_period(values: &[f64]) -> Option<f64> {
    let pg = periodogram(values);
    let (k, &p) = pg
        .power
        .iter()
        .enumerate()
        .skip(1)
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))?;
    if p <= 0.0 {
        return None;
    }
    Some(1.0 / pg.frequencies[k])
}
