//! Contiguous daily series.
//!
//! [`DatedSeries`] stores a start date and one value per day, so the
//! "strictly increasing, one-day step, no gaps" invariant holds by
//! construction. Records coming from an external source are checked once by
//! [`DatedSeries::from_records`].

use crate::error::{CycleError, Result};
use crate::helpers::ensure_finite;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// One value per calendar day starting at `start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedSeries {
    start: NaiveDate,
    values: Vec<f64>,
}

impl DatedSeries {
    /// Wrap values that are already known to be contiguous daily data.
    pub fn new(start: NaiveDate, values: Vec<f64>) -> Self {
        Self { start, values }
    }

    /// Build a series from `(date, value)` records.
    ///
    /// # Errors
    /// * [`CycleError::IncompleteData`] for an empty input, a gap between
    ///   consecutive dates, or a non-finite value
    /// * [`CycleError::Alignment`] when dates are repeated or out of order
    pub fn from_records(records: &[(NaiveDate, f64)]) -> Result<Self> {
        let (start, _) = *records
            .first()
            .ok_or_else(|| CycleError::incomplete(0, "no records"))?;

        for (i, pair) in records.windows(2).enumerate() {
            let (prev, next) = (pair[0].0, pair[1].0);
            let step = (next - prev).num_days();
            if step <= 0 {
                return Err(CycleError::alignment(
                    format!("record {}", i + 1),
                    format!("date after {}", prev),
                    next,
                ));
            }
            if step > 1 {
                return Err(CycleError::incomplete(
                    i + 1,
                    format!("{} missing day(s) between {} and {}", step - 1, prev, next),
                ));
            }
        }

        let values: Vec<f64> = records.iter().map(|&(_, v)| v).collect();
        ensure_finite(&values, "observations")?;
        Ok(Self { start, values })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last date covered; equals `start` for an empty series.
    pub fn end_date(&self) -> NaiveDate {
        self.date_at(self.values.len().saturating_sub(1))
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Date of the sample at `index`.
    pub fn date_at(&self, index: usize) -> NaiveDate {
        self.start + Duration::days(index as i64)
    }

    /// All dates, in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        (0..self.values.len()).map(|i| self.date_at(i)).collect()
    }

    /// First `k` samples (the whole series if shorter).
    pub fn head(&self, k: usize) -> Self {
        let k = k.min(self.values.len());
        Self {
            start: self.start,
            values: self.values[..k].to_vec(),
        }
    }

    /// Split into a training part `[0, index)` and a held-out part `[index, len)`.
    ///
    /// # Errors
    /// [`CycleError::InvalidParameter`] unless `0 < index < len`.
    pub fn split_at(&self, index: usize) -> Result<(Self, Self)> {
        if index == 0 || index >= self.values.len() {
            return Err(CycleError::invalid_parameter(
                "split_index",
                format!(
                    "must leave data on both sides, got {} for length {}",
                    index,
                    self.values.len()
                ),
            ));
        }
        let train = Self {
            start: self.start,
            values: self.values[..index].to_vec(),
        };
        let test = Self {
            start: self.date_at(index),
            values: self.values[index..].to_vec(),
        };
        Ok((train, test))
    }
}
