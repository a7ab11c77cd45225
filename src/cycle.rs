//! Cycle positions and multi-year seasonal averaging.
//!
//! Every date is mapped to a position within its cycle, and all values that
//! share a position are averaged into one representative cycle. Two
//! alignments are supported:
//!
//! - [`CycleAlignment::Periodic`]: position is the day count from an anchor
//!   date modulo an arbitrary cycle length.
//! - [`CycleAlignment::Calendar`]: 365-day cycles starting at a fixed calendar
//!   cutover (1 October by default, the hydrological year). Leap days are
//!   folded into a neighbouring position according to [`LeapDayPolicy`].

use crate::error::{CycleError, Result};
use crate::helpers::ensure_finite;
use chrono::{Datelike, NaiveDate};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Length of a calendar cycle; leap days share a position with a neighbour.
pub const CALENDAR_CYCLE_LENGTH: usize = 365;

/// Which neighbouring position 29 February is folded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeapDayPolicy {
    /// 29 February shares the position of 28 February.
    #[default]
    MergeWithPreviousDay,
    /// 29 February shares the position of 1 March; when 29 February is the
    /// last day of a cycle this is position 0 of the next cycle.
    MergeWithNextDay,
}

/// Calendar cycle starting every year at `start_month`/`start_day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleCalendar {
    pub start_month: u32,
    pub start_day: u32,
    pub leap_day: LeapDayPolicy,
}

impl Default for CycleCalendar {
    fn default() -> Self {
        Self::hydrological()
    }
}

impl CycleCalendar {
    /// Cycle starting 1 October.
    pub fn hydrological() -> Self {
        Self {
            start_month: 10,
            start_day: 1,
            leap_day: LeapDayPolicy::MergeWithPreviousDay,
        }
    }

    /// Cycle starting 1 January.
    pub fn calendar_year() -> Self {
        Self {
            start_month: 1,
            start_day: 1,
            leap_day: LeapDayPolicy::MergeWithPreviousDay,
        }
    }

    pub fn with_leap_day(mut self, leap_day: LeapDayPolicy) -> Self {
        self.leap_day = leap_day;
        self
    }

    /// Check the cutover is a real date that exists every year.
    pub fn validate(&self) -> Result<()> {
        let is_leap_day = self.start_month == 2 && self.start_day == 29;
        if is_leap_day || NaiveDate::from_ymd_opt(2001, self.start_month, self.start_day).is_none()
        {
            return Err(CycleError::invalid_parameter(
                "calendar",
                format!(
                    "cutover {:02}-{:02} is not a date present in every year",
                    self.start_month, self.start_day
                ),
            ));
        }
        Ok(())
    }

    fn cutover(&self, year: i32) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.start_month, self.start_day).ok_or_else(|| {
            CycleError::invalid_parameter(
                "calendar",
                format!(
                    "cutover {:02}-{:02} does not exist in {}",
                    self.start_month, self.start_day, year
                ),
            )
        })
    }

    /// Position of `date` in `0..365`.
    pub fn position(&self, date: NaiveDate) -> Result<usize> {
        let this_year = self.cutover(date.year())?;
        let start = if date >= this_year {
            this_year
        } else {
            self.cutover(date.year() - 1)?
        };

        let mut offset = (date - start).num_days();
        for year in [start.year(), start.year() + 1] {
            let Some(leap) = NaiveDate::from_ymd_opt(year, 2, 29) else {
                continue;
            };
            if leap < start || leap > date {
                continue;
            }
            if leap < date || self.leap_day == LeapDayPolicy::MergeWithPreviousDay {
                offset -= 1;
            }
        }
        Ok(offset.rem_euclid(CALENDAR_CYCLE_LENGTH as i64) as usize)
    }
}

/// How dates map to cycle positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleAlignment {
    /// `(date - anchor) mod cycle_length`
    Periodic {
        cycle_length: usize,
        anchor: NaiveDate,
    },
    /// Calendar cutover with a 365-day cycle
    Calendar(CycleCalendar),
}

impl CycleAlignment {
    pub fn cycle_length(&self) -> usize {
        match self {
            Self::Periodic { cycle_length, .. } => *cycle_length,
            Self::Calendar(_) => CALENDAR_CYCLE_LENGTH,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Periodic { cycle_length, .. } if *cycle_length == 0 => Err(
                CycleError::invalid_parameter("cycle_length", "must be positive"),
            ),
            Self::Periodic { .. } => Ok(()),
            Self::Calendar(calendar) => calendar.validate(),
        }
    }

    /// Cycle position of `date`.
    pub fn position(&self, date: NaiveDate) -> Result<usize> {
        match self {
            Self::Periodic {
                cycle_length,
                anchor,
            } => {
                if *cycle_length == 0 {
                    return Err(CycleError::invalid_parameter(
                        "cycle_length",
                        "must be positive",
                    ));
                }
                let days = (date - *anchor).num_days();
                Ok(days.rem_euclid(*cycle_length as i64) as usize)
            }
            Self::Calendar(calendar) => calendar.position(date),
        }
    }

    /// Cycle positions of a run of dates.
    pub fn positions(&self, dates: &[NaiveDate]) -> Result<Vec<usize>> {
        dates.iter().map(|&d| self.position(d)).collect()
    }
}

/// One averaged value per cycle position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepresentativeCycle {
    /// Mean value at each position, length equals the cycle length
    pub values: Vec<f64>,
    /// Number of observations averaged into each position; zero marks a
    /// position interpolated from its neighbours
    pub counts: Vec<usize>,
}

impl RepresentativeCycle {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Average values that share a cycle position.
///
/// Every value contributes, including those from partial first or last
/// cycles.
///
/// # Arguments
/// * `values` - Observations, e.g. the seasonal component
/// * `positions` - Cycle position of each observation
/// * `cycle_length` - Number of positions L
///
/// # Returns
/// Mean and count per position, length `cycle_length`
///
/// # Errors
/// * [`CycleError::Alignment`] if `values` and `positions` differ in length
/// * [`CycleError::InvalidParameter`] for a zero cycle length or a position
///   outside `0..cycle_length`
/// * [`CycleError::IncompleteData`] for non-finite values or a position with
///   no observations
pub fn average_by_position(
    values: &[f64],
    positions: &[usize],
    cycle_length: usize,
) -> Result<RepresentativeCycle> {
    let (sums, counts) = accumulate(values, positions, cycle_length)?;
    if let Some(empty) = counts.iter().position(|&c| c == 0) {
        return Err(empty_position(empty, values.len(), cycle_length));
    }
    Ok(bucket_means(&sums, counts))
}

fn accumulate(
    values: &[f64],
    positions: &[usize],
    cycle_length: usize,
) -> Result<(Vec<f64>, Vec<usize>)> {
    if values.len() != positions.len() {
        return Err(CycleError::alignment(
            "cycle positions",
            values.len(),
            positions.len(),
        ));
    }
    if cycle_length == 0 {
        return Err(CycleError::invalid_parameter(
            "cycle_length",
            "must be positive",
        ));
    }
    ensure_finite(values, "seasonal component")?;

    let mut sums = vec![0.0; cycle_length];
    let mut counts = vec![0usize; cycle_length];
    for (&v, &p) in values.iter().zip(positions.iter()) {
        if p >= cycle_length {
            return Err(CycleError::invalid_parameter(
                "position",
                format!("{} outside cycle of length {}", p, cycle_length),
            ));
        }
        sums[p] += v;
        counts[p] += 1;
    }
    Ok((sums, counts))
}

fn empty_position(position: usize, len: usize, cycle_length: usize) -> CycleError {
    CycleError::incomplete(
        position,
        format!(
            "no observations for cycle position {} ({} values for a cycle of {})",
            position, len, cycle_length
        ),
    )
}

/// Per-position means; empty positions are NaN.
fn bucket_means(sums: &[f64], counts: Vec<usize>) -> RepresentativeCycle {
    let values = sums
        .iter()
        .zip(counts.iter())
        .map(|(&s, &c)| if c > 0 { s / c as f64 } else { f64::NAN })
        .collect();
    RepresentativeCycle { values, counts }
}

/// Fill empty positions by linear interpolation between the nearest filled
/// positions on either side, wrapping around the cycle.
fn interpolate_empty(cycle: &mut RepresentativeCycle) {
    let l = cycle.values.len();
    let filled: Vec<usize> = (0..l).filter(|&p| cycle.counts[p] > 0).collect();
    if filled.is_empty() {
        return;
    }
    for p in 0..l {
        if cycle.counts[p] > 0 {
            continue;
        }
        let before = (1..l)
            .map(|d| (d, (p + l - d) % l))
            .find(|&(_, q)| cycle.counts[q] > 0);
        let after = (1..l)
            .map(|d| (d, (p + d) % l))
            .find(|&(_, q)| cycle.counts[q] > 0);
        if let (Some((db, qb)), Some((da, qa))) = (before, after) {
            let (wb, wa) = (da as f64, db as f64);
            cycle.values[p] = (wb * cycle.values[qb] + wa * cycle.values[qa]) / (wb + wa);
        }
    }
}

fn is_leap_day(date: &NaiveDate) -> bool {
    date.month() == 2 && date.day() == 29
}

/// Average a seasonal component over all cycles it covers.
///
/// With a calendar alignment, each 29 February shares a position with a
/// neighbour, so a run of exactly L days that crosses one leaves one position
/// without observations. Such positions, up to one per leap day in `dates`,
/// are interpolated from their neighbours and keep a count of zero. Any other
/// empty position is an error.
///
/// # Arguments
/// * `seasonal_cycle` - Seasonal component, one value per date
/// * `dates` - Date of each value
/// * `alignment` - Mapping from dates to cycle positions
///
/// # Returns
/// Representative cycle of length `alignment.cycle_length()`
///
/// # Errors
/// Same as [`average_by_position`], plus [`CycleError::Alignment`] when
/// `seasonal_cycle` and `dates` differ in length.
pub fn average_cycle(
    seasonal_cycle: &[f64],
    dates: &[NaiveDate],
    alignment: &CycleAlignment,
) -> Result<RepresentativeCycle> {
    if seasonal_cycle.len() != dates.len() {
        return Err(CycleError::alignment(
            "seasonal component dates",
            seasonal_cycle.len(),
            dates.len(),
        ));
    }
    alignment.validate()?;
    let l = alignment.cycle_length();
    let positions = alignment.positions(dates)?;
    let (sums, counts) = accumulate(seasonal_cycle, &positions, l)?;

    let empty = counts.iter().filter(|&&c| c == 0).count();
    let merged_leap_days = match alignment {
        CycleAlignment::Calendar(_) => dates.iter().filter(|d| is_leap_day(d)).count(),
        CycleAlignment::Periodic { .. } => 0,
    };
    if empty > 0 && (empty > merged_leap_days || empty == l) {
        let first = counts.iter().position(|&c| c == 0).unwrap_or(0);
        return Err(empty_position(first, seasonal_cycle.len(), l));
    }

    let mut cycle = bucket_means(&sums, counts);
    if empty > 0 {
        interpolate_empty(&mut cycle);
    }
    Ok(cycle)
}

/// Least-squares fit of a constant plus `n_harmonics` sine/cosine pairs.
///
/// Smooths a noisy representative cycle while keeping it periodic.
pub fn smooth_harmonics(cycle: &[f64], n_harmonics: usize) -> Result<Vec<f64>> {
    let m = cycle.len();
    let n_coef = 1 + 2 * n_harmonics;
    if n_harmonics == 0 || n_coef > m {
        return Err(CycleError::invalid_parameter(
            "smoothing_harmonics",
            format!(
                "need 1..={} harmonics for a cycle of {}, got {}",
                m.saturating_sub(1) / 2,
                m,
                n_harmonics
            ),
        ));
    }
    ensure_finite(cycle, "representative cycle")?;

    let omega = 2.0 * PI / m as f64;
    let mut design = DMatrix::zeros(m, n_coef);
    for j in 0..m {
        design[(j, 0)] = 1.0;
        for k in 0..n_harmonics {
            let freq = (k + 1) as f64 * omega;
            design[(j, 1 + 2 * k)] = (freq * j as f64).cos();
            design[(j, 2 + 2 * k)] = (freq * j as f64).sin();
        }
    }
    let y = DVector::from_row_slice(cycle);
    let svd = design.clone().svd(true, true);
    let coef = svd
        .solve(&y, 1e-10)
        .map_err(|e| CycleError::invalid_parameter("smoothing_harmonics", e.to_string()))?;
    let fitted = &design * &coef;
    Ok(fitted.iter().cloned().collect())
}
