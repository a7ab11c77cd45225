//! Forecasts built by replaying a representative cycle.
//!
//! The forecast is purely periodic: it repeats the representative cycle and
//! carries no trend and no stochastic component. Callers needing trend or
//! uncertainty must add it themselves.

use crate::cycle::CycleAlignment;
use crate::error::{CycleError, Result};
use crate::series::DatedSeries;
use crate::transform::{denormalize, SeriesTransform};
use chrono::NaiveDate;

/// Tile `representative_cycle` over `horizon_length` steps and return to
/// original units.
///
/// Step `i` uses position `(horizon_start_index + i) mod L`, so the start may
/// be given as a day index counted from the cycle anchor (for instance the
/// train/test split index) or as a position already reduced to `0..L`. Each
/// value is passed through `denormalize` and then `unscale` with the stored
/// transform.
///
/// # Arguments
/// * `representative_cycle` - One value per cycle position, transformed units
/// * `horizon_start_index` - Day index of the first forecast step
/// * `horizon_length` - Number of steps to forecast
/// * `transform` - Parameters fitted on the training series
///
/// # Returns
/// Forecast of length `horizon_length` in original units
///
/// # Errors
/// [`CycleError::InvalidParameter`] for an empty cycle.
pub fn project(
    representative_cycle: &[f64],
    horizon_start_index: usize,
    horizon_length: usize,
    transform: &SeriesTransform,
) -> Result<Vec<f64>> {
    let l = representative_cycle.len();
    check_cycle(l)?;
    let start = horizon_start_index % l;
    Ok((0..horizon_length)
        .map(|i| {
            let v = representative_cycle[(start + i) % l];
            transform.unscale(denormalize(v))
        })
        .collect())
}

/// Same as [`project`] but with a level offset added in transformed units
/// before inversion.
pub fn project_with_level(
    representative_cycle: &[f64],
    horizon_start_index: usize,
    horizon_length: usize,
    level: f64,
    transform: &SeriesTransform,
) -> Result<Vec<f64>> {
    let shifted: Vec<f64> = representative_cycle.iter().map(|v| v + level).collect();
    project(&shifted, horizon_start_index, horizon_length, transform)
}

/// Forecast the `horizon_length` days starting at `start`, taking each day's
/// position from `alignment` so calendar leap days follow the same policy as
/// the averaging step.
///
/// # Arguments
/// * `representative_cycle` - One value per cycle position, transformed units
/// * `alignment` - Same alignment used to build the cycle
/// * `start` - First forecast date
/// * `horizon_length` - Number of days to forecast
/// * `transform` - Parameters fitted on the training series
///
/// # Returns
/// Dated forecast in original units
///
/// # Errors
/// [`CycleError::Alignment`] if the cycle length differs from the
/// alignment's, [`CycleError::InvalidParameter`] for an empty cycle.
pub fn project_dates(
    representative_cycle: &[f64],
    alignment: &CycleAlignment,
    start: NaiveDate,
    horizon_length: usize,
    transform: &SeriesTransform,
) -> Result<DatedSeries> {
    let l = representative_cycle.len();
    if l != alignment.cycle_length() {
        return Err(CycleError::alignment(
            "representative cycle length",
            alignment.cycle_length(),
            l,
        ));
    }
    check_cycle(l)?;
    let frame = DatedSeries::new(start, vec![0.0; horizon_length]);
    let positions = alignment.positions(&frame.dates())?;
    let values = positions
        .iter()
        .map(|&p| transform.unscale(denormalize(representative_cycle[p])))
        .collect();
    Ok(DatedSeries::new(start, values))
}

fn check_cycle(cycle_length: usize) -> Result<()> {
    if cycle_length == 0 {
        return Err(CycleError::invalid_parameter(
            "representative_cycle",
            "cycle is empty",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::CycleCalendar;
    use crate::transform::normalize;

    fn identity_scale() -> SeriesTransform {
        SeriesTransform {
            mean: 0.0,
            std_dev: 1.0,
        }
    }

    #[test]
    fn test_project_tiles_from_start_position() {
        let cycle: Vec<f64> = [1.0, 2.0, 3.0].iter().map(|&v| normalize(v)).collect();
        let out = project(&cycle, 1, 7, &identity_scale()).unwrap();
        let expected = [2.0, 3.0, 1.0, 2.0, 3.0, 1.0, 2.0];
        for (a, b) in out.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_project_applies_denormalize_then_unscale() {
        let transform = SeriesTransform {
            mean: 4.0,
            std_dev: 2.0,
        };
        let out = project(&[0.5], 0, 2, &transform).unwrap();
        let expected = 0.5f64.sinh() * 2.0 + 4.0;
        assert!((out[0] - expected).abs() < 1e-12);
        assert!((out[1] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_project_with_level() {
        let transform = identity_scale();
        let plain = project(&[0.0, 0.2], 0, 2, &transform).unwrap();
        let shifted = project_with_level(&[0.0, 0.2], 0, 2, -0.1, &transform).unwrap();
        assert!((shifted[0] - (-0.1f64).sinh()).abs() < 1e-12);
        assert!(shifted[1] < plain[1]);
    }

    #[test]
    fn test_project_reduces_day_index() {
        let cycle: Vec<f64> = (0..365).map(|p| normalize(p as f64)).collect();
        // three full cycles of training data: the held-out part starts at position 0
        let out = project(&cycle, 1095, 365, &identity_scale()).unwrap();
        assert_eq!(out.len(), 365);
        assert!(out[0].abs() < 1e-9);
        assert!((out[364] - 364.0).abs() < 1e-9);
        let shifted = project(&cycle, 1095 + 10, 3, &identity_scale()).unwrap();
        assert!((shifted[0] - 10.0).abs() < 1e-9);
        assert_eq!(
            project(&[1.0, 2.0], 2, 3, &identity_scale()).unwrap(),
            project(&[1.0, 2.0], 0, 3, &identity_scale()).unwrap()
        );
    }

    #[test]
    fn test_project_rejects_empty_cycle() {
        assert!(matches!(
            project(&[], 0, 5, &identity_scale()),
            Err(CycleError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_project_zero_horizon_is_empty() {
        assert!(project(&[1.0], 0, 0, &identity_scale()).unwrap().is_empty());
    }

    #[test]
    fn test_project_dates_follows_calendar() {
        let calendar = CycleCalendar::hydrological();
        let alignment = CycleAlignment::Calendar(calendar);
        let cycle: Vec<f64> = (0..365).map(|p| normalize(p as f64)).collect();
        let start = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        let out = project_dates(&cycle, &alignment, start, 4, &identity_scale()).unwrap();
        assert_eq!(out.start(), start);
        let feb28 = calendar
            .position(NaiveDate::from_ymd_opt(2024, 2, 28).unwrap())
            .unwrap() as f64;
        let values = out.values();
        assert!((values[0] - (feb28 - 1.0)).abs() < 1e-9);
        assert!((values[1] - feb28).abs() < 1e-9);
        // 29 February repeats 28 February
        assert!((values[2] - feb28).abs() < 1e-9);
        assert!((values[3] - (feb28 + 1.0)).abs() < 1e-9);
    }

    #[test]
    fn test_project_dates_rejects_wrong_cycle_length() {
        let alignment = CycleAlignment::Calendar(CycleCalendar::default());
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(matches!(
            project_dates(&[0.0; 364], &alignment, start, 10, &identity_scale()),
            Err(CycleError::Alignment { .. })
        ));
    }
}
