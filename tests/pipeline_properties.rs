//! Integration tests for the decomposition and forecast pipeline.
//!
//! Each test states one property of the method on synthetic data whose
//! answer is known: transform round trips, filter shapes, decomposition
//! identity, cycle averaging, forecast accuracy on a pure annual cycle and
//! full runs on simulated precipitation.

use cfcycle::bandpass::{bandpass, bandpass_with, Band, FilterKind, FilterOptions};
use cfcycle::cycle::{
    average_by_position, average_cycle, CycleAlignment, CycleCalendar, LeapDayPolicy,
};
use cfcycle::decompose::{decompose, DecompositionBands};
use cfcycle::metrics::evaluate;
use cfcycle::simulation::{simulate_precipitation, sinusoid, PrecipitationModel};
use cfcycle::transform::SeriesTransform;
use cfcycle::{pipeline, CycleError, DatedSeries, PipelineConfig};
use chrono::{Datelike, NaiveDate};
use std::f64::consts::PI;

// ─── Helpers ────────────────────────────────────────────────────────────────

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2001, 10, 1).unwrap()
}

fn rms(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(a.len(), b.len(), "length mismatch");
    let ss: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum();
    (ss / a.len() as f64).sqrt()
}

fn skewed_daily(days: usize) -> Vec<f64> {
    (0..days)
        .map(|i| {
            let season = 1.0 + (2.0 * PI * i as f64 / 365.0).cos();
            let burst = ((13.7 * i as f64).sin() + 1.0).powi(4);
            season * burst
        })
        .collect()
}

// ─── Properties ─────────────────────────────────────────────────────────────

#[test]
fn transform_round_trip() {
    let x = skewed_daily(900);
    let transform = SeriesTransform::fit(&x).unwrap();
    let back = transform.inverse(&transform.forward(&x));
    for (i, (a, b)) in back.iter().zip(x.iter()).enumerate() {
        assert!((a - b).abs() < 1e-9, "[{}]: {} vs {}", i, a, b);
    }
}

#[test]
fn bandpass_preserves_length() {
    let x = skewed_daily(800);
    let bands = [(2.0, 3.0), (6.0, 32.0), (91.25, 730.0), (400.0, 800.0)];
    let option_sets = [
        FilterOptions::default(),
        FilterOptions {
            unit_root: true,
            drift: true,
            ..FilterOptions::default()
        },
        FilterOptions {
            kind: FilterKind::Symmetric {
                max_half_width: Some(36),
            },
            ..FilterOptions::default()
        },
    ];
    for &(low, high) in &bands {
        assert_eq!(bandpass(&x, low, high).unwrap().len(), x.len());
        let band = Band::new(low, high).unwrap();
        for options in &option_sets {
            let out = bandpass_with(&x, &band, options).unwrap();
            assert_eq!(out.values.len(), x.len());
            assert!(out.values.iter().all(|v| v.is_finite()));
        }
    }
}

#[test]
fn decomposition_reconstructs_transformed_input() {
    let x = skewed_daily(4 * 365);
    let transform = SeriesTransform::fit(&x).unwrap();
    let z = transform.forward(&x);
    let bands = DecompositionBands::for_cycle(365, z.len()).unwrap();
    let result = decompose(&z, &bands.trend, &bands.seasonal, &FilterOptions::default()).unwrap();
    assert!(rms(&result.reconstruct(), &z) < 1e-12);
    assert_eq!(result.trend_band, bands.trend);
    assert_eq!(result.seasonal_band, bands.seasonal);
}

#[test]
fn average_cycle_has_cycle_length() {
    let leap_start = NaiveDate::from_ymd_opt(2023, 10, 1).unwrap();
    for first in [start(), leap_start] {
        for days in [365usize, 366, 500, 3 * 365 + 17] {
            let values: Vec<f64> = (0..days).map(|i| (i as f64 * 0.37).sin()).collect();
            let series = DatedSeries::new(first, values);
            let periodic = CycleAlignment::Periodic {
                cycle_length: 365,
                anchor: first,
            };
            let rep = average_cycle(series.values(), &series.dates(), &periodic).unwrap();
            assert_eq!(rep.len(), 365, "periodic, {} days from {}", days, first);

            for policy in [
                LeapDayPolicy::MergeWithPreviousDay,
                LeapDayPolicy::MergeWithNextDay,
            ] {
                let calendar = CycleAlignment::Calendar(
                    CycleCalendar::hydrological().with_leap_day(policy),
                );
                let rep = average_cycle(series.values(), &series.dates(), &calendar).unwrap();
                assert_eq!(rep.len(), 365, "calendar, {} days from {}", days, first);
                assert!(rep.values.iter().all(|v| v.is_finite()));
            }
        }
    }

    let constant = average_cycle(
        &[1.0; 365],
        &DatedSeries::new(leap_start, vec![1.0; 365]).dates(),
        &CycleAlignment::Calendar(CycleCalendar::hydrological()),
    )
    .unwrap();
    assert!(constant.values.iter().all(|&v| v == 1.0));
}

#[test]
fn average_of_periodic_series_is_generating_cycle() {
    let l = 52;
    let cycle: Vec<f64> = (0..l).map(|p| ((p * p) % 11) as f64 - 3.5).collect();
    let cycles = 7;
    let values: Vec<f64> = (0..cycles * l).map(|i| cycle[i % l]).collect();
    let positions: Vec<usize> = (0..cycles * l).map(|i| i % l).collect();
    let rep = average_by_position(&values, &positions, l).unwrap();
    assert_eq!(rep.values, cycle);
    assert!(rep.counts.iter().all(|&c| c == cycles));
}

/// Three synthetic years of `2 + sin(2πt/365)` train a forecast of the fourth.
#[test]
fn three_cycles_recover_annual_shape_and_forecast_fourth() {
    let l = 365;
    let amplitude = 1.0;
    let series = DatedSeries::new(start(), sinusoid(4 * l, l, amplitude, 2.0));
    let report = pipeline::run(&series, &PipelineConfig::default()).unwrap();

    assert_eq!(report.decomposition.trend.len(), 3 * l);
    assert_eq!(report.bands.seasonal.period_low, 91.25);
    assert_eq!(report.bands.seasonal.period_high, 730.0);

    // transformed generating cycle, centred
    let z = report.transform.forward(&series.values()[..l]);
    let z_mean = z.iter().sum::<f64>() / l as f64;
    let truth: Vec<f64> = z.iter().map(|v| v - z_mean).collect();
    let truth_amplitude = truth.iter().fold(0.0f64, |m, v| m.max(v.abs()));

    let rep_error = rms(&report.representative_cycle.values, &truth);
    assert!(
        rep_error < 0.1 * truth_amplitude,
        "representative cycle rms error {} vs amplitude {}",
        rep_error,
        truth_amplitude
    );

    let accuracy = report.accuracy.unwrap();
    assert_eq!(accuracy.n, l);
    assert!(
        accuracy.rmse < 0.1 * amplitude,
        "forecast rmse {}",
        accuracy.rmse
    );
    assert_eq!(accuracy.zero_observations, 0);
}

#[test]
fn evaluate_identical_series_is_exact() {
    let series = DatedSeries::new(start(), skewed_daily(200));
    let acc = evaluate(&series, &series).unwrap();
    assert_eq!(acc.rmse, 0.0);
    assert_eq!(acc.mae, 0.0);
    assert_eq!(acc.me, 0.0);
}

#[test]
fn malformed_band_is_rejected() {
    let x = skewed_daily(400);
    assert!(matches!(
        bandpass(&x, 100.0, 50.0),
        Err(CycleError::InvalidBand { .. })
    ));
    assert!(matches!(
        bandpass(&x, 60.0, 60.0),
        Err(CycleError::InvalidBand { .. })
    ));
    assert!(matches!(
        Band::new(1.0, 10.0),
        Err(CycleError::InvalidBand { .. })
    ));
}

// ─── Full runs ──────────────────────────────────────────────────────────────

#[test]
fn simulated_precipitation_hydrological_run() {
    let model = PrecipitationModel::default();
    let series = simulate_precipitation(start(), 3652, &model, 2024).unwrap();
    let report = pipeline::run(&series, &PipelineConfig::hydrological()).unwrap();

    assert_eq!(report.held_out.len(), 365);
    assert_eq!(report.forecast.len(), 365);
    assert_eq!(report.representative_cycle.len(), 365);
    assert!(report.representative_cycle.counts.iter().all(|&c| c >= 9));
    assert!(report.forecast.values().iter().all(|v| v.is_finite()));

    let by_month = |month: u32| {
        let picked: Vec<f64> = report
            .forecast
            .dates()
            .iter()
            .zip(report.forecast.values())
            .filter(|(d, _)| d.month() == month)
            .map(|(_, &v)| v)
            .collect();
        picked.iter().sum::<f64>() / picked.len() as f64
    };
    assert!(by_month(1) > by_month(7), "winter should be wetter");

    let acc = report.accuracy.unwrap();
    assert!(acc.zero_observations > 0);
    assert!(acc.mape.is_some());
    assert!(acc.rmse.is_finite());
}

#[test]
fn run_with_toml_config_file() {
    let content = r#"
cycle_length = 365
smoothing_harmonics = 4
restore_level = true

[calendar]
start_month = 1
start_day = 1
leap_day = "merge_with_next_day"
"#;
    let path = std::env::temp_dir().join(format!("cfcycle-config-{}.toml", std::process::id()));
    std::fs::write(&path, content).unwrap();
    let config = PipelineConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.smoothing_harmonics, Some(4));
    let series = simulate_precipitation(
        NaiveDate::from_ymd_opt(2003, 1, 1).unwrap(),
        6 * 365,
        &PrecipitationModel::default(),
        11,
    )
    .unwrap();
    let report = pipeline::run(&series, &config).unwrap();
    assert_eq!(report.projected_cycle.len(), 365);
    assert!(report.accuracy.is_some());
}

#[test]
fn report_serializes_to_json() {
    let series = DatedSeries::new(start(), sinusoid(4 * 365, 365, 1.0, 2.0));
    let report = pipeline::run(&series, &PipelineConfig::default()).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert!(json["accuracy"]["rmse"].is_number());
    assert_eq!(json["forecast"]["values"].as_array().unwrap().len(), 365);
    assert_eq!(json["config"]["cycle_length"], 365);
}
