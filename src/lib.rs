//! # cfcycle
//!
//! Seasonal decomposition and cycle-averaging forecasts for daily
//! hydro-climatic series.
//!
//! The crate provides:
//! - Standardization plus inverse hyperbolic sine transform of skewed series
//! - The Christiano-Fitzgerald band-pass filter (stationary, random-walk and
//!   symmetric variants)
//! - Two-pass decomposition into trend, seasonal and residual components
//! - Multi-year averaging of the seasonal component by cycle position, with
//!   calendar cutovers and leap-day handling
//! - Forecasts that tile the representative cycle over a horizon
//! - Accuracy metrics (ME, MSE, RMSE, MAE, MPE, MAPE)
//! - Periodogram diagnostics and a synthetic precipitation generator
//!
//! ## Example
//!
//! ```no_run
//! use cfcycle::{pipeline, simulation, PipelineConfig};
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2000, 10, 1).unwrap();
//! let model = simulation::PrecipitationModel::default();
//! let series = simulation::simulate_precipitation(start, 3652, &model, 42).unwrap();
//! let report = pipeline::run(&series, &PipelineConfig::hydrological()).unwrap();
//! println!("{:?}", report.accuracy);
//! ```

#![allow(clippy::needless_range_loop)]

pub mod parallel;

pub mod bandpass;
pub mod config;
pub mod cycle;
pub mod decompose;
pub mod error;
pub mod forecast;
pub mod helpers;
pub mod metrics;
pub mod pipeline;
pub mod series;
pub mod simulation;
pub mod spectrum;
pub mod transform;

// Re-export commonly used items
pub use error::{CycleError, Result};
pub use helpers::NUMERICAL_EPS;

pub use bandpass::{bandpass, bandpass_with, ideal_weights, Band, FilterKind, FilterOptions};
pub use config::PipelineConfig;
pub use cycle::{
    average_by_position, average_cycle, smooth_harmonics, CycleAlignment, CycleCalendar,
    LeapDayPolicy, RepresentativeCycle, CALENDAR_CYCLE_LENGTH,
};
pub use decompose::{decompose, decompose_with, Decomposition, DecompositionBands};
pub use forecast::{project, project_dates, project_with_level};
pub use metrics::{evaluate, evaluate_values, Accuracy};
pub use pipeline::{run, ForecastReport};
pub use series::DatedSeries;
pub use transform::{denormalize, normalize, standardize, SeriesTransform};
