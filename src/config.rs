//! Pipeline configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration:
//!
//! ```toml
//! cycle_length = 365
//! restore_level = false
//! smoothing_harmonics = 6
//!
//! [calendar]
//! start_month = 10
//! start_day = 1
//! leap_day = "merge_with_previous_day"
//!
//! [seasonal_band]
//! period_low = 91.25
//! period_high = 730.0
//!
//! [filter]
//! unit_root = false
//! drift = false
//! ```

use crate::bandpass::{Band, FilterKind, FilterOptions};
use crate::cycle::{CycleAlignment, CycleCalendar, CALENDAR_CYCLE_LENGTH};
use crate::decompose::DecompositionBands;
use crate::error::{CycleError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration of a full decomposition and forecast run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Samples per seasonal cycle
    pub cycle_length: usize,
    /// Align positions to a calendar cutover; `None` counts positions from
    /// the first training date
    pub calendar: Option<CycleCalendar>,
    /// Trend band; derived from the cycle length when unset
    pub trend_band: Option<Band>,
    /// Seasonal band; derived from the cycle length when unset
    pub seasonal_band: Option<Band>,
    /// Filter assumptions shared by both passes
    pub filter: FilterOptions,
    /// Index of the first held-out sample; defaults to holding out the last cycle
    pub split_index: Option<usize>,
    /// Forecast length; defaults to the held-out length
    pub horizon: Option<usize>,
    /// Smooth the representative cycle onto this many harmonics
    pub smoothing_harmonics: Option<usize>,
    /// Add the mean of the transformed training series back before inversion
    pub restore_level: bool,
}

impl Default for PipelineConfig {
    /// Cycles of 365 samples counted from the first training date, with no
    /// calendar cutover. Use [`PipelineConfig::hydrological`] for cycles that
    /// start every 1 October.
    fn default() -> Self {
        Self {
            cycle_length: CALENDAR_CYCLE_LENGTH,
            calendar: None,
            trend_band: None,
            seasonal_band: None,
            filter: FilterOptions::default(),
            split_index: None,
            horizon: None,
            smoothing_harmonics: None,
            restore_level: false,
        }
    }
}

impl PipelineConfig {
    /// Default configuration aligned to the hydrological year.
    pub fn hydrological() -> Self {
        Self {
            calendar: Some(CycleCalendar::hydrological()),
            ..Self::default()
        }
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| CycleError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CycleError::Config(format!("Failed to read config: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Serialize to TOML text.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CycleError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Validate the configuration independently of any data.
    pub fn validate(&self) -> Result<()> {
        if self.cycle_length < 8 {
            return Err(CycleError::invalid_parameter(
                "cycle_length",
                format!("must be at least 8 samples, got {}", self.cycle_length),
            ));
        }
        if let Some(calendar) = &self.calendar {
            calendar.validate()?;
            if self.cycle_length != CALENDAR_CYCLE_LENGTH {
                return Err(CycleError::invalid_parameter(
                    "cycle_length",
                    format!(
                        "calendar alignment needs {} days, got {}",
                        CALENDAR_CYCLE_LENGTH, self.cycle_length
                    ),
                ));
            }
        }
        if let Some(band) = &self.trend_band {
            Band::new(band.period_low, band.period_high)?;
        }
        if let Some(band) = &self.seasonal_band {
            Band::new(band.period_low, band.period_high)?;
        }
        if let FilterKind::Symmetric {
            max_half_width: Some(0),
        } = self.filter.kind
        {
            return Err(CycleError::invalid_parameter(
                "max_half_width",
                "symmetric window needs a half-width of at least 1",
            ));
        }
        if self.split_index == Some(0) {
            return Err(CycleError::invalid_parameter(
                "split_index",
                "training data would be empty",
            ));
        }
        if self.smoothing_harmonics == Some(0) {
            return Err(CycleError::invalid_parameter(
                "smoothing_harmonics",
                "must be at least 1 when set",
            ));
        }
        Ok(())
    }

    /// Cycle alignment for a training series starting on `start`.
    pub fn alignment(&self, start: NaiveDate) -> CycleAlignment {
        match self.calendar {
            Some(calendar) => CycleAlignment::Calendar(calendar),
            None => CycleAlignment::Periodic {
                cycle_length: self.cycle_length,
                anchor: start,
            },
        }
    }

    /// Bands for a training series of `len` samples, filling unset bands
    /// from [`DecompositionBands::for_cycle`].
    pub fn bands(&self, len: usize) -> Result<DecompositionBands> {
        let (trend, seasonal) = match (self.trend_band, self.seasonal_band) {
            (Some(trend), Some(seasonal)) => (trend, seasonal),
            (trend, seasonal) => {
                let defaults = DecompositionBands::for_cycle(self.cycle_length, len)?;
                (
                    trend.unwrap_or(defaults.trend),
                    seasonal.unwrap_or(defaults.seasonal),
                )
            }
        };
        trend.validate_for(len)?;
        seasonal.validate_for(len)?;
        Ok(DecompositionBands { trend, seasonal })
    }

    /// Split index for a series of `len` samples.
    pub fn resolve_split(&self, len: usize) -> Result<usize> {
        let split = match self.split_index {
            Some(index) => index,
            None => len.checked_sub(self.cycle_length).ok_or_else(|| {
                CycleError::invalid_parameter(
                    "split_index",
                    format!(
                        "series of {} samples is shorter than one cycle of {}",
                        len, self.cycle_length
                    ),
                )
            })?,
        };
        if split == 0 || split >= len {
            return Err(CycleError::invalid_parameter(
                "split_index",
                format!("{} must lie strictly inside 0..{}", split, len),
            ));
        }
        Ok(split)
    }
}
