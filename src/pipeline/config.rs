//! Run configuration, loadable from TOML.

use crate::data::DEFAULT_DATE_COLUMN;
use crate::error::{ForecastError, Result};
use crate::models::arima::{FitConfig, SelectionConfig};
use crate::sink::service_slug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Services forecast when none are requested explicitly.
pub const DEFAULT_SERVICES: [&str; 6] = [
    "Local Route",
    "Light Rail",
    "Peak Service",
    "Rapid Route",
    "School",
    "Other",
];

/// Size of the evaluation window at the end of each series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldoutWindow {
    /// Fraction of the series, e.g. 0.2 for an 80/20 split.
    Fraction(f64),
    /// Fixed number of trailing days.
    Days(usize),
}

impl Default for HoldoutWindow {
    fn default() -> Self {
        HoldoutWindow::Fraction(0.2)
    }
}

impl HoldoutWindow {
    /// Number of hold-out days for a series of length `n`.
    ///
    /// The training window keeps `floor(n * (1 - fraction))` days. At least
    /// one day must remain on each side of the split.
    pub fn holdout_len(&self, n: usize) -> Result<usize> {
        let holdout = match *self {
            HoldoutWindow::Fraction(fraction) => {
                let train = (n as f64 * (1.0 - fraction)).floor() as usize;
                n.saturating_sub(train)
            }
            HoldoutWindow::Days(days) => days,
        };
        if holdout == 0 || holdout >= n {
            return Err(ForecastError::InsufficientData {
                needed: holdout.max(1) + 1,
                got: n,
            });
        }
        Ok(holdout)
    }

    fn validate(&self) -> Result<()> {
        match *self {
            HoldoutWindow::Fraction(f) if !(f > 0.0 && f < 1.0) => Err(
                ForecastError::InvalidParameter(format!("hold-out fraction must be in (0, 1), got {}", f)),
            ),
            HoldoutWindow::Days(0) => Err(ForecastError::InvalidParameter(
                "hold-out must cover at least one day".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Configuration for a [`ForecastPipeline`](super::ForecastPipeline) run.
///
/// # Example
/// ```
/// use ridership_forecast::pipeline::{HoldoutWindow, PipelineConfig};
///
/// let config = PipelineConfig::from_toml_str(r#"
///     services = ["Light Rail", "School"]
///     holdout = { days = 28 }
///     parallel = true
///
///     [selection]
///     strategy = "information_criterion"
/// "#).unwrap();
///
/// assert_eq!(config.holdout, HoldoutWindow::Days(28));
/// assert_eq!(config.date_column, "Date");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Service columns to forecast, in output order.
    pub services: Vec<String>,
    pub date_column: String,
    pub holdout: HoldoutWindow,
    /// Confidence level for published intervals; `None` publishes points only.
    pub interval_level: Option<f64>,
    /// Process services on the rayon thread pool.
    pub parallel: bool,
    pub selection: SelectionConfig,
    pub fit: FitConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            services: DEFAULT_SERVICES.iter().map(|s| s.to_string()).collect(),
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            holdout: HoldoutWindow::default(),
            interval_level: Some(0.95),
            parallel: false,
            selection: SelectionConfig::default(),
            fit: FitConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|e| ForecastError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ForecastError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        self.holdout.validate()?;
        if let Some(level) = self.interval_level {
            if !(level > 0.0 && level < 1.0) {
                return Err(ForecastError::InvalidParameter(format!(
                    "interval level must be in (0, 1), got {}",
                    level
                )));
            }
        }
        if self.services.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "no services requested".to_string(),
            ));
        }
        if self.selection.candidate_periods.iter().all(|&m| m < 2) {
            return Err(ForecastError::InvalidParameter(
                "at least one candidate period must exceed 1".to_string(),
            ));
        }

        let mut slugs: HashMap<String, &str> = HashMap::new();
        for service in &self.services {
            if let Some(other) = slugs.insert(service_slug(service), service) {
                if other != service.as_str() {
                    return Err(ForecastError::InvalidParameter(format!(
                        "services '{}' and '{}' share the record key '{}'",
                        other,
                        service,
                        service_slug(service)
                    )));
                }
            }
        }
        Ok(())
    }
}
