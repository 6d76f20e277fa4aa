//! # Pipeline Configuration
//!
//! Tunables for the orchestrator, loaded from defaults, JSON or the
//! environment.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `COURIER_ACCEPTED_FORMATS` | `4.0,3.1` | Comma separated format versions |
//! | `COURIER_FRESHNESS_MONTHS` | `1` | Freshness window in calendar months |
//! | `COURIER_EXECUTION` | `sequential` | `sequential` or `parallel` |
//! | `COURIER_MAX_WORKERS` | available cores | Worker pool size in parallel mode |

use crate::domain::validation::{Validators, ACCEPTED_FORMATS, FRESHNESS_WINDOW_MONTHS};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Fallback worker count when available parallelism cannot be determined.
const DEFAULT_WORKERS: usize = 4;

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable holds an unparseable value
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    /// JSON configuration could not be parsed
    #[error("Malformed configuration: {0}")]
    Malformed(String),

    /// No format version would ever be accepted
    #[error("accepted_formats must not be empty")]
    NoAcceptedFormats,

    /// A zero-month window rejects every document
    #[error("freshness_window_months must be at least 1")]
    ZeroFreshnessWindow,

    /// A worker pool needs at least one thread
    #[error("max_workers must be at least 1")]
    ZeroWorkers,

    /// The rayon worker pool could not be built
    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),
}

/// How the files of a batch are scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// One file after another on the calling thread
    #[default]
    Sequential,
    /// Files spread across a bounded worker pool
    Parallel,
}

impl FromStr for ExecutionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "parallel" => Ok(Self::Parallel),
            _ => Err(ConfigError::InvalidValue {
                key: "COURIER_EXECUTION".into(),
                value: s.into(),
            }),
        }
    }
}

/// Orchestrator configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Format versions accepted, compared literally.
    pub accepted_formats: Vec<String>,
    /// Freshness window in calendar months.
    pub freshness_window_months: u32,
    /// Sequential or parallel scheduling.
    pub execution: ExecutionMode,
    /// Worker pool size, used in parallel mode only.
    pub max_workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            accepted_formats: ACCEPTED_FORMATS.iter().map(|v| v.to_string()).collect(),
            freshness_window_months: FRESHNESS_WINDOW_MONTHS,
            execution: ExecutionMode::Sequential,
            max_workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(DEFAULT_WORKERS),
        }
    }
}

impl PipelineConfig {
    /// Parallel configuration with a fixed pool size.
    pub fn parallel(max_workers: usize) -> Self {
        Self {
            execution: ExecutionMode::Parallel,
            max_workers,
            ..Self::default()
        }
    }

    /// Load from `COURIER_*` environment variables over the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from any key lookup over the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(formats) = lookup("COURIER_ACCEPTED_FORMATS") {
            config.accepted_formats = formats
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(months) = lookup("COURIER_FRESHNESS_MONTHS") {
            config.freshness_window_months = parse_var("COURIER_FRESHNESS_MONTHS", &months)?;
        }
        if let Some(mode) = lookup("COURIER_EXECUTION") {
            config.execution = mode.parse()?;
        }
        if let Some(workers) = lookup("COURIER_MAX_WORKERS") {
            config.max_workers = parse_var("COURIER_MAX_WORKERS", &workers)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.accepted_formats.is_empty() {
            return Err(ConfigError::NoAcceptedFormats);
        }
        if self.freshness_window_months == 0 {
            return Err(ConfigError::ZeroFreshnessWindow);
        }
        if self.max_workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        Ok(())
    }

    /// Validators implementing this configuration's rules.
    pub fn validators(&self) -> Validators {
        Validators::new(self.accepted_formats.clone(), self.freshness_window_months)
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.into(),
        value: value.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.accepted_formats, vec!["4.0", "3.1"]);
        assert_eq!(config.freshness_window_months, 1);
        assert_eq!(config.execution, ExecutionMode::Sequential);
        assert!(config.max_workers >= 1);
        assert!(config.validate().is_ok());
        assert_eq!(config.validators(), Validators::default());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            ("COURIER_ACCEPTED_FORMATS", "4.0, 5.0,,"),
            ("COURIER_FRESHNESS_MONTHS", "2"),
            ("COURIER_EXECUTION", "Parallel"),
            ("COURIER_MAX_WORKERS", "8"),
        ]))
        .unwrap();

        assert_eq!(config.accepted_formats, vec!["4.0", "5.0"]);
        assert_eq!(config.freshness_window_months, 2);
        assert_eq!(config.execution, ExecutionMode::Parallel);
        assert_eq!(config.max_workers, 8);
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let err = PipelineConfig::from_lookup(lookup_from(&[("COURIER_MAX_WORKERS", "many")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "COURIER_MAX_WORKERS".into(),
                value: "many".into()
            }
        );

        let err =
            PipelineConfig::from_lookup(lookup_from(&[("COURIER_EXECUTION", "eventually")]))
                .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_execution_mode_error_keeps_raw_input() {
        assert_eq!(" PARALLEL ".parse::<ExecutionMode>(), Ok(ExecutionMode::Parallel));
        assert_eq!(
            " Turbo ".parse::<ExecutionMode>(),
            Err(ConfigError::InvalidValue {
                key: "COURIER_EXECUTION".into(),
                value: " Turbo ".into()
            })
        );
    }

    #[test]
    fn test_validate_invariants() {
        let config = PipelineConfig {
            accepted_formats: vec![],
            ..PipelineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoAcceptedFormats));

        let config = PipelineConfig {
            freshness_window_months: 0,
            ..PipelineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroFreshnessWindow));

        assert_eq!(
            PipelineConfig::parallel(0).validate(),
            Err(ConfigError::ZeroWorkers)
        );
    }

    #[test]
    fn test_from_json_partial() {
        let config = PipelineConfig::from_json(r#"{"execution": "parallel", "max_workers": 3}"#)
            .unwrap();
        assert_eq!(config.execution, ExecutionMode::Parallel);
        assert_eq!(config.max_workers, 3);
        assert_eq!(config.accepted_formats, vec!["4.0", "3.1"]);
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(matches!(
            PipelineConfig::from_json("{not json"),
            Err(ConfigError::Malformed(_))
        ));
        assert_eq!(
            PipelineConfig::from_json(r#"{"freshness_window_months": 0}"#),
            Err(ConfigError::ZeroFreshnessWindow)
        );
    }
}
