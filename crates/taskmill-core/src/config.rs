//! Scheduler configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config {path}: {field} must be greater than zero")]
    Zero { path: String, field: &'static str },
}

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Period between drain cycles
    #[serde(default = "default_processing_interval_millis")]
    pub processing_interval_millis: u64,

    /// Upper bound on a single work step; exceeding it counts as a failure
    #[serde(default = "default_work_timeout_millis")]
    pub work_timeout_millis: u64,

    /// Duration of the simulated work step
    #[serde(default = "default_simulated_work_millis")]
    pub simulated_work_millis: u64,

    /// Fire the first cycle immediately instead of after one interval
    #[serde(default = "default_run_on_start")]
    pub run_on_start: bool,
}

fn default_processing_interval_millis() -> u64 {
    60_000
}

fn default_work_timeout_millis() -> u64 {
    30_000
}

fn default_simulated_work_millis() -> u64 {
    3_000
}

fn default_run_on_start() -> bool {
    true
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            processing_interval_millis: default_processing_interval_millis(),
            work_timeout_millis: default_work_timeout_millis(),
            simulated_work_millis: default_simulated_work_millis(),
            run_on_start: default_run_on_start(),
        }
    }
}

impl SchedulerConfig {
    /// Load from a TOML file. Missing keys fall back to their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        if config.work_timeout_millis == 0 {
            return Err(ConfigError::Zero {
                path: path.display().to_string(),
                field: "work_timeout_millis",
            });
        }
        Ok(config)
    }

    /// Never zero; a zero period is clamped to one millisecond.
    pub fn processing_interval(&self) -> Duration {
        Duration::from_millis(self.processing_interval_millis.max(1))
    }

    /// Never zero; clamped like the processing interval.
    pub fn work_timeout(&self) -> Duration {
        Duration::from_millis(self.work_timeout_millis.max(1))
    }

    pub fn simulated_work(&self) -> Duration {
        Duration::from_millis(self.simulated_work_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.processing_interval_millis, 60_000);
        assert_eq!(config.work_timeout_millis, 30_000);
        assert_eq!(config.simulated_work_millis, 3_000);
        assert!(config.run_on_start);
    }

    #[test]
    fn test_durations() {
        let config = SchedulerConfig {
            processing_interval_millis: 1_500,
            ..Default::default()
        };
        assert_eq!(config.processing_interval(), Duration::from_millis(1_500));
        assert_eq!(config.work_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = SchedulerConfig {
            processing_interval_millis: 0,
            ..Default::default()
        };
        assert_eq!(config.processing_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_zero_work_timeout_is_clamped() {
        let config = SchedulerConfig {
            work_timeout_millis: 0,
            ..Default::default()
        };
        assert_eq!(config.work_timeout(), Duration::from_millis(1));
    }

    #[test]
    fn test_load_rejects_zero_work_timeout() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "work_timeout_millis = 0").unwrap();

        let err = SchedulerConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Zero { field: "work_timeout_millis", .. }));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SchedulerConfig = toml::from_str("processing_interval_millis = 250").unwrap();
        assert_eq!(config.processing_interval_millis, 250);
        assert_eq!(config.simulated_work_millis, 3_000);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "processing_interval_millis = 1000").unwrap();
        writeln!(file, "run_on_start = false").unwrap();

        let config = SchedulerConfig::load(file.path()).unwrap();
        assert_eq!(config.processing_interval_millis, 1_000);
        assert!(!config.run_on_start);
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "processing_interval_millis = \"soon\"").unwrap();

        let err = SchedulerConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = SchedulerConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
