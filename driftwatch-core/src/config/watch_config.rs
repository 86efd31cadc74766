//! Top-level driftwatch configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AlertConfig, DetectorConfig, MonitorConfig};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Programmatic overrides (applied via `apply_overrides`)
/// 2. Environment variables (`DRIFTWATCH_*`)
/// 3. Project config (`driftwatch.toml` in the project root)
/// 4. User config (`~/.driftwatch/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WatchConfig {
    pub monitor: MonitorConfig,
    pub detector: DetectorConfig,
    pub alerts: AlertConfig,
}

/// Programmatic overrides, the highest-priority layer. The embedding
/// product maps its own flags onto these.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub scan_interval_secs: Option<u64>,
    pub batch_size: Option<usize>,
    pub min_confidence: Option<f64>,
    pub suppression_window_secs: Option<u64>,
}

impl WatchConfig {
    /// Load configuration with layered resolution and validate the result.
    pub fn load(root: &Path, overrides: Option<&Overrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Lowest priority: user config.
        if let Some(user_path) = Self::user_config_path() {
            if user_path.exists() {
                Self::merge_toml_file(&mut config, &user_path)?;
            }
        }

        // Project config.
        let project_path = root.join("driftwatch.toml");
        if project_path.exists() {
            Self::merge_toml_file(&mut config, &project_path)?;
        }

        // Environment variables.
        Self::apply_env_overrides(&mut config);

        // Highest priority: programmatic overrides.
        if let Some(ov) = overrides {
            Self::apply_overrides(&mut config, ov);
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &WatchConfig) -> Result<(), ConfigError> {
        if config.monitor.effective_scan_interval_secs() == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "monitor.scan_interval_secs".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.monitor.effective_batch_size() == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "monitor.batch_size".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.monitor.effective_queue_capacity() == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "monitor.queue_capacity".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        let cpu = config.monitor.effective_max_cpu_percent();
        if !(cpu > 0.0 && cpu <= 100.0) {
            return Err(ConfigError::ValidationFailed {
                field: "monitor.max_cpu_percent".to_string(),
                message: "must be in (0, 100]".to_string(),
            });
        }
        if config.monitor.effective_max_memory_mb() <= 0.0 {
            return Err(ConfigError::ValidationFailed {
                field: "monitor.max_memory_mb".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        for pattern in config
            .monitor
            .effective_watch_patterns()
            .iter()
            .chain(config.monitor.effective_ignore_patterns().iter())
        {
            if let Err(e) = glob::Pattern::new(pattern) {
                return Err(ConfigError::ValidationFailed {
                    field: "monitor.watch_patterns".to_string(),
                    message: format!("invalid glob '{pattern}': {e}"),
                });
            }
        }
        let min_confidence = config.detector.effective_min_confidence();
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(ConfigError::ValidationFailed {
                field: "detector.min_confidence".to_string(),
                message: "must be between 0.0 and 1.0".to_string(),
            });
        }
        if config.alerts.effective_channel_timeout_ms() == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "alerts.channel_timeout_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Returns the user config path: `~/.driftwatch/config.toml`.
    fn user_config_path() -> Option<std::path::PathBuf> {
        home_dir().map(|h| h.join(".driftwatch").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut WatchConfig, path: &Path) -> Result<(), ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                path: path.display().to_string(),
            })?;

        let file_config: WatchConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        debug!(path = %path.display(), "merged config layer");
        Ok(())
    }

    /// Merge `other` into `base`: `other` wins wherever it has a value.
    fn merge(base: &mut WatchConfig, other: &WatchConfig) {
        // Monitor
        if other.monitor.scan_interval_secs.is_some() {
            base.monitor.scan_interval_secs = other.monitor.scan_interval_secs;
        }
        if !other.monitor.watch_patterns.is_empty() {
            base.monitor.watch_patterns = other.monitor.watch_patterns.clone();
        }
        if !other.monitor.ignore_patterns.is_empty() {
            base.monitor.ignore_patterns = other.monitor.ignore_patterns.clone();
        }
        if other.monitor.max_cpu_percent.is_some() {
            base.monitor.max_cpu_percent = other.monitor.max_cpu_percent;
        }
        if other.monitor.max_memory_mb.is_some() {
            base.monitor.max_memory_mb = other.monitor.max_memory_mb;
        }
        if other.monitor.batch_size.is_some() {
            base.monitor.batch_size = other.monitor.batch_size;
        }
        if !other.monitor.enabled_checks.is_empty() {
            base.monitor.enabled_checks = other.monitor.enabled_checks.clone();
        }
        if other.monitor.queue_capacity.is_some() {
            base.monitor.queue_capacity = other.monitor.queue_capacity;
        }
        if other.monitor.overflow.is_some() {
            base.monitor.overflow = other.monitor.overflow;
        }

        // Detector
        if other.detector.min_confidence.is_some() {
            base.detector.min_confidence = other.detector.min_confidence;
        }
        if other.detector.enricher_timeout_ms.is_some() {
            base.detector.enricher_timeout_ms = other.detector.enricher_timeout_ms;
        }
        if !other.detector.confidence_weights.is_empty() {
            base.detector.confidence_weights = other.detector.confidence_weights.clone();
        }

        // Alerts
        if other.alerts.suppression_window_secs.is_some() {
            base.alerts.suppression_window_secs = other.alerts.suppression_window_secs;
        }
        if other.alerts.channel_timeout_ms.is_some() {
            base.alerts.channel_timeout_ms = other.alerts.channel_timeout_ms;
        }
        if other.alerts.rate_per_minute.is_some() {
            base.alerts.rate_per_minute = other.alerts.rate_per_minute;
        }
        if other.alerts.rate_per_hour.is_some() {
            base.alerts.rate_per_hour = other.alerts.rate_per_hour;
        }
        if other.alerts.alert_file.is_some() {
            base.alerts.alert_file = other.alerts.alert_file.clone();
        }
        if other.alerts.webhook.is_some() {
            base.alerts.webhook = other.alerts.webhook.clone();
        }
        if other.alerts.email.is_some() {
            base.alerts.email = other.alerts.email.clone();
        }
        if !other.alerts.rules.is_empty() {
            base.alerts.rules = other.alerts.rules.clone();
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `DRIFTWATCH_SCAN_INTERVAL_SECS`, `DRIFTWATCH_BATCH_SIZE`, etc.
    fn apply_env_overrides(config: &mut WatchConfig) {
        if let Ok(val) = std::env::var("DRIFTWATCH_SCAN_INTERVAL_SECS") {
            if let Ok(v) = val.parse::<u64>() {
                config.monitor.scan_interval_secs = Some(v);
            }
        }
        if let Ok(val) = std::env::var("DRIFTWATCH_BATCH_SIZE") {
            if let Ok(v) = val.parse::<usize>() {
                config.monitor.batch_size = Some(v);
            }
        }
        if let Ok(val) = std::env::var("DRIFTWATCH_MAX_CPU_PERCENT") {
            if let Ok(v) = val.parse::<f64>() {
                config.monitor.max_cpu_percent = Some(v);
            }
        }
        if let Ok(val) = std::env::var("DRIFTWATCH_MAX_MEMORY_MB") {
            if let Ok(v) = val.parse::<f64>() {
                config.monitor.max_memory_mb = Some(v);
            }
        }
        if let Ok(val) = std::env::var("DRIFTWATCH_MIN_CONFIDENCE") {
            if let Ok(v) = val.parse::<f64>() {
                config.detector.min_confidence = Some(v);
            }
        }
        if let Ok(val) = std::env::var("DRIFTWATCH_SUPPRESSION_WINDOW_SECS") {
            if let Ok(v) = val.parse::<u64>() {
                config.alerts.suppression_window_secs = Some(v);
            }
        }
        if let Ok(val) = std::env::var("DRIFTWATCH_CHANNEL_TIMEOUT_MS") {
            if let Ok(v) = val.parse::<u64>() {
                config.alerts.channel_timeout_ms = Some(v);
            }
        }
    }

    /// Apply programmatic overrides (highest priority).
    fn apply_overrides(config: &mut WatchConfig, ov: &Overrides) {
        if let Some(v) = ov.scan_interval_secs {
            config.monitor.scan_interval_secs = Some(v);
        }
        if let Some(v) = ov.batch_size {
            config.monitor.batch_size = Some(v);
        }
        if let Some(v) = ov.min_confidence {
            config.detector.min_confidence = Some(v);
        }
        if let Some(v) = ov.suppression_window_secs {
            config.alerts.suppression_window_secs = Some(v);
        }
    }
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<std::path::PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(std::path::PathBuf::from)
}
