//! Configuration system for driftwatch.
//! TOML-based, layered resolution: overrides > env > project > user > defaults.

pub mod alert_config;
pub mod detector_config;
pub mod monitor_config;
pub mod watch_config;

pub use alert_config::{AlertConfig, AlertRuleConfig, EmailSettings, WebhookSettings};
pub use detector_config::DetectorConfig;
pub use monitor_config::{MonitorConfig, OverflowPolicy};
pub use watch_config::{Overrides, WatchConfig};
