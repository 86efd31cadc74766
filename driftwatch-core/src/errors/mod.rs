//! Error handling for driftwatch.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod channel_error;
pub mod config_error;
pub mod scan_error;
pub mod spec_error;
pub mod storage_error;
pub mod suggest_error;

pub use channel_error::ChannelError;
pub use config_error::ConfigError;
pub use scan_error::ScanError;
pub use spec_error::SpecError;
pub use storage_error::StorageError;
pub use suggest_error::SuggestError;
