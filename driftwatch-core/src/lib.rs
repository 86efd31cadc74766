//! Core types, traits, errors, config, and logging for driftwatch.
//!
//! Everything downstream crates share lives here: the data model
//! (specifications, signatures, drift reports, alerts, suggestions),
//! the capability traits at the seams to external collaborators, the
//! per-subsystem error enums, and the layered TOML configuration.

pub mod clock;
pub mod config;
pub mod errors;
pub mod logging;
pub mod traits;
pub mod types;
