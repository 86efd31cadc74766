//! SQLite persistence for driftwatch.
//!
//! One write connection serialized behind a mutex, reads served from a
//! small round-robin pool. Alert creation's fingerprint check-and-insert
//! runs inside a BEGIN IMMEDIATE transaction so suppression stays atomic
//! under the single-writer discipline.

pub mod connection;
pub mod migrations;
pub mod queries;

pub use connection::DatabaseManager;
