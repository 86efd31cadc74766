//! Single-instance lock.
//!
//! One monitor per project state directory: a second `start` against
//! the same directory fails fast instead of racing the first over the
//! store and the baselines.

use std::fs::File;
use std::path::Path;

use fd_lock::RwLock;

use driftwatch_core::errors::ConfigError;

/// Holds an exclusive advisory lock on `<state_dir>/driftwatch.lock`
/// for as long as the value lives.
///
/// The guard returned by `try_write` is forgotten rather than stored:
/// an advisory lock persists until its descriptor closes, so keeping
/// the file open is enough, and dropping this value closes it.
pub struct InstanceLock {
    _file: RwLock<File>,
}

impl InstanceLock {
    pub fn acquire(state_dir: &Path) -> Result<Self, ConfigError> {
        std::fs::create_dir_all(state_dir).map_err(|e| ConfigError::ValidationFailed {
            field: "state_dir".to_string(),
            message: format!("{}: {e}", state_dir.display()),
        })?;

        let lock_path = state_dir.join("driftwatch.lock");
        let file = File::create(&lock_path).map_err(|e| ConfigError::ValidationFailed {
            field: "state_dir".to_string(),
            message: format!("{}: {e}", lock_path.display()),
        })?;

        let mut lock = RwLock::new(file);
        let guard = lock.try_write().map_err(|_| ConfigError::AlreadyRunning {
            path: lock_path.display().to_string(),
        })?;
        std::mem::forget(guard);

        Ok(Self { _file: lock })
    }
}
