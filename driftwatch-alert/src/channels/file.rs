//! File channel: JSONL append, one alert per line.

use std::io::Write;
use std::path::PathBuf;

use driftwatch_core::errors::ChannelError;
use driftwatch_core::traits::ChannelHandler;
use driftwatch_core::types::Alert;

pub struct FileChannel {
    path: PathBuf,
}

impl FileChannel {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn io_err(&self, e: impl std::fmt::Display) -> ChannelError {
        ChannelError::SendFailed {
            channel: "file".to_string(),
            message: format!("{}: {e}", self.path.display()),
        }
    }
}

impl ChannelHandler for FileChannel {
    fn name(&self) -> &str {
        "file"
    }

    fn send(&self, alert: &Alert) -> Result<(), ChannelError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let line = serde_json::to_string(alert).map_err(|e| self.io_err(e))?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;
        writeln!(file, "{line}").map_err(|e| self.io_err(e))
    }
}
