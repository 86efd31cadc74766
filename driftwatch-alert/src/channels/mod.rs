//! Built-in notification channels and the registry that holds them.
//!
//! Channels are capability implementations selected by alert rules,
//! not subclasses: anything implementing
//! [`ChannelHandler`](driftwatch_core::traits::ChannelHandler) can be
//! registered under a name and referenced from configuration.

pub mod console;
pub mod email;
pub mod file;
pub mod log;
pub mod webhook;

use std::sync::Arc;

use rustc_hash::FxHashMap;

use driftwatch_core::config::AlertConfig;
use driftwatch_core::traits::ChannelHandler;

pub use console::ConsoleChannel;
pub use email::EmailChannel;
pub use file::FileChannel;
pub use log::LogChannel;
pub use webhook::WebhookChannel;

/// Named set of registered channel handlers.
#[derive(Default)]
pub struct ChannelRegistry {
    handlers: FxHashMap<String, Arc<dyn ChannelHandler>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in channels for a configuration: log and console always,
    /// file/webhook/email only when configured.
    pub fn from_config(config: &AlertConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(LogChannel));
        registry.register(Arc::new(ConsoleChannel));
        if let Some(path) = &config.alert_file {
            registry.register(Arc::new(FileChannel::new(path.clone())));
        }
        if let Some(webhook) = &config.webhook {
            registry.register(Arc::new(WebhookChannel::new(webhook.clone())));
        }
        if let Some(email) = &config.email {
            registry.register(Arc::new(EmailChannel::new(email.clone())));
        }
        registry
    }

    /// Register a handler under its own name, replacing any previous
    /// handler with that name.
    pub fn register(&mut self, handler: Arc<dyn ChannelHandler>) {
        self.handlers.insert(handler.name().to_string(), handler);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ChannelHandler>> {
        self.handlers.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }
}
