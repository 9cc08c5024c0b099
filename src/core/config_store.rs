//! Shared, atomically swappable configuration.
//!
//! Readers take an `Arc<Config>` and keep using it for the whole operation;
//! a reload builds a complete new `Config` and replaces the pointer, so nobody
//! observes a half-updated threshold set.

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::config::Config;
use crate::error::Result;

#[derive(Debug)]
pub struct ConfigStore {
    current: RwLock<Arc<Config>>,
    path: Option<PathBuf>,
}

impl ConfigStore {
    pub fn new(config: Config) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
            path: None,
        }
    }

    /// Store backed by a file that `reload` re-reads.
    pub fn with_path(config: Config, path: PathBuf) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
            path: Some(path),
        }
    }

    pub fn current(&self) -> Arc<Config> {
        Arc::clone(&self.current.read())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Swap in a new configuration and return the previous one.
    pub fn replace(&self, config: Config) -> Arc<Config> {
        std::mem::replace(&mut *self.current.write(), Arc::new(config))
    }

    /// Re-read the backing file. The current config is kept when the file is invalid.
    pub fn reload(&self) -> Result<Arc<Config>> {
        let Some(path) = self.path.as_deref() else {
            return Ok(self.current());
        };

        let config = Config::load_from(path)?;
        let previous = self.replace(config);
        let current = self.current();

        let (before, after) = (&previous.monitoring, &current.monitoring);
        if previous.homeassistant != current.homeassistant
            || before.http_port != after.http_port
            || before.bind_address != after.bind_address
            || before.enable_file_monitor != after.enable_file_monitor
            || before.enable_http_server != after.enable_http_server
        {
            log::warn!(
                "Sink or listener settings changed in {}; they take effect after restart",
                path.display()
            );
        }

        Ok(current)
    }
}
