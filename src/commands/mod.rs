// Command handlers module
pub mod check_config;
pub mod run;
pub mod status;
pub mod test_mode;
pub mod test_notify;
pub mod version;

// Re-exports for cleaner imports
pub use version::execute as version;

use anyhow::{Context, Result};
use clap::ArgMatches;
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::{Config, ConfigStore};
use crate::integrations::{HomeAssistantSink, Sink};

/// Validated configuration plus where it came from
pub struct Loaded {
    pub path: PathBuf,
    pub config: Config,
}

impl Loaded {
    pub fn store(&self) -> Arc<ConfigStore> {
        Arc::new(ConfigStore::with_path(self.config.clone(), self.path.clone()))
    }

    pub fn sink(&self) -> Result<Arc<dyn Sink>> {
        let sink = HomeAssistantSink::new(&self.config.homeassistant)
            .context("Failed to create Home Assistant client")?;
        Ok(Arc::new(sink))
    }
}

/// Resolve, load and validate the configuration, then start logging.
pub fn prepare(matches: &ArgMatches) -> Result<Loaded> {
    let explicit = matches.get_one::<String>("config").map(String::as_str);
    let path = Config::resolve_path(explicit)?;
    let config = Config::load_from(&path)
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;

    if let Err(e) = crate::init_logging(&config.logging) {
        // Only happens when a logger is already installed
        log::debug!("{}", e);
    }

    Ok(Loaded { path, config })
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    crate::core::ingest::build_runtime().context("Failed to start async runtime")
}
