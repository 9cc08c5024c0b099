use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::Agent;

/// Run the monitoring agent until SIGINT/SIGTERM.
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let loaded = super::prepare(matches)?;
    log::info!("Loaded configuration from {}", loaded.path.display());

    let sink = loaded.sink()?;
    let agent = Agent::new(loaded.store(), sink);

    super::runtime()?
        .block_on(agent.run())
        .context("Thermal monitoring failed")
}
