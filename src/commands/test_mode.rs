use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::thermal::Pipeline;
use crate::platform::{MetricsSource, SysfsMetricsSource};
use crate::ui;

/// Read one local snapshot and push it through the full pipeline.
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let loaded = super::prepare(matches)?;

    let mut source = SysfsMetricsSource::new(&loaded.config.sensors);
    let snapshot = source.read();
    ui::info(&format!("Snapshot: {}", ui::format_snapshot(&snapshot)));

    let pipeline = Pipeline::new(loaded.sink()?, loaded.store());
    let outcome = super::runtime()?
        .block_on(pipeline.submit(snapshot))
        .context("Snapshot was not processed")?;

    print!("{}", ui::format_outcome(&outcome));
    Ok(())
}
