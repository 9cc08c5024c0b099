use anyhow::{bail, Result};
use clap::ArgMatches;

use crate::core::thermal::Pipeline;
use crate::ui;

/// Send one test notification per priority.
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let loaded = super::prepare(matches)?;
    let pipeline = Pipeline::new(loaded.sink()?, loaded.store());

    let results = super::runtime()?.block_on(pipeline.dispatcher().send_test_notifications());

    let mut failures = 0;
    for (priority, outcome) in &results {
        let line = format!("  {:<9} {}", priority.as_str(), outcome);
        if outcome.is_sent() {
            ui::success(&line);
        } else {
            failures += 1;
            ui::error(&line);
        }
    }

    if failures > 0 {
        bail!("{} of {} test notifications were not delivered", failures, results.len());
    }
    Ok(())
}
