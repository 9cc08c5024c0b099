use anyhow::{Context, Result};
use clap::ArgMatches;
use std::time::Duration;

use crate::core::config::MonitoringConfig;
use crate::core::thermal::{HealthResponse, Pipeline};
use crate::ui;

/// Show the running agent's status, or a local view when it is not reachable.
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let loaded = super::prepare(matches)?;
    let runtime = super::runtime()?;

    let remote = if loaded.config.monitoring.enable_http_server {
        runtime.block_on(query_agent(&loaded.config.monitoring))
    } else {
        Err(anyhow::anyhow!("HTTP listener disabled"))
    };

    let report = match remote {
        Ok(health) => health.monitoring,
        Err(e) => {
            ui::warn(&format!("Agent not reachable ({}), showing local status", e));
            let pipeline = Pipeline::new(loaded.sink()?, loaded.store());
            pipeline.close();
            runtime.block_on(pipeline.status())
        }
    };

    print!("{}", ui::format_status(&report));
    Ok(())
}

fn health_url(monitoring: &MonitoringConfig) -> String {
    let host = match monitoring.bind_address.as_str() {
        "0.0.0.0" => "127.0.0.1",
        "::" => "[::1]",
        other => other,
    };
    format!("http://{}:{}/health", host, monitoring.http_port)
}

async fn query_agent(monitoring: &MonitoringConfig) -> Result<HealthResponse> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    let response = client
        .get(health_url(monitoring))
        .send()
        .await
        .context("health request failed")?
        .error_for_status()?;

    response
        .json::<HealthResponse>()
        .await
        .context("unexpected health response")
}
