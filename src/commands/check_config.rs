use anyhow::Result;
use clap::ArgMatches;
use colored::Colorize;

use crate::core::thermal::NotificationType;
use crate::ui;

/// Validate the configuration file and print the effective settings.
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let loaded = super::prepare(matches)?;
    let config = &loaded.config;

    ui::success(&format!("✓ Configuration is valid: {}", loaded.path.display()));

    println!("\n{}", "Sink".bold());
    println!("  URL: {}", config.homeassistant.url);
    println!("  Notify service: {}", config.homeassistant.notify_service);
    println!("  Timeout: {}s", config.homeassistant.timeout);

    let t = &config.thresholds;
    println!("\n{}", "Thresholds".bold());
    println!("  CPU: warning {}°C, critical {}°C", t.cpu_temp.warning, t.cpu_temp.critical);
    println!(
        "  Socket: warning {}°C, critical {}°C",
        t.socket_temp.warning, t.socket_temp.critical
    );
    println!("  Throttling below: {} MHz", t.cpu_freq.throttling_threshold);
    println!("  Load: high {} / normal {}", t.load_avg.high, t.load_avg.normal);

    let m = &config.monitoring;
    println!("\n{}", "Ingestion".bold());
    if m.enable_file_monitor {
        println!("  File: {} every {}s", m.data_file.display(), m.interval);
    } else {
        ui::dimmed("  File monitor disabled");
    }
    if m.enable_http_server {
        println!("  HTTP: {}:{}", m.bind_address, m.http_port);
    } else {
        ui::dimmed("  HTTP listener disabled");
    }

    let n = &config.notifications;
    println!("\n{}", "Notifications".bold());
    println!(
        "  Rate limits: critical {}s, high {}s, normal {}s",
        n.rate_limit.critical, n.rate_limit.high, n.rate_limit.normal
    );
    let mut enabled: Vec<NotificationType> = n.enabled_types.iter().copied().collect();
    enabled.sort();
    let names: Vec<&str> = enabled.iter().map(|t| t.as_str()).collect();
    println!("  Enabled: {}", names.join(", "));

    Ok(())
}
