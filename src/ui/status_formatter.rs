use colored::*;
use std::fmt::Write;

use crate::core::thermal::{DispatchOutcome, PipelineOutcome, Snapshot, StatusReport};

fn yes_no(value: bool) -> ColoredString {
    if value {
        "yes".yellow()
    } else {
        "no".green()
    }
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", title.bold().green());
    let _ = writeln!(out, "{}", "-".repeat(title.len()));
}

/// Render the agent status report.
pub fn format_status(report: &StatusReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", "THERMAL HUB STATUS".bold().bright_cyan());
    let _ = writeln!(out, "{}", "=".repeat(60));

    let running = if report.running {
        "running".green().bold()
    } else {
        "stopped".red().bold()
    };
    let sink = if report.sink_connected {
        "connected".green()
    } else {
        "unreachable".red()
    };
    let _ = writeln!(out, "  Agent: {}", running);
    let _ = writeln!(out, "  Sink: {}", sink);
    if let Some(path) = &report.config_path {
        let _ = writeln!(out, "  Config: {}", path.display().to_string().dimmed());
    }

    section(&mut out, "Hysteresis");
    let _ = writeln!(out, "  Fans active: {}", yes_no(report.hysteresis.fan_active));
    let _ = writeln!(out, "  Throttling: {}", yes_no(report.hysteresis.throttling));
    let _ = writeln!(out, "  High load: {}", yes_no(report.hysteresis.high_load));

    section(&mut out, "Rate limits");
    if report.rate_limits.is_empty() {
        let _ = writeln!(out, "  {}", "No notifications sent yet".dimmed());
    }
    for bucket in &report.rate_limits {
        let next = if bucket.in_flight {
            "sending".cyan()
        } else if bucket.can_send {
            "ready".green()
        } else {
            format!("next in {}s", bucket.seconds_until_next).yellow()
        };
        let _ = writeln!(
            out,
            "  {:<22} {:<9} last {}s ago, {}",
            bucket.notification_type.as_str(),
            bucket.priority.as_str(),
            bucket.seconds_since_last,
            next
        );
    }

    out
}

/// One-line summary of a snapshot
pub fn format_snapshot(snapshot: &Snapshot) -> String {
    format!(
        "Socket={}°C CPU={}°C Fans={} ({}) Freq={}MHz Load={:.2}",
        snapshot.socket_temp,
        snapshot.cpu_temp,
        snapshot.fan_active,
        if snapshot.fan_states.is_empty() {
            "-"
        } else {
            &snapshot.fan_states
        },
        snapshot.cpu_freq,
        snapshot.load_avg
    )
}

/// Render what the pipeline did with a snapshot.
pub fn format_outcome(outcome: &PipelineOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  Sensors published: {}/6", outcome.sensors_published);

    if outcome.alerts.is_empty() {
        let _ = writeln!(out, "  {}", "No alerts".dimmed());
    }
    for (alert, result) in &outcome.alerts {
        let result = match result {
            DispatchOutcome::Sent => result.to_string().green(),
            DispatchOutcome::Failed(_) => result.to_string().red(),
            _ => result.to_string().yellow(),
        };
        let _ = writeln!(
            out,
            "  [{}] {}: {}",
            alert.priority.as_str(),
            alert.title,
            result
        );
    }

    out
}
