use anyhow::Result;
use clap::{Arg, ArgMatches, Command};

// Use modules from the library
use thermal_hub::commands;
use thermal_hub::ui;

fn cli() -> Command {
    Command::new("thermal-hub")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Thermal monitoring agent that turns hardware telemetry into alerts and sensor updates")
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .short('v')
                .short_alias('V')
                .long("version")
                .help("Print version information")
                .action(clap::ArgAction::SetTrue)
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Configuration file (defaults to <config dir>/thermal-hub/config.json)")
                .global(true)
        )
        .subcommand(
            Command::new("run")
                .about("Run the monitoring agent (default)")
        )
        .subcommand(
            Command::new("check-config")
                .about("Validate the configuration file and print the effective settings")
        )
        .subcommand(
            Command::new("status")
                .about("Show hysteresis, rate-limit and sink status")
        )
        .subcommand(
            Command::new("test")
                .about("Read the local sensors once and run the snapshot through the pipeline")
        )
        .subcommand(
            Command::new("test-notify")
                .about("Send one test notification per priority")
        )
        .subcommand(
            Command::new("version")
                .about("Shows version information")
        )
}

fn dispatch(matches: &ArgMatches) -> Result<()> {
    if matches.get_flag("version") {
        return commands::version();
    }

    match matches.subcommand() {
        Some(("run", sub_matches)) => commands::run::execute(sub_matches),
        Some(("check-config", sub_matches)) => commands::check_config::execute(sub_matches),
        Some(("status", sub_matches)) => commands::status::execute(sub_matches),
        Some(("test", sub_matches)) => commands::test_mode::execute(sub_matches),
        Some(("test-notify", sub_matches)) => commands::test_notify::execute(sub_matches),
        Some(("version", _)) => commands::version(),
        _ => commands::run::execute(matches),
    }
}

fn main() {
    let matches = cli().get_matches();

    if let Err(e) = dispatch(&matches) {
        ui::error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }
}
