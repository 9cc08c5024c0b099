// Thermal Hub Library - Public API

// Re-export error types
pub mod error;
pub use error::{HubError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod integrations;
pub mod platform;
pub mod ui;

// Re-export commonly used types
pub use crate::core::config::Config;

use file_rotate::compression::Compression;
use file_rotate::suffix::AppendCount;
use file_rotate::{ContentLimit, FileRotate};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::core::config::LoggingConfig;

type LogWriter = Box<dyn Write + Send>;

/// Copies log output to stderr and a file
struct Tee {
    file: LogWriter,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// Open the log file, rolling it to `<file>.1 .. <file>.N` once it reaches
/// `max_bytes`. A zero `backup_count` appends without rotating.
fn open_log_file(path: &Path, max_bytes: u64, backup_count: usize) -> Result<LogWriter> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    if backup_count == 0 {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        return Ok(Box::new(file));
    }

    Ok(Box::new(FileRotate::new(
        path,
        AppendCount::new(backup_count),
        ContentLimit::Bytes(max_bytes as usize),
        Compression::None,
        #[cfg(unix)]
        None,
    )))
}

// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = config
        .level
        .parse::<log::LevelFilter>()
        .unwrap_or(log::LevelFilter::Info);

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();

    match (&config.file, config.console) {
        (Some(path), console) => {
            let file = open_log_file(path, config.max_bytes()?, config.backup_count)?;
            let target: LogWriter = if console {
                Box::new(Tee { file })
            } else {
                file
            };
            builder.target(env_logger::Target::Pipe(target));
        }
        (None, true) => {
            builder.target(env_logger::Target::Stderr);
        }
        (None, false) => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }

    builder
        .try_init()
        .map_err(|e| HubError::other(format!("Logger already initialized: {}", e)))
}
