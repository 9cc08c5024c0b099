// Console message helpers

use colored::Colorize;

/// Display a warning message
pub fn warn(message: &str) {
    println!("{}", format!("⚠️  Warning: {}", message).yellow().bold());
}

/// Display an info message
pub fn info(message: &str) {
    println!("{}", message.cyan());
}

/// Display a success message
pub fn success(message: &str) {
    println!("{}", message.green().bold());
}

/// Display an error message on stderr
pub fn error(message: &str) {
    eprintln!("{}", message.red().bold());
}

pub fn dimmed(message: &str) {
    println!("{}", message.dimmed());
}
