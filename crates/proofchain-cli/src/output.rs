//! Output formatting utilities

use anyhow::Result;
use serde::Serialize;

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(data: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Print a success message on stderr, keeping stdout for JSON
pub fn print_success(message: &str) {
    eprintln!("✓ {}", message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("⚠ {}", message);
}
