//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a warning to stderr.
pub fn warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Render an error chain as one line.
///
/// API errors are shown with their user-facing message; any context added
/// by the command is kept as a prefix.
pub fn describe(err: &anyhow::Error) -> String {
    let mut causes = err.chain();
    if let Some(api_error) = causes
        .next()
        .and_then(|cause| cause.downcast_ref::<pillbox_core::Error>())
    {
        return api_error.user_message();
    }

    match causes.find_map(|cause| cause.downcast_ref::<pillbox_core::Error>()) {
        Some(api_error) => format!("{}: {}", err, api_error.user_message()),
        None => format!("{:#}", err),
    }
}
