//! Settings writer
//!
//! Persists alternating key/value entries into the `default` section of a
//! fresh INI document, replacing whatever was at the destination.

use crate::config::types::DEFAULT_SECTION;
use crate::error::{ConfigError, Result};
use ini::{EscapePolicy, Ini, WriteOption};
use std::path::Path;
use tracing::info;

/// Write `pairs` (`[key1, value1, key2, value2, ...]`) to `path`.
///
/// Fails without touching the filesystem when `pairs` is empty, has an odd
/// length, or holds a key the INI format cannot represent. A repeated key
/// keeps its last value. Values load back unchanged.
pub fn write_settings<S: AsRef<str>>(pairs: &[S], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    if pairs.is_empty() {
        return Err(ConfigError::Validation(
            "settings must not be empty".to_string(),
        ));
    }
    if pairs.len() % 2 != 0 {
        return Err(ConfigError::Validation(format!(
            "settings keys and values do not match: got {} entries",
            pairs.len()
        )));
    }

    let mut document = Ini::new();
    for pair in pairs.chunks_exact(2) {
        let key = pair[0].as_ref();
        validate_key(key)?;
        document.set_to(
            Some(DEFAULT_SECTION),
            key.to_string(),
            quote_value(pair[1].as_ref())?,
        );
    }

    // Reserved escapes `;` and `#` so they are not read back as comments
    let options = WriteOption {
        escape_policy: EscapePolicy::Reserved,
        ..Default::default()
    };
    document.write_to_file_opt(path, options)?;

    info!(path = %path.display(), entries = pairs.len() / 2, "Settings written");
    Ok(())
}

fn validate_key(key: &str) -> Result<()> {
    let invalid = key.is_empty()
        || key.trim() != key
        || key.contains(['=', ':', '\n', '\r'])
        || key.starts_with(['[', ';', '#']);

    if invalid {
        return Err(ConfigError::Validation(format!(
            "invalid settings key: {key:?}"
        )));
    }
    Ok(())
}

// Values the parser would trim or unquote are wrapped in quotes.
fn quote_value(value: &str) -> Result<String> {
    let needs_quotes = value.starts_with(char::is_whitespace)
        || value.ends_with(char::is_whitespace)
        || value.starts_with(['"', '\'']);

    if !needs_quotes {
        return Ok(value.to_string());
    }
    if !value.contains('"') {
        return Ok(format!("\"{value}\""));
    }
    if !value.contains('\'') {
        return Ok(format!("'{value}'"));
    }
    Err(ConfigError::Validation(format!(
        "settings value {value:?} cannot be quoted"
    )))
}
