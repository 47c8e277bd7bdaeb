//! Secret string type for passwords and tokens held in [`Settings`].
//!
//! [`Settings`]: crate::config::Settings

use serde::{Serialize, Serializer};
use std::fmt;

/// A wrapper for secrets that prevents accidental logging.
///
/// `Debug`, `Display` and `Serialize` all render `[REDACTED]`; callers that
/// need the value (for example when writing the settings file back out)
/// must go through [`SecretString::expose_secret`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret from any string-like value.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Explicitly expose the secret value.
    #[inline]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Serialize for SecretString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        // Best-effort clearing; copies made elsewhere are not covered.
        self.0.clear();
        self.0.shrink_to_fit();
    }
}
