//! Utility functions shared across the crate.

mod secret;

pub use secret::SecretString;

use std::fmt::Write;
use std::path::Path;

/// Number of random bytes behind a generated auth token
pub const AUTH_TOKEN_BYTES: usize = 32;

/// Generate a fresh authentication token.
///
/// Draws [`AUTH_TOKEN_BYTES`] bytes from the thread-local CSPRNG and renders
/// them as lowercase hex, giving a 64 character token.
pub fn rand_auth_token() -> String {
    let bytes: [u8; AUTH_TOKEN_BYTES] = rand::random();
    bytes
        .iter()
        .fold(String::with_capacity(AUTH_TOKEN_BYTES * 2), |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        })
}

/// Whether something exists at `path`.
///
/// An empty path never exists. Permission errors on the parent directory
/// count as "does not exist", since the file cannot be used either way.
pub fn file_exists(path: &str) -> bool {
    !path.is_empty() && Path::new(path).exists()
}
