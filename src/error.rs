//! Error types for scheduler-settings
//!
//! Loading and writing share one error enum. Most problems never surface
//! here at all: a missing or malformed value falls back to its default.
//! What remains is an unreadable source, bad writer input, I/O failures,
//! and the fatal case of missing TLS material.

use std::fmt;
use thiserror::Error;

/// Which piece of TLS material a [`ConfigError::MissingTlsFile`] refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsFileKind {
    CaCert,
    ClientCert,
    ClientKey,
}

impl TlsFileKind {
    /// Human-readable description used in fatal log messages
    pub fn describe(self) -> &'static str {
        match self {
            TlsFileKind::CaCert => "ca cert",
            TlsFileKind::ClientCert => "client cert",
            TlsFileKind::ClientKey => "client key",
        }
    }
}

impl fmt::Display for TlsFileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Settings-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid settings: {0}")]
    Validation(String),

    #[error("failed to read {kind} file: {path}")]
    MissingTlsFile { kind: TlsFileKind, path: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Whether startup must stop rather than continue with this error
    pub fn is_fatal(&self) -> bool {
        matches!(self, ConfigError::MissingTlsFile { .. })
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Load(err.to_string())
    }
}

/// Result type alias for settings operations
pub type Result<T> = std::result::Result<T, ConfigError>;
