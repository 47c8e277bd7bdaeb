//! Settings module
//!
//! Loads the scheduler settings from environment variables or an INI file,
//! and writes key/value pairs back to an INI file.

pub mod loader;
pub mod parse;
pub mod types;
pub mod validation;
pub mod writer;

pub use loader::{SettingsLoader, SourceMode, load_settings};
pub use types::*;
pub use validation::{ExitOnFatal, FatalHandler, FileCheck, StdFileCheck, validate_tls};
pub use writer::write_settings;
