//! Scheduler settings
//!
//! Runtime settings for a cron scheduling service, read once at startup.
//!
//! ## Sources
//!
//! Exactly one source is used per load:
//!
//! - **Environment mode** (`ENV_CONFIG=open`): every setting comes from its
//!   environment variable (`DB_HOST`, `AUTH_SECRET`, ...).
//! - **File mode** (anything else): settings come from the `default`
//!   section of an INI file.
//!
//! ## Example Configuration
//!
//! ```ini
//! [default]
//! db.engine = mysql
//! db.host = 127.0.0.1
//! db.port = 3306
//! db.max.idle.conns = 30
//! api.sign.enable = true
//! concurrency.queue = 500
//! enable_tls = false
//! ```
//!
//! A missing `auth_secret` is replaced by a random token for the life of
//! the process. With `enable_tls = true`, missing CA, certificate or key
//! files stop startup.

pub mod config;
pub mod env;
pub mod error;
pub mod util;

// Re-export main types
pub use crate::config::{Settings, SettingsLoader, load_settings, write_settings};
pub use env::Env;
pub use error::{ConfigError, Result};
