//! Settings loader
//!
//! Exactly one source is consulted per load:
//! 1. Environment variables, when `ENV_CONFIG=open`
//! 2. Otherwise the `default` section of an INI file
//!
//! Values missing from the chosen source fall back to their defaults. There
//! is no merging between the two sources.

use crate::config::parse::{parse_env_bool, parse_env_int, parse_ini_bool, parse_ini_int};
use crate::config::types::{
    DEFAULT_API_SIGN_ENABLE, DEFAULT_APP_NAME, DEFAULT_CONCURRENCY_QUEUE, DEFAULT_DB_CHARSET,
    DEFAULT_DB_DATABASE, DEFAULT_DB_ENGINE, DEFAULT_DB_HOST, DEFAULT_DB_MAX_IDLE_CONNS,
    DEFAULT_DB_MAX_OPEN_CONNS, DEFAULT_DB_PORT, DEFAULT_ENABLE_TLS, DEFAULT_SECTION, DbSettings,
    ENV_CONFIG_OPEN, ENV_CONFIG_TOGGLE, Key, Settings, TlsSettings, keys,
};
use crate::config::validation::{
    ExitOnFatal, FatalHandler, FileCheck, StdFileCheck, validate_tls,
};
use crate::env::Env;
use crate::error::{ConfigError, Result};
use crate::util::{SecretString, rand_auth_token};
use config::{Config, File, FileFormat};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Where a load reads its values from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    Environment,
    File,
}

/// Load settings from the real environment or the INI file at `path`.
///
/// Missing TLS files terminate the process.
pub fn load_settings(path: &str) -> Result<Settings> {
    SettingsLoader::new().load(path)
}

/// Settings loader with injectable environment, filesystem check and fatal
/// handler
pub struct SettingsLoader {
    env: Env,
    file_check: Box<dyn FileCheck>,
    fatal: Box<dyn FatalHandler>,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsLoader {
    /// Loader backed by the process environment and the real filesystem
    pub fn new() -> Self {
        Self {
            env: Env::real(),
            file_check: Box::new(StdFileCheck),
            fatal: Box::new(ExitOnFatal),
        }
    }

    pub fn with_env(mut self, env: Env) -> Self {
        self.env = env;
        self
    }

    pub fn with_file_check(mut self, check: impl FileCheck + 'static) -> Self {
        self.file_check = Box::new(check);
        self
    }

    pub fn with_fatal_handler(mut self, handler: impl FatalHandler + 'static) -> Self {
        self.fatal = Box::new(handler);
        self
    }

    /// Which source the next load will use
    pub fn mode(&self) -> SourceMode {
        if self.env.var_or(ENV_CONFIG_TOGGLE, "off") == ENV_CONFIG_OPEN {
            SourceMode::Environment
        } else {
            SourceMode::File
        }
    }

    /// Load settings. `path` is ignored in environment mode.
    pub fn load(&self, path: &str) -> Result<Settings> {
        let mode = self.mode();
        let mut settings = match mode {
            SourceMode::Environment => {
                debug!("Reading settings from environment");
                read_settings(&EnvSource { env: &self.env })
            }
            SourceMode::File => {
                debug!(path, "Reading settings from file");
                read_settings(&IniSection::load(path)?)
            }
        };

        if settings.auth_secret.is_empty() {
            warn!("No auth secret configured, using a generated one for this process");
            settings.auth_secret = SecretString::new(rand_auth_token());
        }

        if let Err(err) = validate_tls(&settings.tls, self.file_check.as_ref()) {
            if err.is_fatal() {
                self.fatal.fatal(&err);
            }
            return Err(err);
        }

        info!(
            ?mode,
            db_engine = %settings.db.engine,
            tls = settings.tls.enabled,
            "Settings loaded"
        );
        Ok(settings)
    }
}

/// Typed lookup into one settings source
trait SettingSource {
    fn string(&self, key: Key, default: &str) -> String;
    fn int(&self, key: Key, default: i64) -> i64;
    fn boolean(&self, key: Key, default: bool) -> bool;

    fn secret(&self, key: Key) -> SecretString {
        SecretString::new(self.string(key, ""))
    }
}

fn read_settings(source: &dyn SettingSource) -> Settings {
    Settings {
        db: DbSettings {
            engine: source.string(keys::DB_ENGINE, DEFAULT_DB_ENGINE),
            host: source.string(keys::DB_HOST, DEFAULT_DB_HOST),
            port: source.int(keys::DB_PORT, DEFAULT_DB_PORT),
            user: source.string(keys::DB_USER, ""),
            password: source.secret(keys::DB_PASSWORD),
            database: source.string(keys::DB_DATABASE, DEFAULT_DB_DATABASE),
            prefix: source.string(keys::DB_PREFIX, ""),
            charset: source.string(keys::DB_CHARSET, DEFAULT_DB_CHARSET),
            max_idle_conns: source.int(keys::DB_MAX_IDLE_CONNS, DEFAULT_DB_MAX_IDLE_CONNS),
            max_open_conns: source.int(keys::DB_MAX_OPEN_CONNS, DEFAULT_DB_MAX_OPEN_CONNS),
        },
        allow_ips: source.string(keys::ALLOW_IPS, ""),
        app_name: source.string(keys::APP_NAME, DEFAULT_APP_NAME),
        api_key: source.string(keys::API_KEY, ""),
        api_secret: source.secret(keys::API_SECRET),
        api_sign_enable: source.boolean(keys::API_SIGN_ENABLE, DEFAULT_API_SIGN_ENABLE),
        concurrency_queue: source.int(keys::CONCURRENCY_QUEUE, DEFAULT_CONCURRENCY_QUEUE),
        auth_secret: source.secret(keys::AUTH_SECRET),
        tls: TlsSettings {
            enabled: source.boolean(keys::ENABLE_TLS, DEFAULT_ENABLE_TLS),
            ca_file: source.string(keys::CA_FILE, ""),
            cert_file: source.string(keys::CERT_FILE, ""),
            key_file: source.string(keys::KEY_FILE, ""),
        },
    }
}

/// Environment variables. Unparseable numbers and booleans become the
/// type's zero value, not the documented default.
struct EnvSource<'a> {
    env: &'a Env,
}

impl SettingSource for EnvSource<'_> {
    fn string(&self, key: Key, default: &str) -> String {
        self.env.var_or(key.env, default)
    }

    fn int(&self, key: Key, default: i64) -> i64 {
        let raw = self.env.var_or(key.env, &default.to_string());
        parse_env_int(&raw).unwrap_or_else(|| {
            debug!(var = key.env, value = %raw, "Not an integer, using 0");
            0
        })
    }

    fn boolean(&self, key: Key, default: bool) -> bool {
        let raw = self.env.var_or(key.env, &default.to_string());
        parse_env_bool(&raw).unwrap_or_else(|| {
            debug!(var = key.env, value = %raw, "Not a boolean, using false");
            false
        })
    }
}

/// The `default` section of an INI file
struct IniSection {
    values: HashMap<String, String>,
}

impl IniSection {
    fn load(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path);

        // The config crate would otherwise fall back to `<path>.ini`
        if !Path::new(expanded.as_ref()).is_file() {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }

        let config = Config::builder()
            .add_source(File::new(&expanded, FileFormat::Ini).required(true))
            .build()?;

        // A file without a [default] section simply yields all defaults
        let values = match config.get_table(DEFAULT_SECTION) {
            Ok(table) => table
                .into_iter()
                .filter_map(|(key, value)| value.into_string().ok().map(|v| (key, v)))
                .collect(),
            Err(config::ConfigError::NotFound(_)) => HashMap::new(),
            Err(e) => return Err(ConfigError::Load(e.to_string())),
        };

        Ok(Self { values })
    }

    fn raw(&self, key: Key) -> Option<&str> {
        self.values
            .get(key.ini)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

impl SettingSource for IniSection {
    fn string(&self, key: Key, default: &str) -> String {
        self.raw(key).unwrap_or(default).to_string()
    }

    fn int(&self, key: Key, default: i64) -> i64 {
        self.raw(key).and_then(parse_ini_int).unwrap_or(default)
    }

    fn boolean(&self, key: Key, default: bool) -> bool {
        self.raw(key).and_then(parse_ini_bool).unwrap_or(default)
    }
}
