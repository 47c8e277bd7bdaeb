//! Settings types for scheduler-settings
//!
//! Every recognized setting is described by a [`Key`] carrying both its
//! environment variable name and its INI key. Defaults live next to the
//! keys so both sources share them.

use crate::util::SecretString;
use serde::Serialize;

/// Name of the single INI section holding all settings
pub const DEFAULT_SECTION: &str = "default";

/// Environment toggle selecting environment mode
pub const ENV_CONFIG_TOGGLE: &str = "ENV_CONFIG";

/// Value of [`ENV_CONFIG_TOGGLE`] that enables environment mode
pub const ENV_CONFIG_OPEN: &str = "open";

pub const DEFAULT_DB_ENGINE: &str = "mysql";
pub const DEFAULT_DB_HOST: &str = "127.0.0.1";
pub const DEFAULT_DB_PORT: i64 = 3306;
pub const DEFAULT_DB_DATABASE: &str = "gocron";
pub const DEFAULT_DB_CHARSET: &str = "utf8";
pub const DEFAULT_DB_MAX_IDLE_CONNS: i64 = 30;
pub const DEFAULT_DB_MAX_OPEN_CONNS: i64 = 100;
pub const DEFAULT_APP_NAME: &str = "定时任务管理系统";
pub const DEFAULT_API_SIGN_ENABLE: bool = true;
pub const DEFAULT_CONCURRENCY_QUEUE: i64 = 500;
pub const DEFAULT_ENABLE_TLS: bool = false;

/// A recognized setting: where to find it in each source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    /// Environment variable name (environment mode)
    pub env: &'static str,
    /// Key inside the `default` INI section (file mode)
    pub ini: &'static str,
}

impl Key {
    const fn new(env: &'static str, ini: &'static str) -> Self {
        Self { env, ini }
    }
}

pub mod keys {
    use super::Key;

    pub const DB_ENGINE: Key = Key::new("DB_ENGINE", "db.engine");
    pub const DB_HOST: Key = Key::new("DB_HOST", "db.host");
    pub const DB_PORT: Key = Key::new("DB_PORT", "db.port");
    pub const DB_USER: Key = Key::new("DB_USER", "db.user");
    pub const DB_PASSWORD: Key = Key::new("DB_PASSWORD", "db.password");
    pub const DB_DATABASE: Key = Key::new("DB_DATABASE", "db.database");
    pub const DB_PREFIX: Key = Key::new("DB_PREFIX", "db.prefix");
    pub const DB_CHARSET: Key = Key::new("DB_CHARSET", "db.charset");
    pub const DB_MAX_IDLE_CONNS: Key = Key::new("DB_MAXIDLECONNS", "db.max.idle.conns");
    pub const DB_MAX_OPEN_CONNS: Key = Key::new("DB_MAXOPENCONNS", "db.max.open.conns");
    pub const ALLOW_IPS: Key = Key::new("ALLOW_IPS", "allow_ips");
    pub const APP_NAME: Key = Key::new("APP_NAME", "app.name");
    pub const API_KEY: Key = Key::new("API_KEY", "api.key");
    pub const API_SECRET: Key = Key::new("API_SECRET", "api.secret");
    pub const API_SIGN_ENABLE: Key = Key::new("API_SIGN_ENABLE", "api.sign.enable");
    pub const CONCURRENCY_QUEUE: Key = Key::new("CONCURRENCY_QUEUE", "concurrency.queue");
    pub const AUTH_SECRET: Key = Key::new("AUTH_SECRET", "auth_secret");
    pub const ENABLE_TLS: Key = Key::new("ENABLE_TLS", "enable_tls");
    pub const CA_FILE: Key = Key::new("CA_FILE", "ca_file");
    pub const CERT_FILE: Key = Key::new("CERT_FILE", "cert_file");
    pub const KEY_FILE: Key = Key::new("KEY_FILE", "key_file");

    /// All recognized settings, in the order they are written out
    pub const ALL: [Key; 21] = [
        DB_ENGINE,
        DB_HOST,
        DB_PORT,
        DB_USER,
        DB_PASSWORD,
        DB_DATABASE,
        DB_PREFIX,
        DB_CHARSET,
        DB_MAX_IDLE_CONNS,
        DB_MAX_OPEN_CONNS,
        ALLOW_IPS,
        APP_NAME,
        API_KEY,
        API_SECRET,
        API_SIGN_ENABLE,
        CONCURRENCY_QUEUE,
        AUTH_SECRET,
        ENABLE_TLS,
        CA_FILE,
        CERT_FILE,
        KEY_FILE,
    ];
}

/// Root settings record returned by the loader
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// Database connection settings
    pub db: DbSettings,

    /// Comma-separated client IPs allowed to call the service (empty = any)
    pub allow_ips: String,

    /// Display name of the application
    pub app_name: String,

    pub api_key: String,
    pub api_secret: SecretString,

    /// Whether API requests must carry a valid signature
    pub api_sign_enable: bool,

    /// Capacity of the task concurrency queue
    pub concurrency_queue: i64,

    /// Secret used to authenticate internal requests
    pub auth_secret: SecretString,

    /// TLS settings for node communication
    pub tls: TlsSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db: DbSettings::default(),
            allow_ips: String::new(),
            app_name: DEFAULT_APP_NAME.to_string(),
            api_key: String::new(),
            api_secret: SecretString::default(),
            api_sign_enable: DEFAULT_API_SIGN_ENABLE,
            concurrency_queue: DEFAULT_CONCURRENCY_QUEUE,
            auth_secret: SecretString::default(),
            tls: TlsSettings::default(),
        }
    }
}

impl Settings {
    /// Allowed client IPs as a list; empty means unrestricted
    pub fn allowed_ips(&self) -> Vec<&str> {
        self.allow_ips
            .split(',')
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .collect()
    }

    /// Render the record as alternating INI key/value entries.
    ///
    /// The output is accepted by [`write_settings`](crate::config::write_settings)
    /// and loads back into an equal record.
    pub fn to_pairs(&self) -> Vec<String> {
        let entries: [(Key, String); 21] = [
            (keys::DB_ENGINE, self.db.engine.clone()),
            (keys::DB_HOST, self.db.host.clone()),
            (keys::DB_PORT, self.db.port.to_string()),
            (keys::DB_USER, self.db.user.clone()),
            (keys::DB_PASSWORD, self.db.password.expose_secret().to_string()),
            (keys::DB_DATABASE, self.db.database.clone()),
            (keys::DB_PREFIX, self.db.prefix.clone()),
            (keys::DB_CHARSET, self.db.charset.clone()),
            (keys::DB_MAX_IDLE_CONNS, self.db.max_idle_conns.to_string()),
            (keys::DB_MAX_OPEN_CONNS, self.db.max_open_conns.to_string()),
            (keys::ALLOW_IPS, self.allow_ips.clone()),
            (keys::APP_NAME, self.app_name.clone()),
            (keys::API_KEY, self.api_key.clone()),
            (keys::API_SECRET, self.api_secret.expose_secret().to_string()),
            (keys::API_SIGN_ENABLE, self.api_sign_enable.to_string()),
            (keys::CONCURRENCY_QUEUE, self.concurrency_queue.to_string()),
            (keys::AUTH_SECRET, self.auth_secret.expose_secret().to_string()),
            (keys::ENABLE_TLS, self.tls.enabled.to_string()),
            (keys::CA_FILE, self.tls.ca_file.clone()),
            (keys::CERT_FILE, self.tls.cert_file.clone()),
            (keys::KEY_FILE, self.tls.key_file.clone()),
        ];

        entries
            .into_iter()
            .flat_map(|(key, value)| [key.ini.to_string(), value])
            .collect()
    }
}

/// Database connection settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DbSettings {
    pub engine: String,
    pub host: String,
    pub port: i64,
    pub user: String,
    pub password: SecretString,
    pub database: String,
    /// Prefix prepended to every table name
    pub prefix: String,
    pub charset: String,
    pub max_idle_conns: i64,
    pub max_open_conns: i64,
}

impl Default for DbSettings {
    fn default() -> Self {
        Self {
            engine: DEFAULT_DB_ENGINE.to_string(),
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            user: String::new(),
            password: SecretString::default(),
            database: DEFAULT_DB_DATABASE.to_string(),
            prefix: String::new(),
            charset: DEFAULT_DB_CHARSET.to_string(),
            max_idle_conns: DEFAULT_DB_MAX_IDLE_CONNS,
            max_open_conns: DEFAULT_DB_MAX_OPEN_CONNS,
        }
    }
}

/// TLS material for node communication
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TlsSettings {
    pub enabled: bool,
    pub ca_file: String,
    pub cert_file: String,
    pub key_file: String,
}
