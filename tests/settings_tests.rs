//! Settings loading and writing tests

use rstest::rstest;
use scheduler_settings::config::{SettingsLoader, SourceMode, keys, write_settings};
use scheduler_settings::error::TlsFileKind;
use scheduler_settings::{ConfigError, Env, Settings};
use std::cell::RefCell;
use std::fs;
use std::rc::Rc;
use tempfile::tempdir;

fn no_env() -> Env {
    Env::from_vars(Vec::<(&str, &str)>::new())
}

fn env_with(vars: &[(&str, &str)]) -> Env {
    let mut all = vec![("ENV_CONFIG".to_string(), "open".to_string())];
    all.extend(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())));
    Env::from_vars(all)
}

/// Render the recognized field matching `ini_key` as it would be written out
fn field(settings: &Settings, ini_key: &str) -> String {
    let pairs = settings.to_pairs();
    let idx = pairs
        .iter()
        .step_by(2)
        .position(|k| k == ini_key)
        .expect("recognized key");
    pairs[idx * 2 + 1].clone()
}

#[rstest]
#[case("db.engine", "mysql")]
#[case("db.host", "127.0.0.1")]
#[case("db.port", "3306")]
#[case("db.user", "")]
#[case("db.password", "")]
#[case("db.database", "gocron")]
#[case("db.prefix", "")]
#[case("db.charset", "utf8")]
#[case("db.max.idle.conns", "30")]
#[case("db.max.open.conns", "100")]
#[case("allow_ips", "")]
#[case("app.name", "定时任务管理系统")]
#[case("api.key", "")]
#[case("api.secret", "")]
#[case("api.sign.enable", "true")]
#[case("concurrency.queue", "500")]
#[case("enable_tls", "false")]
#[case("ca_file", "")]
#[case("cert_file", "")]
#[case("key_file", "")]
fn test_defaults_in_both_modes(#[case] ini_key: &str, #[case] expected: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.ini");
    fs::write(&path, "[default]\n").unwrap();

    let from_file = SettingsLoader::new()
        .with_env(no_env())
        .load(path.to_str().unwrap())
        .unwrap();
    let from_env = SettingsLoader::new()
        .with_env(env_with(&[]))
        .load("unused.ini")
        .unwrap();

    assert_eq!(field(&from_file, ini_key), expected);
    assert_eq!(field(&from_env, ini_key), expected);
}

#[rstest]
#[case("DB_PORT", "db.port", "3307", "3307")]
#[case("DB_PORT", "db.port", "port", "0")]
#[case("DB_MAXIDLECONNS", "db.max.idle.conns", "-3", "-3")]
#[case("DB_MAXOPENCONNS", "db.max.open.conns", "1e3", "0")]
#[case("CONCURRENCY_QUEUE", "concurrency.queue", "+8", "8")]
#[case("CONCURRENCY_QUEUE", "concurrency.queue", "8.5", "0")]
#[case("API_SIGN_ENABLE", "api.sign.enable", "F", "false")]
#[case("API_SIGN_ENABLE", "api.sign.enable", "nope", "false")]
#[case("ENABLE_TLS", "enable_tls", "maybe", "false")]
fn test_env_typed_values(
    #[case] var: &str,
    #[case] ini_key: &str,
    #[case] raw: &str,
    #[case] expected: &str,
) {
    let settings = SettingsLoader::new()
        .with_env(env_with(&[(var, raw)]))
        .load("unused.ini")
        .unwrap();
    assert_eq!(field(&settings, ini_key), expected);
}

#[rstest]
#[case("db.port", "3307", "3307")]
#[case("db.port", "port", "3306")]
#[case("db.max.idle.conns", "0o10", "8")]
#[case("concurrency.queue", "8.5", "500")]
#[case("api.sign.enable", "no", "false")]
#[case("api.sign.enable", "nope", "true")]
#[case("enable_tls", "off", "false")]
#[case("db.port", "3307 # mysql", "3307")]
#[case("db.engine", "pg ; comment", "pg")]
fn test_file_typed_values(#[case] ini_key: &str, #[case] raw: &str, #[case] expected: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.ini");
    fs::write(&path, format!("[default]\n{ini_key} = {raw}\n")).unwrap();

    let settings = SettingsLoader::new()
        .with_env(no_env())
        .load(path.to_str().unwrap())
        .unwrap();
    assert_eq!(field(&settings, ini_key), expected);
}

#[test]
fn test_generated_auth_secret_differs_across_loads() {
    let loader = SettingsLoader::new().with_env(env_with(&[]));
    let first = loader.load("unused.ini").unwrap();
    let second = loader.load("unused.ini").unwrap();

    assert!(!first.auth_secret.is_empty());
    assert!(!second.auth_secret.is_empty());
    assert_ne!(first.auth_secret, second.auth_secret);
}

#[test]
fn test_generated_auth_secret_not_written_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.ini");
    write_settings(&["db.host", "db.internal"], &path).unwrap();
    let before = fs::read_to_string(&path).unwrap();

    let settings = SettingsLoader::new()
        .with_env(no_env())
        .load(path.to_str().unwrap())
        .unwrap();

    assert!(!settings.auth_secret.is_empty());
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_env_mode_ignores_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.ini");
    fs::write(&path, "[default]\ndb.host = from-file\ndb.port = 1111\n").unwrap();

    let loader = SettingsLoader::new().with_env(env_with(&[("DB_HOST", "from-env")]));
    assert_eq!(loader.mode(), SourceMode::Environment);

    let settings = loader.load(path.to_str().unwrap()).unwrap();
    assert_eq!(settings.db.host, "from-env");
    assert_eq!(settings.db.port, 3306);

    // A missing file does not matter either
    assert!(loader.load("/nonexistent/app.ini").is_ok());
}

#[test]
fn test_file_mode_ignores_environment() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.ini");
    fs::write(&path, "[default]\ndb.host = from-file\n").unwrap();

    let env = Env::from_vars([("ENV_CONFIG", "off"), ("DB_HOST", "from-env")]);
    let settings = SettingsLoader::new()
        .with_env(env)
        .load(path.to_str().unwrap())
        .unwrap();
    assert_eq!(settings.db.host, "from-file");
}

#[test]
fn test_malformed_file_is_load_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.ini");
    fs::write(&path, "[default\ndb.host = x\n").unwrap();

    let result = SettingsLoader::new()
        .with_env(no_env())
        .load(path.to_str().unwrap());
    assert!(matches!(result, Err(ConfigError::Load(_))));
}

#[test]
fn test_missing_file_with_ini_sibling_is_load_error() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("conf.ini"), "[default]\ndb.host = sibling\n").unwrap();

    let result = SettingsLoader::new()
        .with_env(no_env())
        .load(dir.path().join("conf").to_str().unwrap());
    assert!(matches!(result, Err(ConfigError::Load(_))));
}

#[test]
fn test_write_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.ini");

    write_settings(
        &[
            "db.engine", "postgres",
            "db.port", "5432",
            "db.password", "  padded  ",
            "db.host", "\"quoted\"",
            "db.user", "ops # night shift",
            "db.prefix", "a;b",
            "app.name", "nightly jobs",
            "api.sign.enable", "false",
            "auth_secret", "persisted",
        ],
        &path,
    )
    .unwrap();

    let settings = SettingsLoader::new()
        .with_env(no_env())
        .load(path.to_str().unwrap())
        .unwrap();

    assert_eq!(settings.db.engine, "postgres");
    assert_eq!(settings.db.port, 5432);
    assert_eq!(settings.db.password.expose_secret(), "  padded  ");
    assert_eq!(settings.db.host, "\"quoted\"");
    assert_eq!(settings.db.user, "ops # night shift");
    assert_eq!(settings.db.prefix, "a;b");
    assert_eq!(settings.app_name, "nightly jobs");
    assert!(!settings.api_sign_enable);
    assert_eq!(settings.auth_secret.expose_secret(), "persisted");
}

#[test]
fn test_to_pairs_round_trips_full_record() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.ini");

    let mut expected = Settings::default();
    expected.db.user = "scheduler".into();
    expected.db.prefix = "cron_".into();
    expected.allow_ips = "10.0.0.1,10.0.0.2".into();
    expected.concurrency_queue = 42;
    expected.auth_secret = scheduler_settings::util::SecretString::new("abc123");

    write_settings(&expected.to_pairs(), &path).unwrap();

    let loaded = SettingsLoader::new()
        .with_env(no_env())
        .load(path.to_str().unwrap())
        .unwrap();
    assert_eq!(loaded, expected);
}

#[test]
fn test_writer_validation_creates_no_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.ini");

    let empty: Vec<String> = Vec::new();
    assert!(matches!(
        write_settings(&empty, &path),
        Err(ConfigError::Validation(_))
    ));
    assert!(matches!(
        write_settings(&["a", "1", "b"], &path),
        Err(ConfigError::Validation(_))
    ));
    assert!(!path.exists());
}

#[rstest]
#[case("")]
#[case("a=b")]
#[case("db.host:port")]
fn test_writer_rejects_unrepresentable_keys(#[case] key: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.ini");

    let result = write_settings(&[key, "value"], &path);
    assert!(matches!(result, Err(ConfigError::Validation(_))));
    assert!(!path.exists());
}

#[test]
fn test_tls_with_real_files() {
    let dir = tempdir().unwrap();
    let ca = dir.path().join("ca.pem");
    let cert = dir.path().join("cert.pem");
    let key = dir.path().join("key.pem");
    fs::write(&ca, "ca").unwrap();
    fs::write(&cert, "cert").unwrap();

    let fatal: Rc<RefCell<Vec<String>>> = Rc::default();
    let sink = Rc::clone(&fatal);
    let loader = SettingsLoader::new()
        .with_env(env_with(&[
            ("ENABLE_TLS", "true"),
            ("CA_FILE", ca.to_str().unwrap()),
            ("CERT_FILE", cert.to_str().unwrap()),
            ("KEY_FILE", key.to_str().unwrap()),
        ]))
        .with_fatal_handler(move |err: &ConfigError| sink.borrow_mut().push(err.to_string()));

    let result = loader.load("unused.ini");
    assert!(matches!(
        result,
        Err(ConfigError::MissingTlsFile {
            kind: TlsFileKind::ClientKey,
            ..
        })
    ));
    assert_eq!(fatal.borrow().len(), 1);
    assert!(fatal.borrow()[0].starts_with("failed to read client key file:"));

    fs::write(&key, "key").unwrap();
    let settings = loader.load("unused.ini").unwrap();
    assert!(settings.tls.enabled);
    assert_eq!(fatal.borrow().len(), 1);
}

#[test]
fn test_tls_enabled_with_empty_paths_is_fatal() {
    let result = SettingsLoader::new()
        .with_env(env_with(&[("ENABLE_TLS", "true")]))
        .with_fatal_handler(|_: &ConfigError| {})
        .load("unused.ini");

    match result {
        Err(err @ ConfigError::MissingTlsFile { .. }) => {
            assert!(err.is_fatal());
            assert_eq!(err.to_string(), "failed to read ca cert file: ");
        }
        other => panic!("expected missing CA file, got {other:?}"),
    }
}

#[test]
#[serial_test::serial]
fn test_load_settings_reads_process_environment() {
    use scheduler_settings::load_settings;
    use std::env;

    unsafe {
        env::set_var("ENV_CONFIG", "open");
        env::set_var("DB_HOST", "db.from.process");
        env::set_var("AUTH_SECRET", "process-secret");
        env::remove_var("ENABLE_TLS");
    }

    let settings = load_settings("/nonexistent/app.ini").unwrap();
    assert_eq!(settings.db.host, "db.from.process");
    assert_eq!(settings.auth_secret.expose_secret(), "process-secret");

    // Cleanup
    unsafe {
        env::remove_var("ENV_CONFIG");
        env::remove_var("DB_HOST");
        env::remove_var("AUTH_SECRET");
    }
}

#[test]
fn test_every_key_has_distinct_names() {
    let mut env_names: Vec<&str> = keys::ALL.iter().map(|k| k.env).collect();
    let mut ini_names: Vec<&str> = keys::ALL.iter().map(|k| k.ini).collect();
    env_names.sort_unstable();
    env_names.dedup();
    ini_names.sort_unstable();
    ini_names.dedup();
    assert_eq!(env_names.len(), keys::ALL.len());
    assert_eq!(ini_names.len(), keys::ALL.len());
}
