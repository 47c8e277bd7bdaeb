//! TLS material validation and the fatal-error seam.
//!
//! Missing TLS files cannot be papered over with a default: the loader
//! reports them through a [`FatalHandler`], which in production logs the
//! problem and terminates the process.

use crate::config::types::TlsSettings;
use crate::error::{ConfigError, Result, TlsFileKind};
use crate::util::file_exists;
use tracing::{debug, error};

/// Exit status used when startup is aborted by a fatal settings error
pub const FATAL_EXIT_CODE: i32 = 1;

/// File-existence predicate used for TLS validation
pub trait FileCheck {
    fn exists(&self, path: &str) -> bool;
}

/// Checks the real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileCheck;

impl FileCheck for StdFileCheck {
    fn exists(&self, path: &str) -> bool {
        file_exists(path)
    }
}

impl<F> FileCheck for F
where
    F: Fn(&str) -> bool,
{
    fn exists(&self, path: &str) -> bool {
        self(path)
    }
}

/// Receives errors that must stop startup
///
/// Implementations are expected not to return. If one does (as test hooks
/// do), the loader returns the error instead of a settings record.
pub trait FatalHandler {
    fn fatal(&self, err: &ConfigError);
}

/// Logs the error and exits the process
#[derive(Debug, Clone, Copy, Default)]
pub struct ExitOnFatal;

impl FatalHandler for ExitOnFatal {
    fn fatal(&self, err: &ConfigError) {
        error!(error = %err, "Cannot start with current settings");
        std::process::exit(FATAL_EXIT_CODE);
    }
}

impl<F> FatalHandler for F
where
    F: Fn(&ConfigError),
{
    fn fatal(&self, err: &ConfigError) {
        self(err)
    }
}

/// Check that every TLS file exists when TLS is enabled.
///
/// Files are checked in CA, certificate, key order and the first missing
/// one is reported.
pub fn validate_tls(tls: &TlsSettings, check: &dyn FileCheck) -> Result<()> {
    if !tls.enabled {
        return Ok(());
    }

    let files = [
        (TlsFileKind::CaCert, &tls.ca_file),
        (TlsFileKind::ClientCert, &tls.cert_file),
        (TlsFileKind::ClientKey, &tls.key_file),
    ];

    for (kind, path) in files {
        if !check.exists(path) {
            return Err(ConfigError::MissingTlsFile {
                kind,
                path: path.clone(),
            });
        }
        debug!(%kind, path = %path, "TLS file present");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn tls(ca: &str, cert: &str, key: &str) -> TlsSettings {
        TlsSettings {
            enabled: true,
            ca_file: ca.into(),
            cert_file: cert.into(),
            key_file: key.into(),
        }
    }

    #[test]
    fn test_disabled_tls_skips_checks() {
        let settings = TlsSettings {
            enabled: false,
            ..tls("", "", "")
        };
        let never = |_: &str| -> bool { panic!("no file should be checked") };
        assert!(validate_tls(&settings, &never).is_ok());
    }

    #[test]
    fn test_all_files_present() {
        let all = |_: &str| true;
        assert!(validate_tls(&tls("ca.pem", "cert.pem", "key.pem"), &all).is_ok());
    }

    #[test]
    fn test_reports_first_missing_file() {
        let checked = RefCell::new(Vec::new());
        let only_ca = |path: &str| {
            checked.borrow_mut().push(path.to_string());
            path == "ca.pem"
        };

        let err = validate_tls(&tls("ca.pem", "cert.pem", "key.pem"), &only_ca).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingTlsFile { kind: TlsFileKind::ClientCert, ref path } if path == "cert.pem"
        ));
        assert_eq!(*checked.borrow(), vec!["ca.pem", "cert.pem"]);
    }

    #[test]
    fn test_missing_key_file() {
        let no_key = |path: &str| path != "key.pem";
        let err = validate_tls(&tls("ca.pem", "cert.pem", "key.pem"), &no_key).unwrap_err();
        assert_eq!(err.to_string(), "failed to read client key file: key.pem");
    }

    #[test]
    fn test_std_file_check_rejects_empty_path() {
        assert!(!StdFileCheck.exists(""));
    }
}
