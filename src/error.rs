use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum BackupError {
    #[error("Browser error: {0}")]
    Browser(#[from] WebDriverError),

    #[error("Drive error: {0}")]
    Drive(#[from] DriveError),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize cookies: {0}")]
    SerializeCookies(serde_json::Error),

    #[error("Failed to read login confirmation: {0}")]
    Prompt(std::io::Error),

    #[error("Failed to install interrupt handler: {0}")]
    InterruptHandler(#[from] ctrlc::Error),

    #[error("Backup interrupted by user")]
    Interrupted,
}

#[derive(Debug, Error)]
pub(crate) enum WebDriverError {
    #[error("WebDriver request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("no such element: {0}")]
    NoSuchElement(String),

    #[error("{error}: {message}")]
    Command { error: String, message: String },

    #[error("WebDriver returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected WebDriver response: {0}")]
    Protocol(String),
}

#[derive(Debug, Error)]
pub(crate) enum DriveError {
    #[error("Drive request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("Drive API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Service account key not found at {}", .path.display())]
    MissingCredentials { path: PathBuf },

    #[error("Service account key not set in {var}")]
    MissingSecret { var: &'static str },

    #[error("Failed to read service account key {}: {source}", .path.display())]
    ReadCredentials {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid service account key: {0}")]
    InvalidCredentials(serde_json::Error),

    #[error("Failed to sign token request: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("Unexpected Drive response: {0}")]
    Protocol(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_error_display_interrupted() {
        assert_eq!(
            BackupError::Interrupted.to_string(),
            "Backup interrupted by user"
        );
    }

    #[test]
    fn backup_error_display_read_includes_path() {
        let e = BackupError::Read {
            path: PathBuf::from("cookies.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(e.to_string(), "Failed to read cookies.json: denied");
    }

    #[test]
    fn webdriver_command_error_display() {
        let e = WebDriverError::Command {
            error: "invalid cookie domain".to_string(),
            message: "Cookie 'sid' is for another domain".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "invalid cookie domain: Cookie 'sid' is for another domain"
        );
    }

    #[test]
    fn backup_error_from_webdriver_error() {
        let e: BackupError = WebDriverError::NoSuchElement("#title".to_string()).into();
        assert_eq!(e.to_string(), "Browser error: no such element: #title");
    }

    #[test]
    fn drive_error_api_display() {
        let e = DriveError::Api {
            status: 404,
            message: "File not found: abc".to_string(),
        };
        assert_eq!(e.to_string(), "Drive API returned 404: File not found: abc");
    }

    #[test]
    fn drive_error_missing_secret_display() {
        let e = DriveError::MissingSecret {
            var: "GOOGLE_SERVICE_ACCOUNT_JSON",
        };
        assert_eq!(
            e.to_string(),
            "Service account key not set in GOOGLE_SERVICE_ACCOUNT_JSON"
        );
    }

    #[test]
    fn webdriver_status_error_display() {
        let e = WebDriverError::Status {
            status: 502,
            message: "Bad Gateway".to_string(),
        };
        assert_eq!(e.to_string(), "WebDriver returned 502: Bad Gateway");
    }
}
