//! Session bootstrap
//!
//! Turns a fresh browser session into one logged in to the songs site by
//! replaying saved cookies, or by letting the operator log in once and
//! saving the resulting cookies for later runs.

use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::browser::{Browser, Cookie, dedupe_cookies, parse_cookies};
use crate::config::{ExecutionContext, Secrets};
use crate::error::BackupError;
use crate::utils::InterruptFlag;

/// Where this run's session cookies come from, chosen once at startup
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CookieSource {
    /// JSON cookie array handed over as a CI secret
    FromSecret(String),
    /// Cookies saved by an earlier interactive run
    FromFile(PathBuf),
    /// Manual login; captured cookies are saved to this path
    Interactive(PathBuf),
}

impl CookieSource {
    pub(crate) fn select(context: ExecutionContext, secrets: &Secrets, cookies_file: &Path) -> Self {
        if !context.is_interactive() {
            let json = secrets.cookies_json.clone().unwrap_or_else(|| "[]".to_string());
            CookieSource::FromSecret(json)
        } else if cookies_file.exists() {
            CookieSource::FromFile(cookies_file.to_path_buf())
        } else {
            CookieSource::Interactive(cookies_file.to_path_buf())
        }
    }
}

/// Log the browser in to the site behind `songs_url`
///
/// Returns the number of cookies applied (or captured, for a manual login).
/// A manual login interrupted at the prompt saves nothing.
pub(crate) fn bootstrap(
    browser: &mut dyn Browser,
    source: &CookieSource,
    songs_url: &str,
    input: &mut dyn BufRead,
    interrupt: &InterruptFlag,
) -> Result<usize, BackupError> {
    match source {
        CookieSource::FromSecret(json) => {
            info!("Non-interactive run, loading cookies from secret");
            let cookies = decode_cookies(json, "secret");
            replay_cookies(browser, cookies, songs_url)
        }
        CookieSource::FromFile(path) => {
            info!("Loading cookies from {}", path.display());
            let json = fs::read_to_string(path).map_err(|source| BackupError::Read {
                path: path.clone(),
                source,
            })?;
            let cookies = decode_cookies(&json, &path.display().to_string());
            replay_cookies(browser, cookies, songs_url)
        }
        CookieSource::Interactive(path) => {
            login_interactively(browser, path, songs_url, input, interrupt)
        }
    }
}

/// Malformed cookie data counts as an empty set so the run can go on
fn decode_cookies(json: &str, origin: &str) -> Vec<Cookie> {
    match parse_cookies(json) {
        Ok(cookies) => cookies,
        Err(e) => {
            warn!("Error parsing cookies from {origin}: {e}");
            warn!("Continuing without cookies, authentication is degraded and song discovery will likely find nothing");
            Vec::new()
        }
    }
}

fn replay_cookies(
    browser: &mut dyn Browser,
    cookies: Vec<Cookie>,
    songs_url: &str,
) -> Result<usize, BackupError> {
    // Cookies can only be set for the domain currently loaded
    browser.navigate(songs_url)?;

    let mut applied = 0;
    for mut cookie in dedupe_cookies(cookies) {
        cookie.strip_rejected_attributes();
        match browser.add_cookie(&cookie) {
            Ok(()) => applied += 1,
            Err(e) => warn!("Browser rejected cookie {}: {e}", cookie.name),
        }
    }

    browser.refresh()?;
    info!("Applied {applied} cookies");
    Ok(applied)
}

fn login_interactively(
    browser: &mut dyn Browser,
    cookies_file: &Path,
    songs_url: &str,
    input: &mut dyn BufRead,
    interrupt: &InterruptFlag,
) -> Result<usize, BackupError> {
    info!("No cookies file found, please log in manually");
    browser.navigate(songs_url)?;

    eprint!("After signing in, press ENTER to continue...");
    let mut line = String::new();
    input.read_line(&mut line).map_err(BackupError::Prompt)?;
    // Ctrl-C at the prompt must not persist a half-logged-in session
    interrupt.check()?;

    let cookies = browser.cookies()?;
    save_cookies(cookies_file, &cookies)?;
    info!("Saved {} cookies to {}", cookies.len(), cookies_file.display());
    Ok(cookies.len())
}

fn save_cookies(path: &Path, cookies: &[Cookie]) -> Result<(), BackupError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| BackupError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    let json = serde_json::to_string_pretty(cookies).map_err(BackupError::SerializeCookies)?;
    fs::write(path, json).map_err(|source| BackupError::Write {
        path: path.to_path_buf(),
        source,
    })
}
