use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use crate::consts::{CI_ENV, COOKIES_SECRET_ENV, SERVICE_ACCOUNT_SECRET_ENV};

const CONFIG_FILE_NAME: &str = "song-backup.toml";
const APP_DIR: &str = "song-backup";

/// Drive folder every backup folder is created under
const DEFAULT_PARENT_FOLDER_ID: &str = "1HxvwceupKtXUymKNAtMQCdK7qHHiXKeh";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub(crate) base_url: String,
    pub(crate) songs_path: String,
    pub(crate) song_link_prefix: String,
    pub(crate) edit_path: String,
    pub(crate) title_field: String,
    pub(crate) text_field: String,
    pub(crate) cookies_file: PathBuf,
    pub(crate) service_account_file: PathBuf,
    pub(crate) parent_folder_id: String,
    pub(crate) webdriver_url: String,
    pub(crate) page_load_delay_secs: u64,
    pub(crate) edit_page_delay_secs: u64,
    pub(crate) upload_delay_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://www.chords-and-tabs.net".to_string(),
            songs_path: "/mysongs/".to_string(),
            song_link_prefix: "/song/my/".to_string(),
            edit_path: "/mysong/edit/".to_string(),
            title_field: "frm-createNewSongForm-song".to_string(),
            text_field: "frm-createNewSongForm-text".to_string(),
            cookies_file: PathBuf::from("cookies.json"),
            service_account_file: PathBuf::from("service-account.json"),
            parent_folder_id: DEFAULT_PARENT_FOLDER_ID.to_string(),
            webdriver_url: "http://localhost:9515".to_string(),
            page_load_delay_secs: 5,
            edit_page_delay_secs: 2,
            upload_delay_secs: 1,
        }
    }
}

impl Config {
    pub(crate) fn load() -> Self {
        // Try config locations in order of priority
        for path in Self::get_config_paths() {
            if path.exists()
                && let Ok(content) = fs::read_to_string(&path)
            {
                match toml::from_str::<Config>(&content) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Failed to parse {}: {}", path.display(), e);
                    }
                }
            }
        }

        Self::default()
    }

    fn get_config_paths() -> Vec<PathBuf> {
        // 1. Working directory: ./song-backup.toml
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];

        // 2. XDG config: ~/.config/song-backup/config.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join(APP_DIR).join("config.toml"));
        }

        // 3. Platform config dir (macOS Application Support, Windows AppData)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join(APP_DIR).join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        // 4. Home directory: ~/.song-backup.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(format!(".{CONFIG_FILE_NAME}")));
        }

        paths
    }

    pub(crate) fn songs_url(&self) -> String {
        join_url(&self.base_url, &self.songs_path)
    }

    /// Edit page for the song with the given trailing identifier
    pub(crate) fn edit_url(&self, song_id: &str) -> String {
        format!("{}{song_id}", join_url(&self.base_url, &self.edit_path))
    }

    /// XPath matching every anchor that links to one of the user's songs
    pub(crate) fn song_link_xpath(&self) -> String {
        format!("//a[starts-with(@href, '{}')]", self.song_link_prefix)
    }

    pub(crate) fn page_load_delay(&self) -> Duration {
        Duration::from_secs(self.page_load_delay_secs)
    }

    pub(crate) fn edit_page_delay(&self) -> Duration {
        Duration::from_secs(self.edit_page_delay_secs)
    }

    pub(crate) fn upload_delay(&self) -> Duration {
        Duration::from_secs(self.upload_delay_secs)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExecutionContext {
    /// A human can log in through the browser window
    Interactive,
    /// Scheduled CI run, secrets come from the environment
    NonInteractive,
}

impl ExecutionContext {
    pub(crate) fn detect() -> Self {
        Self::detect_with(|key| std::env::var(key).ok())
    }

    pub(crate) fn detect_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(CI_ENV) {
            Some(value) if !value.is_empty() => ExecutionContext::NonInteractive,
            _ => ExecutionContext::Interactive,
        }
    }

    pub(crate) fn is_interactive(self) -> bool {
        self == ExecutionContext::Interactive
    }
}

/// Secrets handed to non-interactive runs through the environment
#[derive(Debug, Default, Clone)]
pub(crate) struct Secrets {
    pub(crate) cookies_json: Option<String>,
    pub(crate) service_account_json: Option<String>,
}

impl Secrets {
    pub(crate) fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            cookies_json: lookup(COOKIES_SECRET_ENV),
            service_account_json: lookup(SERVICE_ACCOUNT_SECRET_ENV),
        }
    }
}
