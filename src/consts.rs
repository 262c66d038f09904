/// Backup folder name format: "Backup 2025-01-15 09-30-00"
pub(crate) const FOLDER_NAME_FORMAT: &str = "Backup %Y-%m-%d %H-%M-%S";

/// Extension appended to every sanitized song title
pub(crate) const SONG_FILE_EXTENSION: &str = "txt";

/// Media type of uploaded song files
pub(crate) const SONG_MIME_TYPE: &str = "text/plain";

/// Fallback title prefix when the title field cannot be read
pub(crate) const FALLBACK_TITLE_PREFIX: &str = "Song_";

/// Cookie attributes the browser rejects when replayed
pub(crate) const REJECTED_COOKIE_ATTRIBUTES: &[&str] = &["sameSite"];

/// Set (to any non-empty value) by GitHub Actions runners
pub(crate) const CI_ENV: &str = "GITHUB_ACTIONS";

/// JSON cookie array provided as a CI secret
pub(crate) const COOKIES_SECRET_ENV: &str = "CHORDS_AND_TABS_COOKIES";

/// Service-account key JSON provided as a CI secret
pub(crate) const SERVICE_ACCOUNT_SECRET_ENV: &str = "GOOGLE_SERVICE_ACCOUNT_JSON";

pub(crate) const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";
pub(crate) const DRIVE_FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
