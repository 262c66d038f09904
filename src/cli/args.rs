//! CLI argument definitions
//!
//! A backup run takes no options: it branches only on the execution
//! context and on whether saved cookies exist. The parser still provides
//! `--help` and `--version`.

use clap::Parser;

#[derive(Parser)]
#[command(name = "song-backup")]
#[command(
    about = "Back up your chords-and-tabs.net songs into a timestamped Google Drive folder",
    long_about = "Back up your chords-and-tabs.net songs into a timestamped Google Drive folder.\n\n\
                  Requires a running chromedriver (default http://localhost:9515) and a Google \
                  service-account key. Settings are read from ./song-backup.toml or \
                  ~/.config/song-backup/config.toml when present. On GitHub Actions \
                  (GITHUB_ACTIONS set) cookies and the key come from the \
                  CHORDS_AND_TABS_COOKIES and GOOGLE_SERVICE_ACCOUNT_JSON secrets.",
    version
)]
pub(crate) struct Cli {}
