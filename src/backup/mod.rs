//! The backup run itself
//!
//! Discover the user's songs on the index page, read each one from its edit
//! page and upload it into a single fresh backup folder.

pub(crate) mod song;

use tracing::{debug, info, warn};

use crate::browser::Browser;
use crate::config::Config;
use crate::consts::SONG_MIME_TYPE;
use crate::error::BackupError;
use crate::storage::{BackupStore, RemoteFile};
use crate::utils::{InterruptFlag, backup_folder_name_now};

pub(crate) use song::{SongRecord, SongRef};

/// Everything a run needs, passed explicitly instead of living in globals
pub(crate) struct BackupContext<'a> {
    pub(crate) config: &'a Config,
    pub(crate) browser: &'a mut dyn Browser,
    pub(crate) store: &'a mut dyn BackupStore,
    pub(crate) interrupt: &'a InterruptFlag,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct BackupSummary {
    /// `None` when no songs were found and nothing was created
    pub(crate) folder: Option<RemoteFile>,
    pub(crate) discovered: usize,
    pub(crate) uploaded: usize,
    pub(crate) skipped: usize,
}

pub(crate) fn run_backup(ctx: &mut BackupContext<'_>) -> Result<BackupSummary, BackupError> {
    ctx.browser.navigate(&ctx.config.songs_url())?;
    ctx.interrupt.pause(ctx.config.page_load_delay())?;

    let songs = discover_songs(ctx.browser, ctx.config)?;
    info!("Found {} songs", songs.len());

    let mut summary = BackupSummary {
        discovered: songs.len(),
        ..BackupSummary::default()
    };
    if songs.is_empty() {
        warn!("No songs found. Verify you're logged in and on the 'My Songs' page.");
        return Ok(summary);
    }

    let folder = ctx
        .store
        .create_folder(&backup_folder_name_now(), &ctx.config.parent_folder_id)?;
    info!("Created Drive folder: {} (ID: {})", folder.name, folder.id);

    for song in &songs {
        ctx.interrupt.check()?;

        let Some(record) = extract_song(ctx.browser, ctx.config, ctx.interrupt, song)? else {
            summary.skipped += 1;
            continue;
        };

        let file_name = record.file_name();
        let uploaded = ctx.store.upload(
            &folder.id,
            &file_name,
            record.text.into_bytes(),
            SONG_MIME_TYPE,
        )?;
        info!("Uploaded {} (ID: {})", file_name, uploaded.id);
        summary.uploaded += 1;

        ctx.interrupt.pause(ctx.config.upload_delay())?;
    }

    summary.folder = Some(folder);
    Ok(summary)
}

/// Song links on the current page, in document order
pub(crate) fn discover_songs(
    browser: &mut dyn Browser,
    config: &Config,
) -> Result<Vec<SongRef>, BackupError> {
    let links = browser.link_targets(&config.song_link_xpath())?;
    Ok(links.into_iter().map(SongRef::new).collect())
}

/// Read one song from its edit page; `None` when its text is unavailable
fn extract_song(
    browser: &mut dyn Browser,
    config: &Config,
    interrupt: &InterruptFlag,
    song: &SongRef,
) -> Result<Option<SongRecord>, BackupError> {
    browser.navigate(&config.edit_url(song.id()))?;
    interrupt.pause(config.edit_page_delay())?;

    let title = match browser.field_value(&config.title_field) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        Ok(_) => {
            debug!("Empty title for song {}", song.id());
            song.fallback_title()
        }
        Err(e) => {
            warn!("Could not extract title for song {}: {e}", song.id());
            song.fallback_title()
        }
    };

    match browser.field_value(&config.text_field) {
        Ok(text) => Ok(Some(SongRecord { title, text })),
        Err(e) => {
            warn!("Could not extract text for {title}: {e}");
            Ok(None)
        }
    }
}
