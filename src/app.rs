use std::io::BufRead;

use tracing::info;

use crate::backup::{BackupContext, BackupSummary, run_backup};
use crate::bootstrap::{CookieSource, bootstrap};
use crate::browser::{BrowserOptions, BrowserSession, WebDriverClient};
use crate::config::{Config, ExecutionContext, Secrets};
use crate::error::BackupError;
use crate::storage::{BackupStore, DriveClient, ServiceAccountKey};
use crate::utils::InterruptFlag;

/// Wire up the real browser and Drive client and run one backup
pub(crate) fn run(interrupt: &InterruptFlag) -> Result<BackupSummary, BackupError> {
    let config = Config::load();
    let context = ExecutionContext::detect();
    let secrets = Secrets::from_env();
    info!(?context, "Starting song backup");

    // Credentials first: no point opening a browser we cannot upload from
    let key = ServiceAccountKey::load(context, &secrets, &config.service_account_file)?;
    let mut store = DriveClient::new(key);
    info!("Uploading as {}", store.account());

    let source = CookieSource::select(context, &secrets, &config.cookies_file);
    let options = BrowserOptions {
        headless: !context.is_interactive(),
    };
    let client = WebDriverClient::connect(&config.webdriver_url, &options)?;
    let session = BrowserSession::new(Box::new(client));

    let stdin = std::io::stdin();
    back_up(
        session,
        &source,
        &config,
        &mut store,
        interrupt,
        &mut stdin.lock(),
    )
}

/// Log in, run the backup, and close the browser whatever the outcome
pub(crate) fn back_up(
    mut session: BrowserSession,
    source: &CookieSource,
    config: &Config,
    store: &mut dyn BackupStore,
    interrupt: &InterruptFlag,
    input: &mut dyn BufRead,
) -> Result<BackupSummary, BackupError> {
    let result = log_in_and_back_up(&mut session, source, config, store, interrupt, input);
    session.close();
    result
}

fn log_in_and_back_up(
    session: &mut BrowserSession,
    source: &CookieSource,
    config: &Config,
    store: &mut dyn BackupStore,
    interrupt: &InterruptFlag,
    input: &mut dyn BufRead,
) -> Result<BackupSummary, BackupError> {
    bootstrap(session.browser(), source, &config.songs_url(), input, interrupt)?;
    interrupt.check()?;

    let mut ctx = BackupContext {
        config,
        browser: session.browser(),
        store,
        interrupt,
    };
    run_backup(&mut ctx)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io::Cursor;
    use std::rc::Rc;

    use super::*;
    use crate::backup::tests::{browser_with_songs, instant_config};
    use crate::browser::Cookie;
use crate::browser::fake::FakeBrowser;
    use crate::storage::fake::FakeStore;

    fn secret(json: &str) -> CookieSource {
        CookieSource::FromSecret(json.to_string())
    }

    fn back_up_with(
        browser: FakeBrowser,
        config: &Config,
        store: &mut FakeStore,
        interrupt: &InterruptFlag,
    ) -> (Result<BackupSummary, BackupError>, Rc<Cell<usize>>) {
        let quits = browser.quits.clone();
        let session = BrowserSession::new(Box::new(browser));
        let mut input = Cursor::new(&b""[..]);
        let result = back_up(
            session,
            &secret(r#"[{"name":"PHPSESSID","value":"abc","sameSite":"Lax"}]"#),
            config,
            store,
            interrupt,
            &mut input,
        );
        (result, quits)
    }

    #[test]
    fn successful_run_closes_session_once() {
        let config = instant_config();
        let browser = browser_with_songs(&config, &[("s1", Some("One"), Some("1"))]);
        let mut store = FakeStore::default();

        let (result, quits) = back_up_with(browser, &config, &mut store, &InterruptFlag::default());

        assert_eq!(result.unwrap().uploaded, 1);
        assert_eq!(quits.get(), 1);
    }

    #[test]
    fn failing_upload_still_closes_session_once() {
        let config = instant_config();
        let browser = browser_with_songs(
            &config,
            &[("s1", Some("One"), Some("1")), ("s2", Some("Two"), Some("2"))],
        );
        let mut store = FakeStore {
            failing_file: Some("Two.txt".to_string()),
            ..FakeStore::default()
        };

        let (result, quits) = back_up_with(browser, &config, &mut store, &InterruptFlag::default());

        assert!(matches!(result, Err(BackupError::Drive(_))));
        assert_eq!(store.uploads.len(), 1);
        assert_eq!(quits.get(), 1);
    }

    #[test]
    fn browser_error_mid_loop_still_closes_session_once() {
        let config = instant_config();
        let mut browser = browser_with_songs(
            &config,
            &[("s1", Some("One"), Some("1")), ("s2", Some("Two"), Some("2"))],
        );
        browser.broken_url = Some(config.edit_url("s2"));
        let mut store = FakeStore::default();

        let (result, quits) = back_up_with(browser, &config, &mut store, &InterruptFlag::default());

        assert!(matches!(result, Err(BackupError::Browser(_))));
        assert_eq!(quits.get(), 1);
    }

    #[test]
    fn interrupted_run_closes_session_once() {
        let config = instant_config();
        let browser = browser_with_songs(&config, &[("s1", Some("One"), Some("1"))]);
        let mut store = FakeStore::default();
        let interrupt = InterruptFlag::default();
        interrupt.raise();

        let (result, quits) = back_up_with(browser, &config, &mut store, &interrupt);

        assert!(matches!(result, Err(BackupError::Interrupted)));
        assert!(store.folders.is_empty());
        assert_eq!(quits.get(), 1);
    }

    #[test]
    fn no_songs_closes_session_without_creating_folder() {
        let config = instant_config();
        let mut store = FakeStore::default();

        let (result, quits) =
            back_up_with(FakeBrowser::default(), &config, &mut store, &InterruptFlag::default());

        assert_eq!(result.unwrap().discovered, 0);
        assert!(store.folders.is_empty());
        assert_eq!(quits.get(), 1);
    }

    #[test]
    fn interrupt_during_manual_login_keeps_cookie_file_absent() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cookies.json");
        let config = instant_config();
        let browser = FakeBrowser {
            session_cookies: vec![Cookie::new("PHPSESSID", "anonymous")],
            ..FakeBrowser::default()
        };
        let quits = browser.quits.clone();
        let mut store = FakeStore::default();
        let interrupt = InterruptFlag::default();
        interrupt.raise();

        let result = back_up(
            BrowserSession::new(Box::new(browser)),
            &CookieSource::Interactive(file.clone()),
            &config,
            &mut store,
            &interrupt,
            &mut Cursor::new(&b"\n"[..]),
        );

        assert!(matches!(result, Err(BackupError::Interrupted)));
        assert!(!file.exists());
        assert!(store.folders.is_empty());
        assert_eq!(quits.get(), 1);
    }
}
