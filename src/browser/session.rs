use tracing::{info, warn};

use super::Browser;

/// Owns the browser for a run and quits it exactly once
///
/// `close` is the normal exit; `Drop` covers every early return.
pub(crate) struct BrowserSession {
    browser: Box<dyn Browser>,
    closed: bool,
}

impl BrowserSession {
    pub(crate) fn new(browser: Box<dyn Browser>) -> Self {
        Self {
            browser,
            closed: false,
        }
    }

    pub(crate) fn browser(&mut self) -> &mut dyn Browser {
        self.browser.as_mut()
    }

    pub(crate) fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        match self.browser.quit() {
            Ok(()) => info!("Browser session closed"),
            Err(e) => warn!("Failed to close browser session: {e}"),
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::browser::fake::FakeBrowser;

    fn session() -> (BrowserSession, Rc<Cell<usize>>) {
        let browser = FakeBrowser::default();
        let quits = browser.quits.clone();
        (BrowserSession::new(Box::new(browser)), quits)
    }

    #[test]
    fn close_then_drop_quits_once() {
        let (mut session, quits) = session();
        session.close();
        session.close();
        drop(session);
        assert_eq!(quits.get(), 1);
    }

    #[test]
    fn drop_without_close_quits_once() {
        let (session, quits) = session();
        drop(session);
        assert_eq!(quits.get(), 1);
    }

    #[test]
    fn early_return_path_quits_once() {
        fn failing_run(quits: &mut Option<Rc<Cell<usize>>>) -> Result<(), String> {
            let (mut session, counter) = session();
            *quits = Some(counter);
            session.browser().navigate("https://example.test")
                .map_err(|e| e.to_string())?;
            Err("boom".to_string())
        }

        let mut quits = None;
        assert!(failing_run(&mut quits).is_err());
        assert_eq!(quits.unwrap().get(), 1);
    }
}
