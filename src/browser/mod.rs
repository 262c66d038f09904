//! Browser abstraction layer
//!
//! The backup run drives a real browser through the [`Browser`] trait so the
//! site can render its edit pages; the production implementation speaks the
//! W3C WebDriver protocol to a running chromedriver.

pub(crate) mod cookie;
pub(crate) mod session;
pub(crate) mod webdriver;

use crate::error::WebDriverError;

pub(crate) use cookie::{Cookie, dedupe_cookies, parse_cookies};
pub(crate) use session::BrowserSession;
pub(crate) use webdriver::{BrowserOptions, WebDriverClient};

/// Browser operations needed by a backup run
pub(crate) trait Browser {
    /// Load a URL in the current window
    fn navigate(&mut self, url: &str) -> Result<(), WebDriverError>;

    /// Reload the current page
    fn refresh(&mut self) -> Result<(), WebDriverError>;

    /// Add a cookie to the current browsing context
    fn add_cookie(&mut self, cookie: &Cookie) -> Result<(), WebDriverError>;

    /// All cookies visible to the current page
    fn cookies(&mut self) -> Result<Vec<Cookie>, WebDriverError>;

    /// Resolved `href` of every element matching the XPath, in document order
    fn link_targets(&mut self, xpath: &str) -> Result<Vec<String>, WebDriverError>;

    /// Current `value` of the form field with the given element id
    fn field_value(&mut self, element_id: &str) -> Result<String, WebDriverError>;

    /// End the browser session
    fn quit(&mut self) -> Result<(), WebDriverError>;
}

#[cfg(test)]
pub(crate) mod fake {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::{Browser, Cookie};
    use crate::error::WebDriverError;

    /// In-memory browser recording every call
    #[derive(Default)]
    pub(crate) struct FakeBrowser {
        pub(crate) visited: Vec<String>,
        pub(crate) refreshes: usize,
        pub(crate) applied: Vec<Cookie>,
        pub(crate) rejected_cookie: Option<String>,
        pub(crate) session_cookies: Vec<Cookie>,
        pub(crate) links: Vec<String>,
        /// (page url, element id) -> value; missing entries are "no such element"
        pub(crate) fields: HashMap<(String, String), String>,
        /// Navigating to this url fails with a command error
        pub(crate) broken_url: Option<String>,
        pub(crate) quits: Rc<Cell<usize>>,
        pub(crate) log: Rc<RefCell<Vec<String>>>,
    }

    impl FakeBrowser {
        pub(crate) fn with_field(mut self, url: &str, id: &str, value: &str) -> Self {
            self.fields
                .insert((url.to_string(), id.to_string()), value.to_string());
            self
        }

        fn current(&self) -> String {
            self.visited.last().cloned().unwrap_or_default()
        }
    }

    impl Browser for FakeBrowser {
        fn navigate(&mut self, url: &str) -> Result<(), WebDriverError> {
            if self.broken_url.as_deref() == Some(url) {
                return Err(WebDriverError::Command {
                    error: "unknown error".to_string(),
                    message: "net::ERR_CONNECTION_RESET".to_string(),
                });
            }
            self.log.borrow_mut().push(format!("navigate {url}"));
            self.visited.push(url.to_string());
            Ok(())
        }

        fn refresh(&mut self) -> Result<(), WebDriverError> {
            self.log.borrow_mut().push("refresh".to_string());
            self.refreshes += 1;
            Ok(())
        }

        fn add_cookie(&mut self, cookie: &Cookie) -> Result<(), WebDriverError> {
            if self.rejected_cookie.as_deref() == Some(cookie.name.as_str()) {
                return Err(WebDriverError::Command {
                    error: "invalid cookie domain".to_string(),
                    message: cookie.name.clone(),
                });
            }
            self.log.borrow_mut().push(format!("cookie {}", cookie.name));
            self.applied.push(cookie.clone());
            Ok(())
        }

        fn cookies(&mut self) -> Result<Vec<Cookie>, WebDriverError> {
            Ok(self.session_cookies.clone())
        }

        fn link_targets(&mut self, _xpath: &str) -> Result<Vec<String>, WebDriverError> {
            Ok(self.links.clone())
        }

        fn field_value(&mut self, element_id: &str) -> Result<String, WebDriverError> {
            self.fields
                .get(&(self.current(), element_id.to_string()))
                .cloned()
                .ok_or_else(|| WebDriverError::NoSuchElement(element_id.to_string()))
        }

        fn quit(&mut self) -> Result<(), WebDriverError> {
            self.quits.set(self.quits.get() + 1);
            Ok(())
        }
    }
}
