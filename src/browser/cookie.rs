use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts::REJECTED_COOKIE_ATTRIBUTES;

/// A browser cookie as exchanged over WebDriver and stored in the cookies file
///
/// Only `name` and `value` are required; every other attribute (`domain`,
/// `path`, `secure`, `httpOnly`, `expiry`, `sameSite`, ...) is carried as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Cookie {
    pub(crate) name: String,
    pub(crate) value: String,
    #[serde(flatten)]
    pub(crate) attributes: Map<String, Value>,
}

impl Cookie {
    #[cfg(test)]
    pub(crate) fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            attributes: Map::new(),
        }
    }

    pub(crate) fn domain(&self) -> Option<&str> {
        self.attributes.get("domain").and_then(Value::as_str)
    }

    /// Drop attributes the browser refuses when a cookie is replayed
    pub(crate) fn strip_rejected_attributes(&mut self) {
        for attr in REJECTED_COOKIE_ATTRIBUTES {
            self.attributes.remove(*attr);
        }
    }
}

pub(crate) fn parse_cookies(json: &str) -> Result<Vec<Cookie>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Collapse cookies sharing a (name, domain) scope; the later record wins
/// and keeps the position of the first.
pub(crate) fn dedupe_cookies(cookies: Vec<Cookie>) -> Vec<Cookie> {
    let mut out: Vec<Cookie> = Vec::with_capacity(cookies.len());
    for cookie in cookies {
        match out
            .iter_mut()
            .find(|c| c.name == cookie.name && c.domain() == cookie.domain())
        {
            Some(existing) => *existing = cookie,
            None => out.push(cookie),
        }
    }
    out
}
