//! Blocking W3C WebDriver client
//!
//! Talks JSON over HTTP to a running driver (chromedriver by default) using
//! the same `ureq` agent setup as the rest of the crate.

use std::time::Duration;

use serde_json::{Value, json};
use tracing::debug;
use ureq::Body;
use ureq::http::Response;

use super::{Browser, Cookie};
use crate::error::WebDriverError;

/// Key under which WebDriver returns element references
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Launch arguments for the browser session
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BrowserOptions {
    pub(crate) headless: bool,
}

impl BrowserOptions {
    pub(crate) fn args(&self) -> Vec<&'static str> {
        let mut args = vec!["--start-maximized"];
        if self.headless {
            args.extend(["--headless", "--no-sandbox", "--disable-dev-shm-usage"]);
        }
        args
    }

    fn new_session_payload(&self) -> Value {
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": self.args() }
                }
            }
        })
    }
}

pub(crate) struct WebDriverClient {
    agent: ureq::Agent,
    endpoint: String,
    session_id: String,
}

impl WebDriverClient {
    /// Start a new browser session on the driver at `endpoint`
    pub(crate) fn connect(endpoint: &str, options: &BrowserOptions) -> Result<Self, WebDriverError> {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .http_status_as_error(false)
            .build()
            .into();
        let endpoint = endpoint.trim_end_matches('/').to_string();

        let url = format!("{endpoint}/session");
        let response = agent
            .post(url.as_str())
            .send_json(options.new_session_payload())?;
        let value = read_value(response)?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| WebDriverError::Protocol("new session response has no sessionId".to_string()))?
            .to_string();
        debug!(session_id = %session_id, headless = options.headless, "Started browser session");

        Ok(Self {
            agent,
            endpoint,
            session_id,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/session/{}{path}", self.endpoint, self.session_id)
    }

    fn get(&self, path: &str) -> Result<Value, WebDriverError> {
        let url = self.url(path);
        read_value(self.agent.get(url.as_str()).call()?)
    }

    fn post(&self, path: &str, body: Value) -> Result<Value, WebDriverError> {
        let url = self.url(path);
        read_value(self.agent.post(url.as_str()).send_json(body)?)
    }

    fn find_element(&self, using: &str, selector: &str) -> Result<String, WebDriverError> {
        let value = self.post("/element", json!({ "using": using, "value": selector }))?;
        element_id(&value)
    }

    fn find_elements(&self, using: &str, selector: &str) -> Result<Vec<String>, WebDriverError> {
        let value = self.post("/elements", json!({ "using": using, "value": selector }))?;
        value
            .as_array()
            .ok_or_else(|| WebDriverError::Protocol("find elements did not return an array".to_string()))?
            .iter()
            .map(element_id)
            .collect()
    }

    fn property(&self, element: &str, name: &str) -> Result<Option<String>, WebDriverError> {
        let value = self.get(&format!("/element/{element}/property/{name}"))?;
        Ok(value.as_str().map(str::to_string))
    }
}

impl Browser for WebDriverClient {
    fn navigate(&mut self, url: &str) -> Result<(), WebDriverError> {
        debug!(url, "Navigating");
        self.post("/url", json!({ "url": url })).map(drop)
    }

    fn refresh(&mut self) -> Result<(), WebDriverError> {
        self.post("/refresh", json!({})).map(drop)
    }

    fn add_cookie(&mut self, cookie: &Cookie) -> Result<(), WebDriverError> {
        self.post("/cookie", json!({ "cookie": cookie })).map(drop)
    }

    fn cookies(&mut self) -> Result<Vec<Cookie>, WebDriverError> {
        let value = self.get("/cookie")?;
        serde_json::from_value(value)
            .map_err(|e| WebDriverError::Protocol(format!("malformed cookie list: {e}")))
    }

    fn link_targets(&mut self, xpath: &str) -> Result<Vec<String>, WebDriverError> {
        let mut targets = Vec::new();
        for element in self.find_elements("xpath", xpath)? {
            if let Some(href) = self.property(&element, "href")? {
                targets.push(href);
            }
        }
        Ok(targets)
    }

    fn field_value(&mut self, element_id: &str) -> Result<String, WebDriverError> {
        let element = self.find_element("css selector", &id_selector(element_id))?;
        self.property(&element, "value")?
            .ok_or_else(|| WebDriverError::Protocol(format!("field {element_id} has no value")))
    }

    fn quit(&mut self) -> Result<(), WebDriverError> {
        let url = self.url("");
        read_value(self.agent.delete(url.as_str()).call()?).map(drop)?;
        debug!(session_id = %self.session_id, "Closed browser session");
        Ok(())
    }
}

/// Unwrap the `value` member of a WebDriver response, mapping error payloads
///
/// Error responses that are not JSON (a proxy page, a crashed driver) keep
/// their HTTP status.
fn read_value(mut response: Response<Body>) -> Result<Value, WebDriverError> {
    let status = response.status();
    let text = response.body_mut().read_to_string()?;
    let mut payload: Value = match serde_json::from_str(&text) {
        Ok(payload) => payload,
        Err(_) if !status.is_success() => {
            return Err(WebDriverError::Status {
                status: status.as_u16(),
                message: text.trim().to_string(),
            });
        }
        Err(e) => return Err(WebDriverError::Protocol(format!("response is not JSON: {e}"))),
    };
    let value = payload
        .get_mut("value")
        .map(Value::take)
        .unwrap_or(Value::Null);

    if status.is_success() {
        Ok(value)
    } else {
        Err(command_error(&value))
    }
}

fn command_error(value: &Value) -> WebDriverError {
    let error = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if error == "no such element" {
        WebDriverError::NoSuchElement(message)
    } else {
        WebDriverError::Command {
            error: error.to_string(),
            message,
        }
    }
}

fn element_id(value: &Value) -> Result<String, WebDriverError> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| WebDriverError::Protocol(format!("not an element reference: {value}")))
}

/// CSS selector matching an element id verbatim, without `#` escaping rules
fn id_selector(id: &str) -> String {
    format!("[id=\"{}\"]", id.replace('\\', "\\\\").replace('"', "\\\""))
}
