// src/core/webdriver.rs
//! Rendering sessions for client-side rendered pages.
//!
//! A [`Renderer`] hands out one [`RenderSession`] per call. Sessions own the
//! remote browser for their lifetime and release it in `Drop`, so every exit
//! path (success, timeout, `?`) tears the browser down.
//!
//! [`WebDriver`] speaks the W3C WebDriver wire protocol (geckodriver + headless
//! Firefox) over blocking HTTP/JSON.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::options::FetchOptions;
use crate::error::FetchError;

pub trait Renderer {
    type Session: RenderSession;

    /// Acquire a fresh session. Dropping it releases the browser.
    fn open(&self) -> Result<Self::Session, FetchError>;
}

pub trait RenderSession {
    fn navigate(&mut self, url: &str) -> Result<(), FetchError>;

    /// Is an element matching the CSS selector present right now?
    fn has_element(&mut self, css: &str) -> Result<bool, FetchError>;

    fn page_source(&mut self) -> Result<String, FetchError>;
}

/* ---------- W3C WebDriver ---------- */

const PAGE_LOAD_MS: u64 = 30_000;

#[derive(Deserialize)]
struct Envelope<T> {
    value: T,
}

#[derive(Deserialize)]
struct NewSession {
    #[serde(rename = "sessionId")]
    session_id: String,
}

#[derive(Deserialize)]
struct WireError {
    error: String,
    #[serde(default)]
    message: String,
}

pub struct WebDriver {
    base: String,
    http: Client,
    headless: bool,
}

impl WebDriver {
    pub fn new(opts: &FetchOptions) -> Result<Self, FetchError> {
        let http = crate::core::net::client(
            opts.render_timeout()
                .checked_add(Duration::from_millis(PAGE_LOAD_MS))
                .unwrap_or(Duration::MAX),
        )?;
        Ok(Self {
            base: opts.webdriver_url.trim_end_matches('/').to_string(),
            http,
            headless: opts.headless,
        })
    }

    fn capabilities(&self) -> Value {
        let args: Vec<&str> = if self.headless { vec!["-headless"] } else { Vec::new() };
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "firefox",
                    "moz:firefoxOptions": { "args": args },
                    "timeouts": { "pageLoad": PAGE_LOAD_MS }
                }
            }
        })
    }
}

impl Renderer for WebDriver {
    type Session = WebDriverSession;

    fn open(&self) -> Result<WebDriverSession, FetchError> {
        let url = format!("{}/session", self.base);
        let resp = self.http.post(&url).json(&self.capabilities()).send()?;
        let status = resp.status();
        let body: Value = resp.json()?;
        if !status.is_success() {
            return Err(FetchError::Session(wire_message(&body)));
        }
        let created: Envelope<NewSession> = serde_json::from_value(body)
            .map_err(|e| FetchError::Session(format!("new session: {e}")))?;

        debug!("webdriver session {} opened", created.value.session_id);
        Ok(WebDriverSession {
            base: self.base.clone(),
            http: self.http.clone(),
            id: created.value.session_id,
        })
    }
}

pub struct WebDriverSession {
    base: String,
    http: Client,
    id: String,
}

impl WebDriverSession {
    fn endpoint(&self, path: &str) -> String {
        format!("{}/session/{}/{}", self.base, self.id, path)
    }

    /// Send a command; returns the HTTP success flag and the `value` payload.
    fn command(&self, req: RequestBuilder) -> Result<(bool, Value), FetchError> {
        let resp = req.send()?;
        let ok = resp.status().is_success();
        let body: Envelope<Value> = resp
            .json()
            .map_err(|e| FetchError::Session(format!("session {}: {e}", self.id)))?;
        Ok((ok, body.value))
    }
}

impl RenderSession for WebDriverSession {
    fn navigate(&mut self, url: &str) -> Result<(), FetchError> {
        let req = self.http.post(self.endpoint("url")).json(&json!({ "url": url }));
        match self.command(req)? {
            (true, _) => Ok(()),
            (false, v) => Err(FetchError::Session(wire_value_message(&v))),
        }
    }

    fn has_element(&mut self, css: &str) -> Result<bool, FetchError> {
        let req = self
            .http
            .post(self.endpoint("element"))
            .json(&json!({ "using": "css selector", "value": css }));
        match self.command(req)? {
            (true, _) => Ok(true),
            (false, v) => match serde_json::from_value::<WireError>(v.clone()) {
                Ok(e) if e.error == "no such element" => Ok(false),
                _ => Err(FetchError::Session(wire_value_message(&v))),
            },
        }
    }

    fn page_source(&mut self) -> Result<String, FetchError> {
        match self.command(self.http.get(self.endpoint("source")))? {
            (true, Value::String(src)) => Ok(src),
            (true, _) => Err(FetchError::Session(s!("page source was not a string"))),
            (false, v) => Err(FetchError::Session(wire_value_message(&v))),
        }
    }
}

impl Drop for WebDriverSession {
    fn drop(&mut self) {
        let url = format!("{}/session/{}", self.base, self.id);
        match self.http.delete(&url).send() {
            Ok(r) if r.status().is_success() => debug!("webdriver session {} closed", self.id),
            Ok(r) => warn!("webdriver session {} close returned {}", self.id, r.status()),
            Err(e) => warn!("webdriver session {} close failed: {}", self.id, e),
        }
    }
}

fn wire_message(body: &Value) -> String {
    body.get("value").map(wire_value_message).unwrap_or_else(|| body.to_string())
}

fn wire_value_message(v: &Value) -> String {
    match serde_json::from_value::<WireError>(v.clone()) {
        Ok(e) if e.message.is_empty() => e.error,
        Ok(e) => format!("{}: {}", e.error, e.message),
        Err(_) => v.to_string(),
    }
}
