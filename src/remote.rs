//! Remote call helper.
//!
//! One request, one JSON body, one uniform failure shape. This layer never
//! retries and never logs; callers decide what to do with an [`HttpError`].

use crate::session::CookieJar;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// HTTP status carried by a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Code(u16),
    /// No response was received (connection refused, timeout, DNS, ...)
    Unexpected,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Code(code) => write!(f, "{}", code),
            Status::Unexpected => write!(f, "(Unexpected)"),
        }
    }
}

/// The single failure type every remote call produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    pub status: Status,
    pub message: String,
}

impl HttpError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Status::Code(status),
            message: message.into(),
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self {
            status: Status::Unexpected,
            message: message.into(),
        }
    }

    /// Build the failure for a non-2xx response.
    ///
    /// The message comes from the body's `error` (what the backend sends) or
    /// `message` field; otherwise the reason phrase stands in.
    pub fn from_response(status: u16, reason: &str, body: &str) -> Self {
        let from_body = parse_body(body).ok().and_then(|value| {
            ["error", "message"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_string))
        });
        let message = from_body.unwrap_or_else(|| {
            if reason.trim().is_empty() {
                format!("Request failed with status {}", status)
            } else {
                reason.trim().to_string()
            }
        });
        Self::new(status, message)
    }

    pub fn is_status(&self, code: u16) -> bool {
        self.status == Status::Code(code)
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {}: {}", self.status, self.message)
    }
}

impl std::error::Error for HttpError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
        }
    }
}

/// Options bag for a call. Defaults to a bodiless GET.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub method: Method,
    /// Serialized JSON body; kept as text so field order is the caller's
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl CallOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn with_body(method: Method, body: String) -> Self {
        Self {
            method,
            body: Some(body),
            headers: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

/// Anything that can perform a remote call. Implemented by [`HttpClient`]
/// and by the scripted mock used in tests.
pub trait RemoteCall: Send + Sync {
    fn call(&self, path: &str, options: &CallOptions) -> Result<Value, HttpError>;
}

/// Parse a response body; an empty body is JSON `null`
pub fn parse_body(text: &str) -> Result<Value, serde_json::Error> {
    if text.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str(text)
    }
}

fn parse_success(status: u16, text: &str) -> Result<Value, HttpError> {
    parse_body(text).map_err(|e| HttpError::new(status, format!("Invalid JSON response: {}", e)))
}

pub struct HttpClient {
    base_url: String,
    agent: ureq::Agent,
    jar: Arc<Mutex<CookieJar>>,
}

impl HttpClient {
    pub fn new(base_url: &str, timeout: Duration, jar: Arc<Mutex<CookieJar>>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            jar,
        }
    }

    fn absorb_cookies(&self, response: &ureq::Response) {
        if let Ok(mut jar) = self.jar.lock() {
            for set_cookie in response.all("set-cookie") {
                jar.absorb(set_cookie);
            }
        }
    }
}

impl RemoteCall for HttpClient {
    fn call(&self, path: &str, options: &CallOptions) -> Result<Value, HttpError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.agent.request(options.method.as_str(), &url);

        if !options.has_header("content-type") {
            request = request.set("Content-Type", "application/json");
        }
        for (name, value) in &options.headers {
            request = request.set(name, value);
        }
        let cookie = self.jar.lock().ok().and_then(|jar| jar.header());
        if let Some(cookie) = cookie {
            request = request.set("Cookie", &cookie);
        }

        let resp = match &options.body {
            Some(body) => request.send_string(body),
            None => request.call(),
        };

        match resp {
            Ok(r) => {
                self.absorb_cookies(&r);
                let status = r.status();
                let text = r
                    .into_string()
                    .map_err(|e| HttpError::unexpected(format!("Failed to read response: {}", e)))?;
                parse_success(status, &text)
            }
            Err(ureq::Error::Status(code, r)) => {
                self.absorb_cookies(&r);
                let reason = r.status_text().to_string();
                let text = r.into_string().unwrap_or_default();
                Err(HttpError::from_response(code, &reason, &text))
            }
            Err(e) => Err(HttpError::unexpected(format!("Request failed: {}", e))),
        }
    }
}
