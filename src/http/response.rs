use std::collections::HashMap;
use std::fmt;

use crate::http::parser::{parse_message, split_status_line, ParseError};
use crate::http::status::{StatusClass, StatusCode};

const HTTP_VERSION: &str = "HTTP/1.1";

/// Sent in the status line when no reason phrase was set.
pub const MISSING_REASON: &str = "Status message not set";

/// Response payload. Text and binary bodies are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// UTF-8 text written after the header block.
    Text(String),
    /// Raw bytes appended to the header block unchanged.
    Binary(Vec<u8>),
}

/// An HTTP response under construction.
///
/// A fresh response is `501 Not Implemented` with an empty text body; the
/// handler chain and the static resolver fill it in before it is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Numeric status code
    pub status_code: u16,
    /// Reason phrase sent after the code
    pub status_message: String,
    /// Response headers, written in map order
    pub headers: HashMap<String, String>,
    body: Body,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn new() -> Self {
        Self {
            status_code: StatusCode::NotImplemented.as_u16(),
            status_message: StatusCode::NotImplemented.reason_phrase().to_string(),
            headers: HashMap::new(),
            body: Body::Text(String::new()),
        }
    }

    /// Parses a response from raw text. The body is always read as text.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let msg = parse_message(raw)?;
        let (_version, code, reason) = split_status_line(msg.start_line)?;

        Ok(Self {
            status_code: code,
            status_message: reason.to_string(),
            headers: msg.headers,
            body: Body::Text(msg.body),
        })
    }

    /// Creates the 400 response sent for requests that fail to parse.
    pub fn bad_request() -> Self {
        let mut res = Self::new();
        res.set_status(StatusCode::BadRequest);
        res.set_html("<h1>BAD REQUEST</h1>");
        res
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.set_custom_status(status.as_u16(), status.reason_phrase());
    }

    /// Sets a status that may be missing from the registry.
    pub fn set_custom_status(&mut self, code: u16, message: impl Into<String>) {
        self.status_code = code;
        self.status_message = message.into();
    }

    pub fn status_class(&self) -> StatusClass {
        StatusClass::of(self.status_code)
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }

    /// Adds or replaces a header.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(key.into(), value.into());
    }

    pub fn remove_header(&mut self, key: &str) {
        self.headers.remove(key);
    }

    /// Sets `Content-Type` to `mime` with a UTF-8 charset.
    pub fn set_content_type(&mut self, mime: &str) {
        self.set_header("Content-Type", format!("{}; charset=utf-8", mime));
    }

    /// Replaces the body with plain text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.set_content_type("text/plain");
        self.body = Body::Text(text.into());
    }

    /// Replaces the body with an HTML fragment.
    pub fn set_html(&mut self, html: impl Into<String>) {
        self.set_content_type("text/html");
        self.body = Body::Text(html.into());
    }

    /// Replaces the body with raw bytes. `Content-Type` is left untouched.
    pub fn set_binary(&mut self, bytes: Vec<u8>) {
        self.body = Body::Binary(bytes);
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// The text body, if the active body is text.
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            Body::Text(text) => Some(text),
            Body::Binary(_) => None,
        }
    }

    /// Serializes the response for the wire.
    ///
    /// A binary body is appended to the UTF-8 header block byte for byte.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = self.to_string().into_bytes();

        if let Body::Binary(bytes) = &self.body {
            buf.extend_from_slice(bytes);
        }

        buf
    }
}

/// Formats the status line and headers, plus the body when it is text.
impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason: &str = if self.status_message.is_empty() {
            MISSING_REASON
        } else {
            &self.status_message
        };

        let mut out = format!("{} {} {}\r\n", HTTP_VERSION, self.status_code, reason);

        for (k, v) in &self.headers {
            out.push_str(&format!("{}: {}\r\n", k, v));
        }

        // Binary-only headers
        if let Body::Binary(bytes) = &self.body {
            if !self.headers.contains_key("Content-Length") {
                out.push_str(&format!("Content-Length: {}\r\n", bytes.len()));
            }
        }

        out.push_str("\r\n");

        if let Body::Text(text) = &self.body {
            out.push_str(text);
        }

        f.write_str(out.trim_start())
    }
}
