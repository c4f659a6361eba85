use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::http::parser::{parse_message, split_request_line, ParseError};

/// Represents a parsed HTTP request from a client.
///
/// The method and version are kept as the raw tokens the client sent; the
/// server does not restrict either. Requests are built once per connection
/// and not modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Method token (e.g. "GET")
    pub method: String,
    /// Raw request target, path and query (e.g. "/index.html?v=2")
    pub uri: String,
    /// HTTP version token (typically "HTTP/1.1")
    pub version: String,
    /// Request headers with names as received
    pub headers: HashMap<String, String>,
    /// Request body as text, surrounding whitespace removed
    pub body: String,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<String>,
    uri: Option<String>,
    version: Option<String>,
    headers: HashMap<String, String>,
    body: String,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            uri: None,
            version: None,
            headers: HashMap::new(),
            body: String::new(),
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            uri: self.uri.ok_or("uri missing")?,
            version: self.version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            headers: self.headers,
            body: self.body,
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// Parses a request from raw text.
    ///
    /// # Example
    ///
    /// ```
    /// # use easy_www::http::request::Request;
    /// let req = Request::parse("GET /a HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();
    /// assert_eq!(req.uri, "/a");
    /// assert_eq!(req.host(), "localhost");
    /// ```
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let msg = parse_message(raw)?;
        let [method, uri, version] = split_request_line(msg.start_line)?;

        Ok(Request {
            method: method.to_string(),
            uri: uri.to_string(),
            version: version.to_string(),
            headers: msg.headers,
            body: msg.body,
        })
    }

    /// Retrieves a header value by its exact name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .get(key)
            .map(|v| v.as_str())
    }

    /// The `Host` header, or an empty string when the client sent none.
    pub fn host(&self) -> &str {
        self.header("Host").unwrap_or("")
    }

    /// Serializes the request as UTF-8 bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl FromStr for Request {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Request::parse(s)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = format!("{} {} {}\r\n", self.method, self.uri, self.version);

        for (k, v) in &self.headers {
            out.push_str(&format!("{}: {}\r\n", k, v));
        }

        out.push_str("\r\n");
        out.push_str(&self.body);

        f.write_str(out.trim())
    }
}
