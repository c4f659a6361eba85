//! Line-oriented HTTP message parser.
//!
//! Messages are read as text in three stages: start line, headers, body.
//! Only the start line is strict; malformed header lines are skipped.

use std::collections::HashMap;
use thiserror::Error;

/// A structurally malformed HTTP message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input held nothing but whitespace.
    #[error("empty message")]
    Empty,
    /// The first non-blank line is not a valid request or status line.
    #[error("invalid start line: {0:?}")]
    StartLine(String),
    /// The status code of a status line is not a number.
    #[error("invalid status code: {0:?}")]
    StatusCode(String),
}

/// A message split into its parts, before the start line is interpreted.
#[derive(Debug)]
pub struct RawMessage<'a> {
    pub start_line: &'a str,
    pub headers: HashMap<String, String>,
    pub body: String,
}

enum Stage {
    StartLine,
    Headers,
    Body,
}

/// Splits `raw` into start line, headers and body.
///
/// Blank lines before the start line are ignored. Header names and values
/// are trimmed and later duplicates overwrite earlier ones. Body lines are
/// right-trimmed, joined with CRLF and the result trimmed.
pub fn parse_message(raw: &str) -> Result<RawMessage<'_>, ParseError> {
    let mut stage = Stage::StartLine;
    let mut start_line = None;
    let mut headers = HashMap::new();
    let mut body_lines = Vec::new();

    for line in raw.split('\n') {
        match stage {
            Stage::StartLine => {
                if line.trim().is_empty() {
                    continue;
                }
                start_line = Some(line);
                stage = Stage::Headers;
            }

            Stage::Headers => {
                if line.trim().is_empty() {
                    stage = Stage::Body;
                    continue;
                }

                let Some((name, value)) = line.split_once(':') else {
                    continue;
                };
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }

                headers.insert(name.to_string(), value.trim().to_string());
            }

            Stage::Body => body_lines.push(line.trim_end()),
        }
    }

    let start_line = start_line.ok_or(ParseError::Empty)?;
    let body = body_lines.join("\r\n").trim().to_string();

    Ok(RawMessage {
        start_line,
        headers,
        body,
    })
}

/// Splits a request line into exactly three space-separated tokens:
/// method, URI and version.
pub fn split_request_line(line: &str) -> Result<[&str; 3], ParseError> {
    let tokens: Vec<&str> = line.trim_end().split(' ').collect();

    match tokens.as_slice() {
        [method, uri, version] => Ok([method.trim(), uri.trim(), version.trim()]),
        _ => Err(ParseError::StartLine(line.trim().to_string())),
    }
}

/// Splits a status line into version, numeric code and reason phrase.
///
/// The reason phrase is everything after the second space and may itself
/// contain spaces.
pub fn split_status_line(line: &str) -> Result<(&str, u16, &str), ParseError> {
    let mut parts = line.splitn(3, ' ');

    let (Some(version), Some(code), Some(reason)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(ParseError::StartLine(line.trim().to_string()));
    };

    let code = code.trim();
    let code = code
        .parse::<u16>()
        .map_err(|_| ParseError::StatusCode(code.to_string()))?;

    Ok((version.trim(), code, reason.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_split_on_first_blank_line() {
        let raw = "\n\nGET / HTTP/1.1\r\nHost: a\r\n\r\nline one  \r\nline two\r\n";
        let msg = parse_message(raw).unwrap();

        assert_eq!(msg.start_line, "GET / HTTP/1.1\r");
        assert_eq!(msg.headers.get("Host").unwrap(), "a");
        assert_eq!(msg.body, "line one\r\nline two");
    }

    #[test]
    fn status_line_keeps_spaces_in_reason() {
        let (version, code, reason) = split_status_line("HTTP/1.1 404 Not Found\r").unwrap();
        assert_eq!(version, "HTTP/1.1");
        assert_eq!(code, 404);
        assert_eq!(reason, "Not Found");
    }

    #[test]
    fn whitespace_only_is_empty() {
        assert_eq!(parse_message(" \r\n\t\n").unwrap_err(), ParseError::Empty);
    }
}
