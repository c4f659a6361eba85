use easy_www::http::request::{Request, RequestBuilder};
use std::collections::HashMap;

#[test]
fn test_request_header_retrieval() {
    let mut headers = HashMap::new();
    headers.insert("Host".to_string(), "example.com".to_string());
    headers.insert("Content-Type".to_string(), "application/json".to_string());

    let req = Request {
        method: "GET".to_string(),
        uri: "/".to_string(),
        version: "HTTP/1.1".to_string(),
        headers,
        body: String::new(),
    };

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("Content-Type"), Some("application/json"));
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_request_host_defaults_to_empty() {
    let req = RequestBuilder::new().method("GET").uri("/").build().unwrap();
    assert_eq!(req.host(), "");

    let req = RequestBuilder::new()
        .method("GET")
        .uri("/")
        .header("Host", "images.localhost")
        .build()
        .unwrap();
    assert_eq!(req.host(), "images.localhost");
}

#[test]
fn test_request_builder_requires_method_and_uri() {
    assert!(RequestBuilder::new().uri("/").build().is_err());
    assert!(RequestBuilder::new().method("GET").build().is_err());

    let req = RequestBuilder::new().method("GET").uri("/").build().unwrap();
    assert_eq!(req.version, "HTTP/1.1");
}

#[test]
fn test_request_serialization_layout() {
    let req = RequestBuilder::new()
        .method("POST")
        .uri("/api")
        .header("Host", "localhost")
        .body("payload")
        .build()
        .unwrap();

    let text = String::from_utf8(req.to_bytes()).unwrap();
    assert_eq!(text, "POST /api HTTP/1.1\r\nHost: localhost\r\n\r\npayload");
}

#[test]
fn test_request_serialization_without_body_is_trimmed() {
    let req = RequestBuilder::new().method("GET").uri("/").build().unwrap();
    assert_eq!(req.to_string(), "GET / HTTP/1.1");
}

#[test]
fn test_request_round_trip() {
    let raw = "\r\nDELETE /items/7?force=1 HTTP/1.1\r\nHost: api.local\r\nX-Trace: a:b\r\nAccept: */*\r\n\r\nline one\r\nline two\r\n";
    let parsed = Request::parse(raw).unwrap();
    let reparsed: Request = parsed.to_string().parse().unwrap();

    assert_eq!(reparsed, parsed);
    assert_eq!(reparsed.headers.len(), 3);
    assert_eq!(reparsed.body, "line one\r\nline two");
}
