use easy_www::http::response::{Body, Response, MISSING_REASON};
use easy_www::http::status::{StatusClass, StatusCode};

fn split_head(bytes: &[u8]) -> (String, Vec<u8>) {
    let end = bytes
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("header terminator");
    (
        String::from_utf8(bytes[..end].to_vec()).unwrap(),
        bytes[end + 4..].to_vec(),
    )
}

#[test]
fn test_response_defaults_to_not_implemented() {
    let res = Response::new();

    assert_eq!(res.status_code, 501);
    assert_eq!(res.status_message, "Not Implemented");
    assert_eq!(res.body(), &Body::Text(String::new()));
    assert!(res.headers.is_empty());
    assert_eq!(res.status_class(), StatusClass::ServerError);
}

#[test]
fn test_response_set_status() {
    let mut res = Response::new();
    res.set_status(StatusCode::SeeOther);

    assert_eq!(res.status_code, 303);
    assert_eq!(res.status_message, "See Other");
    assert_eq!(res.status_class(), StatusClass::Redirection);

    res.set_custom_status(299, "Mostly Fine");
    assert_eq!(res.status_class(), StatusClass::Success);
}

#[test]
fn test_response_html_and_text_set_content_type() {
    let mut res = Response::new();

    res.set_html("<h1>hi</h1>");
    assert_eq!(res.header("Content-Type"), Some("text/html; charset=utf-8"));
    assert_eq!(res.text(), Some("<h1>hi</h1>"));

    res.set_text("plain");
    assert_eq!(res.header("Content-Type"), Some("text/plain; charset=utf-8"));
}

#[test]
fn test_response_bodies_are_exclusive() {
    let mut res = Response::new();
    res.set_text("text");
    res.set_binary(vec![1, 2, 3]);

    assert_eq!(res.text(), None);
    assert_eq!(res.body(), &Body::Binary(vec![1, 2, 3]));

    res.set_html("back to text");
    assert_eq!(res.text(), Some("back to text"));
}

#[test]
fn test_response_header_management() {
    let mut res = Response::new();
    res.set_header("X-Custom", "one");
    res.set_header("X-Custom", "two");
    assert_eq!(res.header("X-Custom"), Some("two"));

    res.remove_header("X-Custom");
    assert_eq!(res.header("X-Custom"), None);
}

#[test]
fn test_response_text_serialization() {
    let mut res = Response::new();
    res.set_status(StatusCode::NotFound);
    res.set_html("missing");

    let (head, body) = split_head(&res.to_bytes());
    let mut lines = head.split("\r\n");

    assert_eq!(lines.next(), Some("HTTP/1.1 404 Not Found"));
    assert!(lines.any(|l| l == "Content-Type: text/html; charset=utf-8"));
    assert!(!head.contains("Content-Length"));
    assert_eq!(body, b"missing");
}

#[test]
fn test_response_binary_serialization_appends_raw_bytes() {
    let payload = vec![0xff, 0x00, 0xfe, b'\r', b'\n'];
    let mut res = Response::new();
    res.set_status(StatusCode::Ok);
    res.set_content_type("image/png");
    res.set_binary(payload.clone());

    let (head, body) = split_head(&res.to_bytes());

    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(head.contains("Content-Length: 5"));
    assert!(head.contains("Content-Type: image/png; charset=utf-8"));
    assert_eq!(body, payload);
}

#[test]
fn test_response_missing_reason_uses_placeholder() {
    let mut res = Response::new();
    res.set_custom_status(299, "");

    let text = res.to_string();
    assert!(text.starts_with(&format!("HTTP/1.1 299 {}\r\n", MISSING_REASON)));
}

#[test]
fn test_response_round_trip() {
    let mut res = Response::new();
    res.set_status(StatusCode::Ok);
    res.set_header("Server", "Easy-WWW");
    res.set_html("<p>a</p>\r\n<p>b</p>");

    let reparsed = Response::parse(&res.to_string()).unwrap();
    assert_eq!(reparsed, res);
}

#[test]
fn test_bad_request_helper() {
    let res = Response::bad_request();

    assert_eq!(res.status_code, 400);
    assert_eq!(res.text(), Some("<h1>BAD REQUEST</h1>"));
}
