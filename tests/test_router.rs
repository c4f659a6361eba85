use easy_www::http::request::{Request, RequestBuilder};
use easy_www::http::response::Response;
use easy_www::routing::{Handler, RegistrationError, Router, RouterBuilder};
use std::sync::{Arc, Mutex};

fn get(uri: &str) -> Request {
    RequestBuilder::new().method("GET").uri(uri).build().unwrap()
}

/// Records the prefix it was registered under and answers with `handled`.
struct Recorder {
    name: &'static str,
    handled: bool,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl Handler for Recorder {
    fn handle(&self, _req: &Request, res: &mut Response) -> bool {
        self.log.lock().unwrap().push(self.name);
        res.set_text(self.name);
        self.handled
    }
}

fn router_with(prefixes: &[&'static str], handled: bool) -> (Router, Arc<Mutex<Vec<&'static str>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut builder = RouterBuilder::new();
    for &name in prefixes {
        builder
            .register(name, Recorder { name, handled, log: Arc::clone(&log) })
            .unwrap();
    }
    (builder.build(), log)
}

#[test]
fn test_order_is_longest_first_then_descending() {
    let (router, _) = router_with(&["/f", "/abc", "/xyz", "/abcdef", "/"], false);
    let order: Vec<&str> = router.prefixes().collect();

    assert_eq!(order, vec!["/abcdef", "/xyz", "/abc", "/f", "/"]);
}

#[test]
fn test_order_is_independent_of_registration_order() {
    let prefixes = ["/", "/api/", "/api/v1/", "/static/", "/b", "/a"];
    let (forward, _) = router_with(&prefixes, false);

    let mut reversed = prefixes;
    reversed.reverse();
    let (backward, _) = router_with(&reversed, false);

    assert_eq!(
        forward.prefixes().collect::<Vec<_>>(),
        backward.prefixes().collect::<Vec<_>>()
    );
}

#[test]
fn test_dispatch_stops_at_first_handler_that_answers() {
    let (router, log) = router_with(&["/", "/api/", "/api/v1/"], true);
    let mut res = Response::new();

    assert!(router.dispatch(&get("/api/v1/users"), &mut res));
    assert_eq!(*log.lock().unwrap(), vec!["/api/v1/"]);
    assert_eq!(res.text(), Some("/api/v1/"));
}

#[test]
fn test_dispatch_falls_through_declining_handlers() {
    let (router, log) = router_with(&["/", "/api/", "/other/"], false);
    let mut res = Response::new();

    assert!(!router.dispatch(&get("/api/x"), &mut res));
    assert_eq!(*log.lock().unwrap(), vec!["/api/", "/"]);
    // The last handler's edits remain on the shared response
    assert_eq!(res.text(), Some("/"));
}

#[test]
fn test_prefix_match_is_by_character() {
    let (router, log) = router_with(&["/api"], false);
    let mut res = Response::new();

    router.dispatch(&get("/apiary"), &mut res);
    router.dispatch(&get("/ap"), &mut res);

    assert_eq!(*log.lock().unwrap(), vec!["/api"]);
}

#[test]
fn test_no_match_leaves_response_untouched() {
    let (router, _) = router_with(&["/api/"], true);
    let mut res = Response::new();

    assert!(!router.dispatch(&get("/index.html"), &mut res));
    assert_eq!(res, Response::new());
}

#[test]
fn test_closures_are_handlers() {
    let mut builder = RouterBuilder::new();
    builder
        .register("/hello", |req: &Request, res: &mut Response| {
            res.set_text(format!("hello from {}", req.uri));
            true
        })
        .unwrap();
    let router = builder.build();

    let mut res = Response::new();
    assert!(router.dispatch(&get("/hello/world"), &mut res));
    assert_eq!(res.text(), Some("hello from /hello/world"));
}

#[test]
fn test_duplicate_registration_is_rejected() {
    let mut builder = RouterBuilder::new();
    let ok = |_: &Request, _: &mut Response| true;

    assert_eq!(builder.register("/a", ok), Ok(()));
    assert_eq!(
        builder.register("/a", ok),
        Err(RegistrationError::Duplicate("/a".to_string()))
    );
    assert_eq!(builder.build().len(), 1);
}

#[test]
fn test_unregister() {
    let mut builder = RouterBuilder::new();
    builder.register("/a", |_: &Request, _: &mut Response| true).unwrap();

    assert_eq!(
        builder.unregister("/b"),
        Err(RegistrationError::NotRegistered("/b".to_string()))
    );
    assert_eq!(builder.unregister("/a"), Ok(()));
    assert!(!builder.contains("/a"));
    assert!(builder.build().is_empty());
}

#[test]
fn test_to_builder_keeps_handlers() {
    let (router, log) = router_with(&["/a", "/bb"], true);

    let mut builder = router.to_builder();
    assert!(builder.contains("/a"));
    builder.unregister("/bb").unwrap();
    let rebuilt = builder.build();

    assert_eq!(rebuilt.prefixes().collect::<Vec<_>>(), vec!["/a"]);
    assert_eq!(router.len(), 2);

    let mut res = Response::new();
    assert!(rebuilt.dispatch(&get("/a"), &mut res));
    assert_eq!(*log.lock().unwrap(), vec!["/a"]);
}
