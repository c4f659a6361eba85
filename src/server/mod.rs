//! Listener, shared per-server state and the request pipeline.

pub mod backoff;
pub mod listener;

use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, ConfigSource, SiteConfig};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::status::StatusCode;
use crate::routing::chain::Router;
use crate::routing::host::{select_root, RootSelection};
use crate::server::backoff::Backoff;
use crate::static_files;

pub use listener::{Server, ServerError};

/// Sent in the `Server` header of every response.
pub const SERVER_NAME: &str = "Easy-WWW";

/// Everything a connection task needs, shared behind an `Arc`.
pub struct Context {
    pub router: Router,
    pub config: Arc<dyn ConfigSource>,
    /// Template for the per-connection wait; cloned fresh for each socket.
    pub wait: Backoff,
    pub max_request_bytes: usize,
    pub response_timeout: Duration,
}

impl Context {
    pub fn new(config: Config, router: Router) -> Self {
        Self {
            router,
            wait: config.wait_backoff(),
            max_request_bytes: config.server.max_request_bytes,
            response_timeout: config.response_timeout(),
            config: Arc::new(config),
        }
    }

    /// Turns raw request text into the response to send back.
    ///
    /// Malformed input gets a 400 without touching the handler chain.
    pub async fn respond(&self, raw: &str) -> Response {
        let req = match Request::parse(raw) {
            Ok(req) => req,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed request");
                let mut res = Response::bad_request();
                res.set_header("Server", SERVER_NAME);
                return res;
            }
        };

        let mut res = Response::new();

        if !self.router.dispatch(&req, &mut res) {
            let site = SiteConfig::snapshot(self.config.as_ref());

            match select_root(req.host(), &req.uri, &site) {
                RootSelection::Serve(root) => static_files::serve(&root, &req.uri, &mut res).await,
                RootSelection::Redirect { location } => {
                    res.set_status(StatusCode::SeeOther);
                    res.set_header("Location", location);
                }
                RootSelection::Unrooted => {}
            }
        }

        res.set_header("Requested-URI", req.uri.as_str());
        res.set_header("Server", SERVER_NAME);

        tracing::debug!(
            method = %req.method,
            uri = %req.uri,
            host = %req.host(),
            status = res.status_code,
            "Request served"
        );

        res
    }
}
