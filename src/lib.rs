//! Easy-WWW - minimal static HTTP/1.1 server
//!
//! Prefix handlers first, then virtual-host aware static file serving.

pub mod config;
pub mod http;
pub mod routing;
pub mod server;
pub mod static_files;
