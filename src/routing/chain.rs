//! Prefix handler chain.
//!
//! Handlers are registered against URI prefixes on a [`RouterBuilder`] and
//! frozen into a [`Router`] before the server starts. The router is shared
//! read-only by every connection, so it has no way to add or remove
//! handlers; reconfiguring means building a new one with
//! [`Router::to_builder`].

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::http::request::Request;
use crate::http::response::Response;

/// Something that can answer requests under a URI prefix.
pub trait Handler: Send + Sync {
    /// Inspects `req` and fills in `res`.
    ///
    /// Returns `true` when the request is fully handled. Returning `false`
    /// passes the same response on to the next matching prefix.
    fn handle(&self, req: &Request, res: &mut Response) -> bool;
}

impl<F> Handler for F
where
    F: Fn(&Request, &mut Response) -> bool + Send + Sync,
{
    fn handle(&self, req: &Request, res: &mut Response) -> bool {
        self(req, res)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("a handler is already registered for {0:?}")]
    Duplicate(String),
    #[error("no handler is registered for {0:?}")]
    NotRegistered(String),
}

/// Map key ordering prefixes longest first, then descending lexicographically.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Prefix(String);

impl Ord for Prefix {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .len()
            .cmp(&self.0.len())
            .then_with(|| other.0.cmp(&self.0))
    }
}

impl PartialOrd for Prefix {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Mutable set of prefix handlers.
#[derive(Default)]
pub struct RouterBuilder {
    handlers: BTreeMap<Prefix, Arc<dyn Handler>>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `handler` for requests whose URI starts with `prefix`.
    pub fn register(
        &mut self,
        prefix: impl Into<String>,
        handler: impl Handler + 'static,
    ) -> Result<(), RegistrationError> {
        self.insert(prefix.into(), Arc::new(handler))
    }

    /// Chaining form of [`register`](Self::register).
    pub fn with(
        mut self,
        prefix: impl Into<String>,
        handler: impl Handler + 'static,
    ) -> Result<Self, RegistrationError> {
        self.register(prefix, handler)?;
        Ok(self)
    }

    pub fn unregister(&mut self, prefix: &str) -> Result<(), RegistrationError> {
        self.handlers
            .remove(&Prefix(prefix.to_string()))
            .map(|_| ())
            .ok_or_else(|| RegistrationError::NotRegistered(prefix.to_string()))
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.handlers.contains_key(&Prefix(prefix.to_string()))
    }

    pub fn build(self) -> Router {
        Router {
            entries: self
                .handlers
                .into_iter()
                .map(|(prefix, handler)| (prefix.0, handler))
                .collect(),
        }
    }

    fn insert(&mut self, prefix: String, handler: Arc<dyn Handler>) -> Result<(), RegistrationError> {
        let key = Prefix(prefix);
        if self.handlers.contains_key(&key) {
            return Err(RegistrationError::Duplicate(key.0));
        }
        self.handlers.insert(key, handler);
        Ok(())
    }
}

/// Frozen handler chain, in dispatch order.
#[derive(Clone, Default)]
pub struct Router {
    entries: Vec<(String, Arc<dyn Handler>)>,
}

impl Router {
    /// Registered prefixes in the order they are offered requests.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(prefix, _)| prefix.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Offers the request to every handler whose prefix starts the URI,
    /// most specific first, until one reports it handled the request.
    ///
    /// Prefix matching is by characters, not path segments: `/api` matches
    /// `/apiary`.
    pub fn dispatch(&self, req: &Request, res: &mut Response) -> bool {
        for (prefix, handler) in &self.entries {
            if !req.uri.starts_with(prefix.as_str()) {
                continue;
            }

            if handler.handle(req, res) {
                tracing::trace!(prefix = %prefix, uri = %req.uri, "Request handled");
                return true;
            }
        }

        false
    }

    /// A builder holding the same handlers, for assembling a new router.
    pub fn to_builder(&self) -> RouterBuilder {
        let mut builder = RouterBuilder::new();
        for (prefix, handler) in &self.entries {
            builder
                .handlers
                .insert(Prefix(prefix.clone()), Arc::clone(handler));
        }
        builder
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.prefixes()).finish()
    }
}
