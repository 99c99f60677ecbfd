use std::collections::HashMap;
use std::sync::Arc;

use crate::http::request::{Method, Request};
use crate::http::response::Response;

/// Produces a response for a request.
///
/// Handlers get the request by shared reference and run directly on the
/// connection's async task, so they must not block or do file or network
/// I/O. Any `Fn(&Request) -> Response` closure is a handler.
pub trait Handler: Send + Sync {
    fn handle(&self, request: &Request) -> Response;
}

impl<F> Handler for F
where
    F: Fn(&Request) -> Response + Send + Sync,
{
    fn handle(&self, request: &Request) -> Response {
        self(request)
    }
}

/// Exact-match dispatch on (method, path).
///
/// GET and POST keep independent tables. Paths are compared literally, query
/// string included. Everything that misses, and every other method, goes to
/// the not-found handler.
pub struct Router {
    get: HashMap<String, Arc<dyn Handler>>,
    post: HashMap<String, Arc<dyn Handler>>,
    not_found: Arc<dyn Handler>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates an empty router whose not-found handler answers with a plain
    /// 404.
    pub fn new() -> Self {
        Self {
            get: HashMap::new(),
            post: HashMap::new(),
            not_found: Arc::new(|_: &Request| Response::not_found()),
        }
    }

    /// Registers a GET handler. A later registration for the same path wins.
    pub fn get(mut self, path: impl Into<String>, handler: impl Handler + 'static) -> Self {
        self.get.insert(path.into(), Arc::new(handler));
        self
    }

    /// Registers a POST handler. A later registration for the same path wins.
    pub fn post(mut self, path: impl Into<String>, handler: impl Handler + 'static) -> Self {
        self.post.insert(path.into(), Arc::new(handler));
        self
    }

    pub fn not_found(mut self, handler: impl Handler + 'static) -> Self {
        self.not_found = Arc::new(handler);
        self
    }

    /// Resolves the handler for `method` and `path`.
    pub fn route(&self, method: Method, path: &str) -> Arc<dyn Handler> {
        let table = match method {
            Method::GET => &self.get,
            Method::POST => &self.post,
            Method::UNKNOWN => return Arc::clone(&self.not_found),
        };

        match table.get(path) {
            Some(handler) => {
                tracing::debug!(method = %method, path, "Route matched");
                Arc::clone(handler)
            }
            None => {
                tracing::debug!(method = %method, path, "No route, using not-found handler");
                Arc::clone(&self.not_found)
            }
        }
    }

    /// Routes the request and runs the resolved handler.
    pub fn dispatch(&self, request: &Request) -> Response {
        self.route(request.method, &request.path).handle(request)
    }

    /// Number of registered (method, path) routes.
    pub fn len(&self) -> usize {
        self.get.len() + self.post.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
