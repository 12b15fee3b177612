//! HTTP dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout, body limit)
//!     → request.rs (RequestContext: params, query, form, headers)
//!     → routing::Router::resolve (method + path → Action)
//!     → middleware.rs (named check, may answer early)
//!     → Action (view render, or handler on the blocking pool)
//!     → response.rs (Reply → Response), error.rs on failure
//! ```

pub mod error;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;
pub mod views;

use std::fmt;
use std::sync::Arc;

pub use error::AppError;
pub use middleware::{Middleware, MiddlewareRegistry};
pub use request::RequestContext;
pub use response::Reply;
pub use server::HttpServer;
pub use views::{ViewError, Views};

/// Handler signature for closure routes.
pub type HandlerFn = dyn Fn(&RequestContext) -> Result<Reply, AppError> + Send + Sync;

/// What a route does once matched.
#[derive(Clone)]
pub enum Action {
    /// Render the named view with the route params as data.
    View(String),
    /// Call a handler. It runs on the blocking pool since data access blocks.
    Handler(Arc<HandlerFn>),
}

impl Action {
    pub fn view(name: impl Into<String>) -> Self {
        Action::View(name.into())
    }

    pub fn handler<F>(f: F) -> Self
    where
        F: Fn(&RequestContext) -> Result<Reply, AppError> + Send + Sync + 'static,
    {
        Action::Handler(Arc::new(f))
    }

    /// Short label for route listings.
    pub fn describe(&self) -> String {
        match self {
            Action::View(name) => format!("view:{name}"),
            Action::Handler(_) => "handler".to_string(),
        }
    }
}

impl From<&str> for Action {
    fn from(name: &str) -> Self {
        Action::view(name)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::View(name) => f.debug_tuple("View").field(name).finish(),
            Action::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}
