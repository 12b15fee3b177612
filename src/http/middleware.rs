//! Named route middleware.
//!
//! Routes refer to middleware by name; the registry maps names to
//! implementations. A middleware either lets the request through (`None`)
//! or answers it directly (`Some(reply)`), e.g. with a redirect or a 401.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::http::request::RequestContext;
use crate::http::response::Reply;

pub trait Middleware: Send + Sync {
    fn handle(&self, ctx: &RequestContext) -> Option<Reply>;
}

impl<F> Middleware for F
where
    F: Fn(&RequestContext) -> Option<Reply> + Send + Sync,
{
    fn handle(&self, ctx: &RequestContext) -> Option<Reply> {
        self(ctx)
    }
}

#[derive(Default, Clone)]
pub struct MiddlewareRegistry {
    entries: HashMap<String, Arc<dyn Middleware>>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `middleware` under `name`, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, middleware: impl Middleware + 'static) {
        self.entries.insert(name.into(), Arc::new(middleware));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Middleware>> {
        self.entries.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("MiddlewareRegistry").field("names", &names).finish()
    }
}

/// Bearer-token check against `api_key`. An empty key rejects everything.
pub fn bearer_token(api_key: impl Into<String>) -> impl Middleware {
    let expected = format!("Bearer {}", api_key.into());
    let enabled = expected.len() > "Bearer ".len();
    move |ctx: &RequestContext| {
        let authorized = enabled && ctx.header("authorization") == Some(expected.as_str());
        if authorized {
            None
        } else {
            Some(Reply::text(
                axum::http::StatusCode::UNAUTHORIZED,
                "Unauthorized",
            ))
        }
    }
}
