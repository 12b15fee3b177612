//! Route registration.
//!
//! # Responsibilities
//! - Record `(method, template) -> handler` entries in registration order
//! - Attach an optional middleware name and route name to the last entry
//!
//! # Design Decisions
//! - Registration happens once at startup; the table is then frozen into a
//!   [`Router`](crate::routing::Router)
//! - Re-registering the same `(method, template)` replaces the handler but
//!   keeps the original position, middleware and name

use std::collections::HashMap;
use std::fmt;

use crate::routing::matcher::PatternError;
use crate::routing::router::Router;

/// The method a route is registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RouteMethod {
    Get,
    Post,
    /// Method-agnostic fallback.
    Any,
}

impl RouteMethod {
    /// Lookup order used when listing routes.
    pub const ALL: [RouteMethod; 3] = [RouteMethod::Get, RouteMethod::Post, RouteMethod::Any];

    /// Map an HTTP request method to the table it is looked up in.
    ///
    /// Methods other than GET and POST only ever reach `Any` routes.
    pub fn from_http(method: &str) -> Option<Self> {
        match method {
            "GET" => Some(RouteMethod::Get),
            "POST" => Some(RouteMethod::Post),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteMethod::Get => "GET",
            RouteMethod::Post => "POST",
            RouteMethod::Any => "ANY",
        }
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered route.
#[derive(Debug, Clone)]
pub struct RouteEntry<H> {
    pub method: RouteMethod,
    pub template: String,
    pub handler: H,
    pub middleware: Option<String>,
    pub name: Option<String>,
}

/// Mutable registry filled by route-definition code at startup.
#[derive(Debug)]
pub struct RouteTable<H> {
    routes: HashMap<RouteMethod, Vec<RouteEntry<H>>>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }
}

impl<H> RouteTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `method` and `template`.
    ///
    /// The returned builder attaches middleware and a name to this entry.
    pub fn register(
        &mut self,
        method: RouteMethod,
        template: impl Into<String>,
        handler: H,
    ) -> RouteBuilder<'_, H> {
        let template = template.into();
        let entries = self.routes.entry(method).or_default();

        let index = match entries.iter().position(|e| e.template == template) {
            Some(index) => {
                entries[index].handler = handler;
                index
            }
            None => {
                entries.push(RouteEntry {
                    method,
                    template,
                    handler,
                    middleware: None,
                    name: None,
                });
                entries.len() - 1
            }
        };

        RouteBuilder {
            entry: &mut entries[index],
        }
    }

    pub fn get(&mut self, template: impl Into<String>, handler: H) -> RouteBuilder<'_, H> {
        self.register(RouteMethod::Get, template, handler)
    }

    pub fn post(&mut self, template: impl Into<String>, handler: H) -> RouteBuilder<'_, H> {
        self.register(RouteMethod::Post, template, handler)
    }

    pub fn any(&mut self, template: impl Into<String>, handler: H) -> RouteBuilder<'_, H> {
        self.register(RouteMethod::Any, template, handler)
    }

    /// Entries registered under `method`, in registration order.
    pub fn entries(&self, method: RouteMethod) -> &[RouteEntry<H>] {
        self.routes.get(&method).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compile every template and freeze the table.
    pub fn into_router(self) -> Result<Router<H>, PatternError> {
        Router::from_table(self)
    }

    pub(crate) fn into_entries(self) -> HashMap<RouteMethod, Vec<RouteEntry<H>>> {
        self.routes
    }
}

/// Handle returned by registration for chained attachment calls.
pub struct RouteBuilder<'t, H> {
    entry: &'t mut RouteEntry<H>,
}

impl<H> RouteBuilder<'_, H> {
    /// Attach a middleware name, resolved by the dispatcher at request time.
    pub fn middleware(self, name: impl Into<String>) -> Self {
        self.entry.middleware = Some(name.into());
        self
    }

    /// Attach a route name.
    pub fn name(self, label: impl Into<String>) -> Self {
        self.entry.name = Some(label.into());
        self
    }
}
