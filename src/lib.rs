//! Roots: a small MVC web framework.
//!
//! Route resolution, a fluent query builder over a transactional executor,
//! and the HTTP dispatch around them.

// Core subsystems
pub mod config;
pub mod db;
pub mod http;
pub mod model;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::{AppConfig, Configuration};
pub use db::Database;
pub use http::{Action, HttpServer, Reply, RequestContext};
pub use lifecycle::{Application, Shutdown};
pub use model::{Model, Query};
pub use routing::{RouteTable, Router};
