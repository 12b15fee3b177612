//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route registration (at startup):
//!     table.get / post / any (template, handler)
//!     → .middleware(name) / .name(label)
//!     → RouteTable (registration order kept per method)
//!     → into_router(): compile templates, freeze as immutable Router
//!
//! Incoming Request (method, path)
//!     → router.rs (exact lookup, then pattern scan)
//!     → matcher.rs (template match + parameter extraction)
//!     → Return: Resolution { handler, middleware, params }
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Exact string match always beats a pattern match
//! - First registered pattern wins
//! - Handler type is generic; the HTTP layer uses `http::Action`

pub mod matcher;
pub mod router;
pub mod table;

pub use matcher::{PathPattern, PatternError, RouteParams};
pub use router::{Resolution, Router};
pub use table::{RouteBuilder, RouteEntry, RouteMethod, RouteTable};
