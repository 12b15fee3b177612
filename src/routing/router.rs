//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Look up matching route for a method and path
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) exact lookup via HashMap, tried before any pattern
//! - O(n) pattern scan in registration order, first match wins
//! - Explicit "no handler" resolution rather than an error

use std::collections::HashMap;

use crate::routing::matcher::{PathPattern, PatternError, RouteParams};
use crate::routing::table::{RouteEntry, RouteMethod, RouteTable};

#[derive(Debug)]
struct CompiledRoute<H> {
    entry: RouteEntry<H>,
    pattern: PathPattern,
}

#[derive(Debug)]
struct MethodRoutes<H> {
    routes: Vec<CompiledRoute<H>>,
    exact: HashMap<String, usize>,
}

impl<H> Default for MethodRoutes<H> {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            exact: HashMap::new(),
        }
    }
}

impl<H> MethodRoutes<H> {
    fn exact(&self, path: &str) -> Option<&CompiledRoute<H>> {
        self.exact.get(path).map(|&index| &self.routes[index])
    }

    fn pattern(&self, path: &str) -> Option<(&CompiledRoute<H>, RouteParams)> {
        self.routes
            .iter()
            .filter(|route| !route.pattern.is_literal())
            .find_map(|route| route.pattern.matches(path).map(|params| (route, params)))
    }
}

/// Outcome of resolving a request.
///
/// A `None` handler means no route matched; the dispatcher turns that into a
/// not-found response.
#[derive(Debug)]
pub struct Resolution<'r, H> {
    pub handler: Option<&'r H>,
    pub middleware: Option<&'r str>,
    pub params: RouteParams,
    /// The template and name of the matched route, for logging.
    pub template: Option<&'r str>,
    pub name: Option<&'r str>,
}

impl<'r, H> Resolution<'r, H> {
    fn miss() -> Self {
        Self {
            handler: None,
            middleware: None,
            params: RouteParams::new(),
            template: None,
            name: None,
        }
    }

    fn hit(route: &'r CompiledRoute<H>, params: RouteParams) -> Self {
        Self {
            handler: Some(&route.entry.handler),
            middleware: route.entry.middleware.as_deref(),
            params,
            template: Some(route.entry.template.as_str()),
            name: route.entry.name.as_deref(),
        }
    }

    pub fn is_found(&self) -> bool {
        self.handler.is_some()
    }
}

/// Frozen route table.
#[derive(Debug)]
pub struct Router<H> {
    methods: HashMap<RouteMethod, MethodRoutes<H>>,
    named: HashMap<String, (RouteMethod, usize)>,
}

impl<H> Router<H> {
    /// Compile every registered template.
    pub fn from_table(table: RouteTable<H>) -> Result<Self, PatternError> {
        let mut methods = HashMap::new();
        let mut named = HashMap::new();

        let mut entries = table.into_entries();
        for method in RouteMethod::ALL {
            let Some(list) = entries.remove(&method) else {
                continue;
            };

            let mut compiled = MethodRoutes::default();
            for entry in list {
                let pattern = PathPattern::compile(&entry.template)?;
                let index = compiled.routes.len();
                compiled.exact.insert(entry.template.clone(), index);
                if let Some(name) = &entry.name {
                    named.entry(name.clone()).or_insert((method, index));
                }
                compiled.routes.push(CompiledRoute { entry, pattern });
            }
            methods.insert(method, compiled);
        }

        let router = Self { methods, named };
        tracing::debug!(routes = router.len(), "Route table compiled");
        Ok(router)
    }

    /// Resolve a request method and path.
    ///
    /// Lookup order, first success wins:
    /// 1. exact template under the request method, then under `ANY`
    /// 2. patterns under the request method, in registration order
    /// 3. patterns under `ANY`, in registration order
    pub fn resolve(&self, method: &str, path: &str) -> Resolution<'_, H> {
        let specific = RouteMethod::from_http(method).and_then(|m| self.methods.get(&m));
        let any = self.methods.get(&RouteMethod::Any);

        let exact = specific
            .and_then(|routes| routes.exact(path))
            .or_else(|| any.and_then(|routes| routes.exact(path)));
        if let Some(route) = exact {
            return Resolution::hit(route, RouteParams::new());
        }

        let matched = specific
            .and_then(|routes| routes.pattern(path))
            .or_else(|| any.and_then(|routes| routes.pattern(path)));
        match matched {
            Some((route, params)) => Resolution::hit(route, params),
            None => Resolution::miss(),
        }
    }

    /// Build the path of a named route.
    ///
    /// When several routes share a name, the first registered wins.
    pub fn url_for(&self, name: &str, params: &RouteParams) -> Option<String> {
        let (method, index) = self.named.get(name)?;
        let route = self.methods.get(method)?.routes.get(*index)?;
        route.pattern.expand(params)
    }

    /// All routes, grouped by method (GET, POST, ANY) in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteEntry<H>> {
        RouteMethod::ALL.into_iter().flat_map(move |method| {
            self.methods
                .get(&method)
                .into_iter()
                .flat_map(|routes| routes.routes.iter().map(|r| &r.entry))
        })
    }

    pub fn len(&self) -> usize {
        self.methods.values().map(|m| m.routes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router(build: impl FnOnce(&mut RouteTable<&'static str>)) -> Router<&'static str> {
        let mut table = RouteTable::new();
        build(&mut table);
        table.into_router().unwrap()
    }

    #[test]
    fn test_any_fallback_extracts_params() {
        let router = router(|t| {
            t.get("/product", "product").middleware("account");
            t.any("/product/{id}/edit", "edit").middleware("auth");
        });

        let res = router.resolve("GET", "/product/42/edit");
        assert_eq!(res.handler, Some(&"edit"));
        assert_eq!(res.middleware, Some("auth"));
        assert_eq!(res.params.get("id"), Some("42"));
        assert_eq!(res.params.len(), 1);
    }

    #[test]
    fn test_exact_match_beats_earlier_pattern() {
        let router = router(|t| {
            t.get("/demo/{id}", "pattern");
            t.get("/demo/index", "exact");
        });

        let res = router.resolve("GET", "/demo/index");
        assert_eq!(res.handler, Some(&"exact"));
        assert!(res.params.is_empty());

        let res = router.resolve("GET", "/demo/7");
        assert_eq!(res.handler, Some(&"pattern"));
    }

    #[test]
    fn test_exact_any_beats_method_pattern() {
        let router = router(|t| {
            t.get("/a/{x}", "pattern");
            t.any("/a/b", "any-exact");
        });
        assert_eq!(router.resolve("GET", "/a/b").handler, Some(&"any-exact"));
    }

    #[test]
    fn test_first_registered_pattern_wins() {
        let first = router(|t| {
            t.get("/a/{x}/edit", "first");
            t.get("/a/{y}/{action}", "second");
        });
        let res = first.resolve("GET", "/a/5/edit");
        assert_eq!(res.handler, Some(&"first"));
        assert_eq!(res.params.get("x"), Some("5"));

        let swapped = router(|t| {
            t.get("/a/{y}/{action}", "second");
            t.get("/a/{x}/edit", "first");
        });
        let res = swapped.resolve("GET", "/a/5/edit");
        assert_eq!(res.handler, Some(&"second"));
        assert_eq!(res.params.get("action"), Some("edit"));
    }

    #[test]
    fn test_method_patterns_before_any_patterns() {
        let router = router(|t| {
            t.any("/item/{id}", "any");
            t.post("/item/{id}", "post");
        });
        assert_eq!(router.resolve("POST", "/item/1").handler, Some(&"post"));
        assert_eq!(router.resolve("GET", "/item/1").handler, Some(&"any"));
        assert_eq!(router.resolve("DELETE", "/item/1").handler, Some(&"any"));
    }

    #[test]
    fn test_miss_is_not_an_error() {
        let router = router(|t| {
            t.get("/article/{id}/show", "show");
        });
        let res = router.resolve("GET", "/article/1/show/");
        assert!(!res.is_found());
        assert!(res.middleware.is_none());
        assert!(res.params.is_empty());

        // registered under GET only
        assert!(!router.resolve("POST", "/article/1/show").is_found());
    }

    #[test]
    fn test_url_for() {
        let router = router(|t| {
            t.get("/", "welcome").name("home");
            t.get("/demo/{id}/show", "show").name("demo show");
            t.get("/function/{id}", "fn").name("home");
        });

        let params: RouteParams = [("id", "9")].into_iter().collect();
        assert_eq!(router.url_for("demo show", &params).as_deref(), Some("/demo/9/show"));
        assert_eq!(router.url_for("home", &RouteParams::new()).as_deref(), Some("/"));
        assert!(router.url_for("missing", &params).is_none());
    }

    #[test]
    fn test_invalid_template_fails_compilation() {
        let mut table = RouteTable::new();
        table.get("/x/{id}/{id}", "dup");
        assert!(table.into_router().is_err());
    }

    #[test]
    fn test_routes_listing() {
        let router = router(|t| {
            t.any("/z", "z");
            t.post("/y", "y");
            t.get("/x", "x");
        });
        let listed: Vec<_> = router.routes().map(|e| e.template.as_str()).collect();
        assert_eq!(listed, vec!["/x", "/y", "/z"]);
    }
}
