//! Demo application: an articles model, its controller, the `auth`
//! middleware and the route definitions.

pub mod controllers;
pub mod middleware;
pub mod models;

use std::sync::Arc;

use roots::db::Database;
use roots::http::{AppError, MiddlewareRegistry};
use roots::{Action, Configuration, Reply, RequestContext, RouteTable};

use controllers::DemoController;

type ControllerFn = fn(&DemoController, &RequestContext) -> Result<Reply, AppError>;

fn to(controller: &Arc<DemoController>, method: ControllerFn) -> Action {
    let controller = Arc::clone(controller);
    Action::handler(move |ctx| method(&controller, ctx))
}

/// Register the application's middleware.
pub fn middleware(config: &Configuration) -> MiddlewareRegistry {
    let mut registry = MiddlewareRegistry::new();
    registry.register("auth", middleware::auth(&config.app().application.api_key));
    registry
}

/// Register the application's routes.
pub fn routes(db: &Database) -> RouteTable<Action> {
    let demo = Arc::new(DemoController::new(db.clone()));
    let mut routes = RouteTable::new();

    routes.get("/", Action::view("welcome")).name("home");
    routes
        .get(
            "/function/{id}",
            Action::handler(|ctx| {
                let id = ctx.param("id").unwrap_or_default();
                Ok(Reply::html(format!("Function callback and id: {id}")))
            }),
        )
        .name("function");

    routes.get("/demo/index", to(&demo, DemoController::index)).name("demo index");
    routes.get("/demo/form", Action::view("demo/form")).name("demo form");
    routes.get("/demo/{id}/show", to(&demo, DemoController::show)).name("demo show");
    routes.get("/article/{id}/show", Action::view("article/show")).name("article show");

    routes.get("/articles", to(&demo, DemoController::list)).name("articles");
    routes.get("/articles/{id}", to(&demo, DemoController::find)).name("article");
    routes
        .post("/articles", to(&demo, DemoController::create))
        .middleware("auth")
        .name("article create");
    routes
        .post("/articles/{id}", to(&demo, DemoController::update))
        .middleware("auth")
        .name("article update");
    routes
        .post("/articles/{id}/delete", to(&demo, DemoController::destroy))
        .middleware("auth")
        .name("article delete");

    routes.get("/product", Action::view("product")).name("product");
    routes
        .any("/product/{id}/edit", Action::view("product/edit"))
        .middleware("auth");

    routes.get("/login", Action::view("login")).name("login");
    routes
}
