//! End-to-end dispatch tests against a server on an ephemeral port.

use axum::http::StatusCode;
use serde_json::{json, Value as JsonValue};

use roots::config::{AppConfig, Environment};
use roots::http::middleware::bearer_token;
use roots::http::{Action, AppError, MiddlewareRegistry, Reply};
use roots::model::Model;
use roots::routing::RouteTable;

mod common;

struct Articles;

impl Model for Articles {
    const TABLE: &'static str = "articles";
    const PRIMARY_KEY: Option<&'static str> = Some("id");
}

fn config(views: &std::path::Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.application.views_dir = views.display().to_string();
    config
}

fn views() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    common::write_views(
        dir.path(),
        &[
            ("welcome.html", "<h1>Welcome</h1>"),
            ("product/edit.html", "Editing product {{id}}"),
            ("errors/404.html", "Nothing at this address"),
        ],
    );
    dir
}

fn table() -> RouteTable<Action> {
    let mut table = RouteTable::new();
    table.get("/", Action::view("welcome")).name("home");
    table
        .any("/product/{id}/edit", Action::view("product/edit"))
        .middleware("auth");
    table.get(
        "/function/{id}",
        Action::handler(|ctx| Ok(Reply::html(format!("id={}", ctx.param("id").unwrap_or(""))))),
    );
    table.get("/broken", Action::view("missing/view"));
    table.get("/secure", Action::view("welcome")).middleware("unregistered");
    table.get(
        "/fail",
        Action::handler(|_| Err(AppError::Handler("exploded".into()))),
    );
    table
}

fn middleware() -> MiddlewareRegistry {
    let mut registry = MiddlewareRegistry::new();
    registry.register("auth", bearer_token("secret"));
    registry
}

#[tokio::test]
async fn test_view_route_and_request_id() {
    let dir = views();
    let (addr, shutdown) = common::start_server(config(dir.path()), table(), middleware()).await;

    let res = reqwest::get(format!("http://{addr}/")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), "<h1>Welcome</h1>");

    shutdown.trigger();
}

#[tokio::test]
async fn test_any_pattern_with_middleware() {
    let dir = views();
    let (addr, shutdown) = common::start_server(config(dir.path()), table(), middleware()).await;
    let client = reqwest::Client::new();

    let denied = client
        .get(format!("http://{addr}/product/42/edit"))
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);

    let allowed = client
        .post(format!("http://{addr}/product/42/edit"))
        .header("authorization", "Bearer secret")
        .send()
        .await
        .unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);
    assert_eq!(allowed.text().await.unwrap(), "Editing product 42");

    shutdown.trigger();
}

#[tokio::test]
async fn test_handler_receives_params() {
    let dir = views();
    let (addr, shutdown) = common::start_server(config(dir.path()), table(), middleware()).await;

    let res = reqwest::get(format!("http://{addr}/function/7")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "id=7");

    shutdown.trigger();
}

#[tokio::test]
async fn test_not_found_paths() {
    let dir = views();
    let mut cfg = config(dir.path());
    cfg.responses.not_found_view = Some("errors/404".into());
    let (addr, shutdown) = common::start_server(cfg, table(), middleware()).await;

    let miss = reqwest::get(format!("http://{addr}/nowhere")).await.unwrap();
    assert_eq!(miss.status(), StatusCode::NOT_FOUND);
    assert_eq!(miss.text().await.unwrap(), "Nothing at this address");

    // trailing slash is a different path
    let slash = reqwest::get(format!("http://{addr}/function/7/")).await.unwrap();
    assert_eq!(slash.status(), StatusCode::NOT_FOUND);

    let missing_view = reqwest::get(format!("http://{addr}/broken")).await.unwrap();
    assert_eq!(missing_view.status(), StatusCode::NOT_FOUND);

    shutdown.trigger();
}

#[tokio::test]
async fn test_server_errors_respect_environment() {
    let dir = views();
    let (addr, shutdown) = common::start_server(config(dir.path()), table(), middleware()).await;

    let res = reqwest::get(format!("http://{addr}/secure")).await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.text().await.unwrap().contains("unregistered"));
    shutdown.trigger();

    let mut production = config(dir.path());
    production.application.environment = Environment::Production;
    let (addr, shutdown) = common::start_server(production, table(), middleware()).await;

    let res = reqwest::get(format!("http://{addr}/fail")).await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.text().await.unwrap(), "Internal Server Error");
    shutdown.trigger();
}

#[tokio::test]
async fn test_handler_queries_database() {
    let dir = views();
    let db = common::articles_database();

    let mut table = RouteTable::new();
    let list_db = db.clone();
    table.get(
        "/articles",
        Action::handler(move |_| {
            let rows = Articles::select(&list_db, ["id", "article_title"])?
                .order_asc(["id"])?
                .get_all()?;
            Reply::json(&rows)
        }),
    );
    let delete_db = db.clone();
    table.post(
        "/articles/{id}/delete",
        Action::handler(move |ctx| {
            let id: i64 = ctx.param("id").and_then(|id| id.parse().ok()).unwrap_or_default();
            let deleted = Articles::delete(&delete_db, id)?;
            Ok(Reply::Json(json!({ "deleted": deleted })))
        }),
    );

    let (addr, shutdown) =
        common::start_server(config(dir.path()), table, MiddlewareRegistry::new()).await;
    let client = reqwest::Client::new();

    let deleted: JsonValue = client
        .post(format!("http://{addr}/articles/2/delete"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(deleted, json!({ "deleted": true }));

    let rows: JsonValue = client
        .get(format!("http://{addr}/articles"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        rows,
        json!([
            { "id": 1, "article_title": "first" },
            { "id": 3, "article_title": "third" },
        ])
    );

    shutdown.trigger();
}
