use axum::http::StatusCode;
use serde_json::json;

use roots::db::Database;
use roots::fields;
use roots::http::AppError;
use roots::{Model, Reply, RequestContext};

use crate::app::models::Demo;

const HTML: &str = "text/html";

pub struct DemoController {
    db: Database,
}

impl DemoController {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn index(&self, ctx: &RequestContext) -> Result<Reply, AppError> {
        if !ctx.accepts(HTML) {
            tracing::warn!(request_id = %ctx.request_id(), "Client does not accept text/html");
        }
        Ok(Reply::view("demo/index").with("title", "Roots demo"))
    }

    /// Latest five articles, rendered into `demo/show`.
    pub fn show(&self, ctx: &RequestContext) -> Result<Reply, AppError> {
        if !ctx.accepts(HTML) {
            return Err(AppError::status_with(
                StatusCode::NOT_ACCEPTABLE,
                "unacceptable content type",
            ));
        }
        let latest = Demo::select(&self.db, ["*"])?
            .order_desc(["id"])?
            .limit(5, None)?
            .get_all()?;

        let titles: Vec<String> = latest
            .iter()
            .filter_map(|row| row.get("article_title"))
            .map(ToString::to_string)
            .collect();

        Ok(Reply::view("demo/show")
            .with("id", ctx.param("id").unwrap_or_default())
            .with("count", latest.len())
            .with("titles", titles.join(", ")))
    }

    pub fn list(&self, _ctx: &RequestContext) -> Result<Reply, AppError> {
        let rows = Demo::select(&self.db, ["id", "article_title", "content"])?
            .order_asc(["id"])?
            .get_all()?;
        Reply::json(&rows)
    }

    pub fn find(&self, ctx: &RequestContext) -> Result<Reply, AppError> {
        let id = article_id(ctx)?;
        let row = Demo::select(&self.db, ["*"])?.where_([("id", id)])?.get()?;
        match row {
            Some(row) => Reply::json(&row),
            None => Err(AppError::status_with(StatusCode::NOT_FOUND, "article not found")),
        }
    }

    pub fn create(&self, ctx: &RequestContext) -> Result<Reply, AppError> {
        let missing = ctx.missing_inputs(&["article_title"]);
        if !missing.is_empty() {
            return Err(AppError::status_with(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("missing inputs: {}", missing.join(", ")),
            ));
        }

        let created = Demo::insert(
            &self.db,
            fields! {
                "article_title" => ctx.input("article_title").unwrap_or_default(),
                "content" => ctx.input("content").unwrap_or_default(),
            },
        )?;
        Ok(Reply::Json(json!({ "created": created })))
    }

    pub fn update(&self, ctx: &RequestContext) -> Result<Reply, AppError> {
        let id = article_id(ctx)?;
        let mut changes = Vec::new();
        for field in ["article_title", "content"] {
            if let Some(value) = ctx.input(field) {
                changes.push((field, value.to_string()));
            }
        }
        if changes.is_empty() {
            return Err(AppError::status_with(
                StatusCode::UNPROCESSABLE_ENTITY,
                "nothing to update",
            ));
        }

        let updated = Demo::update(&self.db, changes)?.where_([("id", id)])?.set()?;
        Ok(Reply::Json(json!({ "updated": updated })))
    }

    pub fn destroy(&self, ctx: &RequestContext) -> Result<Reply, AppError> {
        let id = article_id(ctx)?;
        let deleted = Demo::delete(&self.db, id)?;
        Ok(Reply::Json(json!({ "deleted": deleted })))
    }
}

fn article_id(ctx: &RequestContext) -> Result<i64, AppError> {
    ctx.param("id")
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| AppError::status_with(StatusCode::NOT_FOUND, "article not found"))
}
