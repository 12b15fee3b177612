//! Errors at the HTTP boundary.
//!
//! Every error a handler or the dispatcher can hit maps to a status code.
//! In development the response body carries the error message; in
//! production clients only see the status reason. When an error view is
//! configured it is rendered with `status` and `message` data instead.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use crate::config::Environment;
use crate::db::DbError;
use crate::http::views::{ViewError, Views};
use crate::model::{NotExecuted, QueryError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("no route for {method} {path}")]
    NotFound { method: String, path: String },

    #[error("middleware '{0}' is not registered")]
    MissingMiddleware(String),

    #[error("redirect location '{0}' is not a valid header value")]
    InvalidRedirect(String),

    #[error("handler task failed: {0}")]
    Handler(String),

    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error(transparent)]
    View(#[from] ViewError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    NotExecuted(#[from] NotExecuted),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// An error with an explicit status, e.g. a 422 from input checks.
    pub fn status_with(status: StatusCode, message: impl Into<String>) -> Self {
        AppError::Status {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::View(ViewError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Status { status, .. } => *status,
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::MissingMiddleware(_)
            | AppError::InvalidRedirect(_)
            | AppError::Handler(_)
            | AppError::View(_)
            | AppError::Query(_)
            | AppError::NotExecuted(_)
            | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show a client in `environment`.
    pub fn public_message(&self, environment: Environment) -> String {
        if environment.is_development() {
            self.to_string()
        } else {
            self.status()
                .canonical_reason()
                .unwrap_or("Error")
                .to_string()
        }
    }
}

/// Response for `err`, through `error_view` when one is configured.
pub fn render_error(
    err: &AppError,
    environment: Environment,
    views: &Views,
    error_view: Option<&str>,
) -> Response {
    let status = err.status();
    let message = err.public_message(environment);

    if let Some(view) = error_view {
        let mut data = Map::new();
        data.insert("status".into(), JsonValue::from(status.as_u16()));
        data.insert("message".into(), JsonValue::String(message.clone()));
        match views.render(view, &data) {
            Ok(body) => return (status, Html(body)).into_response(),
            Err(e) => tracing::error!(view = %view, error = %e, "Error view failed to render"),
        }
    }

    (status, message).into_response()
}

impl IntoResponse for AppError {
    /// Production-safe rendering: status plus its reason phrase.
    fn into_response(self) -> Response {
        let status = self.status();
        (status, self.public_message(Environment::Production)).into_response()
    }
}
