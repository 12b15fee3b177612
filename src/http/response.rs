//! Handler replies and their conversion into HTTP responses.
//!
//! # Responsibilities
//! - Describe what a handler or middleware wants sent back
//! - Render views and serialise JSON at the HTTP boundary
//!
//! # Design Decisions
//! - Rendering needs the `Views` renderer, so `Reply` is converted by the
//!   server rather than through `IntoResponse`
//! - A reply naming a missing view becomes a 404

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::http::error::AppError;
use crate::http::views::Views;
use crate::routing::RouteParams;

/// What to send back for a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Html(String),
    Json(JsonValue),
    View {
        name: String,
        data: Map<String, JsonValue>,
        status: StatusCode,
    },
    Redirect {
        location: String,
        status: StatusCode,
    },
    Text {
        status: StatusCode,
        body: String,
    },
}

impl Reply {
    pub fn html(body: impl Into<String>) -> Self {
        Reply::Html(body.into())
    }

    /// Serialise `value` as the JSON body.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, AppError> {
        Ok(Reply::Json(serde_json::to_value(value)?))
    }

    pub fn view(name: impl Into<String>) -> Self {
        Reply::View {
            name: name.into(),
            data: Map::new(),
            status: StatusCode::OK,
        }
    }

    /// Add a value to a `View` reply. Other variants are returned unchanged.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        if let Reply::View { data, .. } = &mut self {
            data.insert(key.into(), value.into());
        }
        self
    }

    /// Set the status of a `View`, `Redirect` or `Text` reply.
    pub fn with_status(mut self, code: StatusCode) -> Self {
        match &mut self {
            Reply::View { status, .. }
            | Reply::Redirect { status, .. }
            | Reply::Text { status, .. } => *status = code,
            Reply::Html(_) | Reply::Json(_) => {}
        }
        self
    }

    /// Permanent redirect (301).
    pub fn redirect(location: impl Into<String>) -> Self {
        Reply::Redirect {
            location: location.into(),
            status: StatusCode::MOVED_PERMANENTLY,
        }
    }

    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Reply::Text {
            status,
            body: body.into(),
        }
    }

    /// Convert into a response, rendering views from `views`.
    pub fn render(self, views: &Views) -> Result<Response, AppError> {
        let response = match self {
            Reply::Html(body) => Html(body).into_response(),
            Reply::Json(value) => axum::Json(value).into_response(),
            Reply::View { name, data, status } => {
                let body = views.render(&name, &data)?;
                (status, Html(body)).into_response()
            }
            Reply::Redirect { location, status } => {
                let value = HeaderValue::from_str(&location)
                    .map_err(|_| AppError::InvalidRedirect(location.clone()))?;
                let mut response = status.into_response();
                response.headers_mut().insert(header::LOCATION, value);
                response
            }
            Reply::Text { status, body } => (status, body).into_response(),
        };
        Ok(response)
    }
}

impl From<String> for Reply {
    fn from(body: String) -> Self {
        Reply::Html(body)
    }
}

impl From<&str> for Reply {
    fn from(body: &str) -> Self {
        Reply::Html(body.to_string())
    }
}

/// Route params as view data, for string actions.
pub fn params_data(params: &RouteParams) -> Map<String, JsonValue> {
    params
        .iter()
        .map(|(name, value)| (name.to_string(), JsonValue::String(value.to_string())))
        .collect()
}
