//! Request context handed to middleware and handlers.
//!
//! # Responsibilities
//! - Carry the resolved route params and request ID
//! - Decode the query string and urlencoded form bodies
//! - Answer content negotiation questions (`Accept`)
//!
//! # Design Decisions
//! - The body is buffered before dispatch; handlers run synchronously
//! - Lookups return borrowed data; nothing is decoded twice

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method};
use serde::de::DeserializeOwned;

use crate::routing::RouteParams;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Everything a handler may inspect about the current request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    path: String,
    params: RouteParams,
    query: Vec<(String, String)>,
    form: Vec<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
    request_id: String,
}

impl RequestContext {
    pub fn new(
        method: Method,
        path: impl Into<String>,
        query: Option<&str>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Self {
        let query = query.map(decode_pairs).unwrap_or_default();
        let form = if is_form(&headers) {
            decode_pairs(&String::from_utf8_lossy(&body))
        } else {
            Vec::new()
        };
        let request_id = headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        Self {
            method,
            path: path.into(),
            params: RouteParams::default(),
            query,
            form,
            headers,
            body,
            request_id,
        }
    }

    pub(crate) fn with_params(mut self, params: RouteParams) -> Self {
        self.params = params;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Placeholder value captured by the route.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    /// First query string value for `name`.
    pub fn query(&self, name: &str) -> Option<&str> {
        find(&self.query, name)
    }

    /// Request input: query string first, then the urlencoded form body.
    pub fn input(&self, name: &str) -> Option<&str> {
        self.query(name).or_else(|| find(&self.form, name))
    }

    pub fn has_input(&self, name: &str) -> bool {
        self.input(name).is_some()
    }

    /// Names from `names` with no input value.
    pub fn missing_inputs<'a>(&self, names: &[&'a str]) -> Vec<&'a str> {
        names
            .iter()
            .copied()
            .filter(|name| !self.has_input(name))
            .collect()
    }

    /// Only the named inputs, in the order asked for.
    pub fn inputs_only(&self, names: &[&str]) -> Vec<(String, Option<String>)> {
        names
            .iter()
            .map(|name| (name.to_string(), self.input(name).map(str::to_string)))
            .collect()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Deserialize a JSON body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Whether the client's `Accept` header admits `content_type`.
    ///
    /// A missing header accepts anything; `*/*` and `type/*` ranges match.
    pub fn accepts(&self, content_type: &str) -> bool {
        let Some(accept) = self.header(header::ACCEPT.as_str()) else {
            return true;
        };
        let wanted = content_type.trim().to_ascii_lowercase();
        let wanted_major = wanted.split('/').next().unwrap_or("");

        accept
            .split(',')
            .filter_map(|range| range.split(';').next())
            .map(|range| range.trim().to_ascii_lowercase())
            .any(|range| match range.split_once('/') {
                Some(("*", "*")) => true,
                Some((major, "*")) => major == wanted_major,
                _ => range == wanted,
            })
    }
}

fn decode_pairs(input: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(input.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn find<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().to_ascii_lowercase().starts_with(FORM_CONTENT_TYPE))
        .unwrap_or(false)
}
