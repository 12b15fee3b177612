//! HTTP server setup and dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with a single fallback dispatcher
//! - Wire up middleware layers (request ID, tracing, timeout, body limit)
//! - Resolve each request against the frozen route table
//! - Run route middleware, then the route's action
//! - Map failures to responses (not-found view, error view)
//! - Record request metrics

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::Map;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::config::{AppConfig, Environment, ListenerConfig, ResponsesConfig};
use crate::http::error::{render_error, AppError};
use crate::http::middleware::MiddlewareRegistry;
use crate::http::request::RequestContext;
use crate::http::response::{params_data, Reply};
use crate::http::views::Views;
use crate::http::Action;
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::routing::Router as RouteRouter;

/// Application state injected into the dispatcher.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteRouter<Action>>,
    pub middleware: Arc<MiddlewareRegistry>,
    pub views: Views,
    pub environment: Environment,
    pub responses: ResponsesConfig,
}

/// UUID v4 request IDs for `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// HTTP server for an application.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &AppConfig, routes: RouteRouter<Action>, middleware: MiddlewareRegistry) -> Self {
        let state = AppState {
            routes: Arc::new(routes),
            middleware: Arc::new(middleware),
            views: Views::new(&config.application.views_dir),
            environment: config.application.environment,
            responses: config.responses.clone(),
        };
        let router = Self::build_router(&config.listener, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ListenerConfig, state: AppState) -> Router {
        let layers = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)));

        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(layers)
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown::wait_for(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Fallback handler: every request comes through here.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let (parts, body) = request.into_parts();
    let method = parts.method.to_string();
    let path = parts.uri.path().to_string();

    let response = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            let ctx = RequestContext::new(
                parts.method,
                path.as_str(),
                parts.uri.query(),
                parts.headers,
                bytes,
            );
            let request_id = ctx.request_id().to_string();
            match handle(&state, ctx).await {
                Ok(response) => response,
                Err(e) => error_response(&state, &request_id, e),
            }
        }
        Err(e) => {
            tracing::debug!(method = %method, path = %path, error = %e, "Failed to read request body");
            (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response()
        }
    };

    metrics::record_request(&method, response.status().as_u16(), start);
    response
}

async fn handle(state: &AppState, ctx: RequestContext) -> Result<Response, AppError> {
    let resolution = state.routes.resolve(ctx.method().as_str(), ctx.path());
    let Some(action) = resolution.handler.cloned() else {
        metrics::record_route_miss();
        tracing::warn!(
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = %ctx.path(),
            "No route matched"
        );
        return Err(AppError::NotFound {
            method: ctx.method().to_string(),
            path: ctx.path().to_string(),
        });
    };
    let middleware = resolution.middleware.map(str::to_string);
    tracing::debug!(
        request_id = %ctx.request_id(),
        template = resolution.template.unwrap_or(""),
        "Route matched"
    );
    let ctx = ctx.with_params(resolution.params);

    if let Some(name) = middleware {
        let check = state
            .middleware
            .get(&name)
            .ok_or_else(|| AppError::MissingMiddleware(name.clone()))?;
        if let Some(reply) = check.handle(&ctx) {
            tracing::debug!(request_id = %ctx.request_id(), middleware = %name, "Middleware answered request");
            return reply.render(&state.views);
        }
    }

    let reply = match action {
        Action::View(name) => Reply::View {
            name,
            data: params_data(ctx.params()),
            status: StatusCode::OK,
        },
        Action::Handler(handler) => tokio::task::spawn_blocking(move || handler(&ctx))
            .await
            .map_err(|e| AppError::Handler(e.to_string()))??,
    };

    reply.render(&state.views)
}

fn error_response(state: &AppState, request_id: &str, err: AppError) -> Response {
    let status = err.status();
    if status.is_server_error() {
        tracing::error!(request_id = %request_id, error = %err, "Request failed");
    } else {
        tracing::debug!(request_id = %request_id, status = %status, error = %err, "Request rejected");
    }

    if status == StatusCode::NOT_FOUND {
        if let Some(view) = state.responses.not_found_view.as_deref() {
            match state.views.render(view, &Map::new()) {
                Ok(body) => return (status, axum::response::Html(body)).into_response(),
                Err(e) => tracing::error!(view = %view, error = %e, "Not-found view failed to render"),
            }
        }
    }

    render_error(
        &err,
        state.environment,
        &state.views,
        state.responses.error_view.as_deref(),
    )
}
