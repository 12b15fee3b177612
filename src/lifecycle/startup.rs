//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize observability from the loaded configuration
//! - Freeze the application's route table
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{ConfigError, Configuration};
use crate::db::DbError;
use crate::http::{Action, HttpServer, MiddlewareRegistry};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{logging, metrics};
use crate::routing::{PatternError, Router, RouteTable};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("database: {0}")]
    Database(#[from] DbError),

    #[error("route table: {0}")]
    Routes(#[from] PatternError),

    #[error("listener: {0}")]
    Io(#[from] std::io::Error),
}

/// Logging, then metrics. Safe to call more than once.
pub fn init_observability(config: &Configuration) {
    let app = config.app();
    logging::init_logging(&app.logging);
    tracing::info!(
        name = %app.application.name,
        environment = %app.application.environment,
        "Configuration loaded"
    );

    if app.metrics.enabled {
        match app.metrics.address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %app.metrics.address,
                "Failed to parse metrics address"
            ),
        }
    }
}

/// A fully initialised application, ready to serve.
pub struct Application {
    config: Arc<Configuration>,
    routes: Router<Action>,
    middleware: MiddlewareRegistry,
}

impl Application {
    /// Freeze `table`. Routes naming unregistered middleware are logged; they
    /// answer 500 when requested.
    pub fn new(
        config: Configuration,
        table: RouteTable<Action>,
        middleware: MiddlewareRegistry,
    ) -> Result<Self, StartupError> {
        let routes = table.into_router()?;

        for route in routes.routes() {
            if let Some(name) = route.middleware.as_deref().filter(|name| !middleware.contains(name)) {
                tracing::warn!(
                    method = %route.method,
                    template = %route.template,
                    middleware = %name,
                    "Route uses unregistered middleware"
                );
            }
        }

        tracing::info!(routes = routes.len(), middleware = middleware.len(), "Routes registered");
        Ok(Self {
            config: Arc::new(config),
            routes,
            middleware,
        })
    }

    pub fn routes(&self) -> &Router<Action> {
        &self.routes
    }

    /// Bind the configured address and serve until Ctrl+C.
    pub async fn serve(self) -> Result<(), StartupError> {
        let listener = TcpListener::bind(&self.config.app().listener.bind_address).await?;
        tracing::info!(address = %listener.local_addr()?, "Listening for connections");

        let shutdown = Arc::new(Shutdown::new());
        signals::spawn_signal_listener(Arc::clone(&shutdown));
        self.serve_on(listener, &shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` fires.
    pub async fn serve_on(
        self,
        listener: TcpListener,
        shutdown: &Shutdown,
    ) -> Result<(), StartupError> {
        let server = HttpServer::new(self.config.app(), self.routes, self.middleware);
        server.run(listener, shutdown.subscribe()).await?;
        tracing::info!("Shutdown complete");
        Ok(())
    }
}
