//! Roots application server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (request id, trace, timeout, body limit)
//!                          │
//!                          ▼
//!                     routing::Router ── exact → method patterns → ANY patterns
//!                          │
//!                          ▼
//!                     http::middleware (named, may answer early)
//!                          │
//!                          ▼
//!                     Action: view render │ handler (blocking pool)
//!                                              │
//!                                              ▼
//!                                         model::Query ──▶ executor ──▶ db
//!     Client Response                          │
//!     ◀──────────────  http::response ◀────────┘
//! ```

mod app;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use roots::config::{loader, Environment};
use roots::db::Database;
use roots::http::Action;
use roots::lifecycle::startup::{init_observability, StartupError};
use roots::routing::Router;
use roots::Application;

#[derive(Parser)]
#[command(name = "roots")]
#[command(about = "Roots MVC application server", long_about = None)]
struct Cli {
    /// Directory holding config.toml / config.<env>.toml
    #[arg(short, long, default_value = "config")]
    config_dir: PathBuf,

    /// Environment (development, production). Defaults to APP_ENVIRONMENT.
    #[arg(short, long)]
    env: Option<Environment>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Print the registered route table
    Routes,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            eprintln!("roots: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), StartupError> {
    let environment = cli.env.unwrap_or_else(loader::environment_from_env);
    let config = loader::load_config(&cli.config_dir, environment)?;
    init_observability(&config);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let database = Database::open(&config.app().database)?;
            app::models::migrate(&database)?;

            let routes = app::routes(&database);
            let middleware = app::middleware(&config);
            Application::new(config, routes, middleware)?.serve().await
        }
        Commands::Routes => {
            // handlers are only listed, so the configured database stays untouched
            let routes = app::routes(&Database::open_in_memory()?).into_router()?;
            print_routes(&routes);
            Ok(())
        }
    }
}

fn print_routes(routes: &Router<Action>) {
    println!("{:<6} {:<28} {:<12} {:<20} ACTION", "METHOD", "TEMPLATE", "MIDDLEWARE", "NAME");
    for route in routes.routes() {
        println!(
            "{:<6} {:<28} {:<12} {:<20} {}",
            route.method.as_str(),
            route.template,
            route.middleware.as_deref().unwrap_or("-"),
            route.name.as_deref().unwrap_or("-"),
            route.handler.describe(),
        );
    }
}
