//! # roomwiki-rest - Wiki REST API Implementation
//!
//! This crate provides the HTTP surface of the Roomwiki multi-tenant wiki
//! platform: room lifecycle, hierarchical pages with versioning, ranked
//! search, tokenized shared links, read-only public room views, user
//! administration, and feedback collection.
//!
//! ## Features
//!
//! - **Tenant Isolation**: every room path parameter passes identifier
//!   validation before it reaches namespace selection
//! - **Role-Gated Operations**: Viewer < Editor < Admin < Owner, with a
//!   separate Owner-or-superuser gate for destructive room administration
//! - **Versioned Pages**: every content or title change snapshots the
//!   prior state
//! - **Public Sharing**: opaque room slugs and per-page tokens with
//!   optional expiry
//!
//! ## Backend Support
//!
//! Storage backends are configured through feature flags passed through to
//! `roomwiki-persistence`:
//!
//! - `sqlite` - SQLite backend (default, great for development)
//! - `postgres` - PostgreSQL backend (recommended for production)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use roomwiki_rest::{ServerConfig, create_app};
//! use roomwiki_persistence::backends::sqlite::SqliteBackend;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = SqliteBackend::open("wiki.db")?;
//!     backend.init_schema()?;
//!
//!     let app = create_app(backend);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every error is rendered as `{"error": "<message>"}` with a status code
//! from the storage taxonomy: 400 invalid tenant/validation, 401
//! unauthenticated, 403 forbidden, 404 not found, 409 conflict, 410
//! expired shared link, 500 backend fault.
//!
//! ## Architecture
//!
//! - [`config`] - Server configuration (flags and `ROOMWIKI_*` variables)
//! - [`error`] - Error-to-status mapping
//! - [`state`] - Application state (storage, configuration)
//! - [`extractors`] - Bearer-token identity extraction
//! - [`handlers`] - HTTP request handlers
//! - [`routing`] - Route configuration

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routing;
pub mod state;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::{RestError, RestResult};
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use roomwiki_persistence::store::WikiStore;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the Axum application with default configuration.
///
/// This is a convenience function that creates the app with default
/// settings. For more control, use [`create_app_with_config`].
pub fn create_app<S>(storage: S) -> Router
where
    S: WikiStore + 'static,
{
    create_app_with_config(storage, ServerConfig::default())
}

/// Creates the Axum application with custom configuration.
///
/// Sets up the complete wiki REST API with all handlers and middleware.
///
/// # Example
///
/// ```rust,ignore
/// use roomwiki_rest::{ServerConfig, create_app_with_config};
/// use roomwiki_persistence::backends::sqlite::SqliteBackend;
///
/// let backend = SqliteBackend::in_memory()?;
/// let config = ServerConfig {
///     port: 3000,
///     enable_cors: true,
///     ..Default::default()
/// };
/// let app = create_app_with_config(backend, config);
/// ```
pub fn create_app_with_config<S>(storage: S, config: ServerConfig) -> Router
where
    S: WikiStore + 'static,
{
    info!(
        "Creating REST API server with backend: {}",
        storage.backend_name()
    );

    let state = AppState::new(Arc::new(storage), config.clone());
    let router = routing::create_routes(state);

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(config.request_timeout),
        ));

    let router = if config.enable_cors {
        router.layer(build_cors_layer(&config))
    } else {
        router
    };

    router.layer(service_builder)
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.cors_origins == "*" {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("roomwiki={level},roomwiki_rest={level},tower_http=debug"))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
