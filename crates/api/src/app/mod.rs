//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: infrastructure wiring (repositories, attachments, tokens)
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, routing::post, Extension, Router};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::Config;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: Config, pool: PgPool) -> Router {
    let services = Arc::new(services::build_services(pool, &config));
    let auth_state = middleware::AuthState {
        tokens: services.tokens.clone(),
    };

    // Registration and login have to be reachable without a token.
    let public = Router::new()
        .route("/register", post(routes::users::register))
        .route("/login", post(routes::users::login))
        .layer(Extension(services.clone()));

    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", public.merge(protected))
        .nest_service("/public", ServeDir::new(&config.public_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
