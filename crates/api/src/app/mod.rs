//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and per-request resource handles
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: query DTOs and JSON mapping helpers
//! - `pagination.rs`: limit/offset windows and page envelopes
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use yatube_auth::{Hs256JwtValidator, JwtValidator};

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod pagination;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router from configuration (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let store = services::build_store(&config.storage).await?;
    let services = Arc::new(AppServices::new(store, config.pagination));
    let jwt = Arc::new(Hs256JwtValidator::new(config.jwt_secret.clone().into_bytes()));
    Ok(router(services, jwt))
}

/// Assemble the router around already-built services.
///
/// Resource routes live under [`routes::API_PREFIX`] behind the auth
/// middleware; `/health` stays outside it.
pub fn router(services: Arc<AppServices>, jwt: Arc<dyn JwtValidator>) -> Router {
    let auth_state = middleware::AuthState {
        jwt,
        store: Arc::clone(services.store()),
    };

    let api = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest(routes::API_PREFIX, api)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_span))
                .layer(Extension(services)),
        )
}
