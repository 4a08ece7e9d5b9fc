use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::Instrument;

use yatube_auth::{Identity, JwtValidator};
use yatube_infra::BlogStore;

use crate::app::errors::ApiError;
use crate::context::RequestIdentity;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    pub store: Arc<dyn BlogStore>,
}

/// Resolve the caller's identity from an optional bearer token.
///
/// No `Authorization` header means an anonymous request; a header that does
/// not carry a valid token is rejected with 401 before any handler runs.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = match extract_bearer(req.headers()) {
        Ok(token) => token.map(str::to_owned),
        Err(e) => return e.into_response(),
    };

    let identity = match token {
        None => RequestIdentity::anonymous(),
        Some(token) => match resolve_identity(&state, &token).await {
            Ok(identity) => RequestIdentity::authenticated(identity),
            Err(e) => return e.into_response(),
        },
    };

    req.extensions_mut().insert(identity);
    next.run(req).await
}

async fn resolve_identity(state: &AuthState, token: &str) -> Result<Identity, ApiError> {
    let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        ApiError::NotAuthenticated
    })?;

    let identity = Identity::from(state.store.ensure_user(&claims.sub).await?);
    tracing::debug!(user_id = %identity.user_id(), username = %identity.username(), "authenticated");
    Ok(identity)
}

fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| ApiError::NotAuthenticated)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::NotAuthenticated)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(ApiError::NotAuthenticated);
    }

    Ok(Some(token))
}

/// Wrap each request in a span carrying a fresh request id and log its outcome.
pub async fn request_span(req: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::now_v7();
    let span = tracing::info_span!(
        "request",
        %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let started = Instant::now();
        let response = next.run(req).await;
        tracing::info!(
            status = response.status().as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );
        response
    }
    .instrument(span)
    .await
}
