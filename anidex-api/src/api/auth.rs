//! Authentication middleware for anidex-api
//!
//! Consumes the token check from `anidex_common::api::auth` as a pass/fail
//! capability. Applied to protected routes only; health stays public.

use axum::{
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;
use anidex_common::api::auth::{verify_token, ApiAuthError};

use crate::response::encode_error;
use crate::AppState;

/// Authentication middleware
///
/// Passes the request through when no salt is configured or the request is
/// a CORS pre-flight. Otherwise the `Authorization` header must carry a
/// valid token; failures answer 401 in the standard envelope.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let Some(salt) = state.salt.as_deref() else {
        // Auth disabled
        return Ok(next.run(request).await);
    };

    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError(ApiAuthError::MissingHeader))?
        .to_str()
        .map_err(|e| AuthError(ApiAuthError::InvalidToken(e.to_string())))?;

    let claims = verify_token(header_value, salt).map_err(|e| {
        warn!("Rejected request to {}: {}", request.uri().path(), e);
        AuthError(e)
    })?;

    tracing::debug!(username = %claims.username, "Authenticated request");
    Ok(next.run(request).await)
}

/// Authentication failure rendered as a 401 envelope
#[derive(Debug)]
pub struct AuthError(pub ApiAuthError);

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        encode_error(StatusCode::UNAUTHORIZED, &self.0.to_string())
    }
}
