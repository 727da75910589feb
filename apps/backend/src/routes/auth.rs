//! Authentication middleware

use axum::{body::Body, extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

use crate::error::{ApiError, Result};

use recall_core::types::UserId;

/// Authenticated learner info attached to the request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Auth middleware - reads the learner id the platform gateway injects as
/// the `x-user-id` header. Requests without a well-formed id never reach a
/// handler.
pub async fn auth_middleware(mut request: Request<Body>, next: Next) -> Result<Response> {
    let header = request
        .headers()
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing x-user-id header".to_string()))?;

    let user_id = Uuid::parse_str(header)
        .map_err(|_| ApiError::Unauthorized("Malformed x-user-id header".to_string()))?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id });

    Ok(next.run(request).await)
}
