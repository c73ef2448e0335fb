use axum::http::HeaderMap;
use uuid::Uuid;

use crate::error::ApiError;

// ---------------------------------------------------------------------------
// Identity extraction from request headers.
//
// OTP registration and JWT verification live upstream; by the time a
// request reaches this service the gateway has resolved the session into
// x-user-id and x-roles headers.
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct AuthCtx {
    pub user_id: Uuid,
    pub roles: Vec<String>,
}

impl AuthCtx {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == "admin")
    }
}

/// Extract the caller's identity. 401 when x-user-id is missing/malformed.
pub fn require_user(headers: &HeaderMap) -> Result<AuthCtx, ApiError> {
    let user_id = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(ApiError::unauthorized)?;

    let roles = headers
        .get("x-roles")
        .and_then(|v| v.to_str().ok())
        .map(|s| {
            s.split(',')
                .map(|r| r.trim().to_lowercase())
                .filter(|r| !r.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Ok(AuthCtx { user_id, roles })
}

/// Extract the caller and require the admin role.
pub fn require_admin(headers: &HeaderMap, action: &str) -> Result<AuthCtx, ApiError> {
    let ctx = require_user(headers)?;
    if !ctx.is_admin() {
        return Err(ApiError::forbidden(action));
    }
    Ok(ctx)
}
