use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

use crate::domains::auth::{Claims, JwtService};

/// Caller identity attached to the request by [`jwt_auth_middleware`].
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    /// Admins may edit the location directory.
    pub is_admin: bool,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
            is_admin: claims.is_admin,
        }
    }
}

/// Attach an [`AuthUser`] when the request carries a valid token.
///
/// Reads stay public, so a missing or bad token never rejects the request
/// here. Handlers that write call `require_user` / `require_admin`.
pub async fn jwt_auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(request.headers(), &jwt_service) {
        Some(user) => {
            debug!(user_id = %user.user_id, is_admin = user.is_admin, "Request authenticated");
            request.extensions_mut().insert(user);
        }
        None => debug!(path = %request.uri().path(), "Anonymous request"),
    }

    next.run(request).await
}

/// Token from `Authorization`, with or without the `Bearer ` scheme.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

fn authenticate(headers: &HeaderMap, jwt_service: &JwtService) -> Option<AuthUser> {
    let token = bearer_token(headers)?;
    match jwt_service.verify_token(token) {
        Ok(claims) => Some(claims.into()),
        Err(e) => {
            debug!(error = %e, "Ignoring invalid token");
            None
        }
    }
}
