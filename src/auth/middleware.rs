use crate::auth::service::AuthService;
use crate::types::{AppError, Claims, Role};
use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Bearer-token middleware.
///
/// Missing or malformed `Authorization` header rejects 401; an invalid or
/// expired token rejects 403; a valid token attaches [`Claims`] to the
/// request extensions and continues. No refresh, no revocation list.
pub async fn auth_middleware(
    auth_service: Arc<AuthService>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Auth("Authorization header missing".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

    let claims = auth_service.verify_token(token)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Role allow-list middleware; runs after [`auth_middleware`].
///
/// No attached identity rejects 401; an identity whose role is not in the
/// allow-list rejects 403; otherwise the request continues untouched.
pub async fn require_role(
    allowed: &'static [Role],
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| AppError::Auth("Authentication required".to_string()))?;

    if !allowed.contains(&claims.role) {
        return Err(AppError::Forbidden(
            "Forbidden: Access denied".to_string(),
        ));
    }

    Ok(next.run(req).await)
}

/// Extractor exposing the verified caller's claims to handlers.
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Auth("Authentication required".to_string()))
    }
}
