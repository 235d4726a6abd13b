use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::jwt::JwtKeys;
use crate::{
    error::{AppError, AuthFailure},
    id::ObjectId,
};

/// The authenticated caller. Taking this extractor is what makes a handler
/// protected: the handler body only runs once a valid bearer token has been
/// verified, whatever order the routes were registered in.
#[derive(Debug, Clone)]
pub struct AuthUser(pub ObjectId);

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let missing = || {
        warn!("missing or malformed Authorization header");
        AppError::Unauthorized(AuthFailure::MissingCredential)
    };
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(missing)?;
    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .ok_or_else(missing)?;
    if token.is_empty() {
        return Err(missing());
    }
    Ok(token)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let token = bearer_token(parts)?;
        let claims = JwtKeys::from_ref(state).verify(token)?;

        let user = AuthUser(claims.sub.clone());
        parts.extensions.insert(claims);
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
