use anyhow::Context;
use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::{debug, error, warn};

use super::claims::Claims;
use crate::{
    config::JwtConfig,
    error::{AppError, AppResult, AuthFailure},
    id::ObjectId,
    state::AppState,
};

/// Signs and verifies bearer tokens. Verification is pure computation over
/// the shared secret; there is no session store and no revocation.
#[derive(Clone)]
pub struct JwtKeys {
    keys: Option<(EncodingKey, DecodingKey)>,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        let keys = cfg.secret.as_ref().map(|secret| {
            (
                EncodingKey::from_secret(secret.as_bytes()),
                DecodingKey::from_secret(secret.as_bytes()),
            )
        });
        Self {
            keys,
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::days(cfg.ttl_days),
        }
    }

    fn keys(&self) -> AppResult<&(EncodingKey, DecodingKey)> {
        self.keys.as_ref().ok_or_else(|| {
            error!("JWT_SECRET is not configured");
            AppError::Configuration("JWT_SECRET is not set".into())
        })
    }

    pub fn issue(&self, user_id: &ObjectId) -> AppResult<String> {
        self.issue_at(user_id, OffsetDateTime::now_utc())
    }

    pub(crate) fn issue_at(&self, user_id: &ObjectId, issued_at: OffsetDateTime) -> AppResult<String> {
        let (encoding, _) = self.keys()?;
        let exp = issued_at + self.ttl;
        let claims = Claims {
            sub: user_id.clone(),
            iat: issued_at.unix_timestamp().max(0) as usize,
            exp: exp.unix_timestamp().max(0) as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, encoding).context("jwt encode")?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let (_, decoding) = self.keys()?;
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));

        let data = decode::<Claims>(token, decoding, &validation).map_err(|e| {
            let failure = match e.kind() {
                ErrorKind::ExpiredSignature => AuthFailure::ExpiredToken,
                _ => AuthFailure::InvalidToken,
            };
            warn!(error = %e, reason = ?failure, "jwt rejected");
            AppError::Unauthorized(failure)
        })?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}
