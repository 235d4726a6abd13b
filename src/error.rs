use axum::{
    extract::{Request, State},
    http::{Method, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::state::AppState;

pub type AppResult<T> = Result<T, AppError>;

const GENERIC_SERVER_MESSAGE: &str = "An error has occurred on the server";

/// Why a request was rejected as unauthorized. Every variant answers 401;
/// the variant itself only shows up in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    #[error("missing or malformed bearer credential")]
    MissingCredential,
    #[error("invalid token")]
    InvalidToken,
    #[error("expired token")]
    ExpiredToken,
    #[error("bad credentials")]
    BadCredentials,
}

impl AuthFailure {
    fn client_message(self) -> &'static str {
        match self {
            AuthFailure::MissingCredential => "Authorization required",
            AuthFailure::InvalidToken | AuthFailure::ExpiredToken => "Invalid or expired token",
            AuthFailure::BadCredentials => "Incorrect email or password",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(AuthFailure),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    TooManyRequests(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Configuration(_) | AppError::Upstream(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to hand to the client.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Validation(m)
            | AppError::Forbidden(m)
            | AppError::NotFound(m)
            | AppError::Conflict(m)
            | AppError::TooManyRequests(m) => m.clone(),
            AppError::Unauthorized(reason) => reason.client_message().to_string(),
            AppError::Configuration(_) | AppError::Upstream(_) | AppError::Internal(_) => {
                GENERIC_SERVER_MESSAGE.to_string()
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Attached to every error response so [`expose_error_detail`] can enrich it
/// outside production.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub message: String,
    pub detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.client_message();
        let detail = format!("{self:#}");

        if status.is_server_error() {
            error!(%status, error = %detail, "request failed");
        } else if let AppError::Unauthorized(reason) = &self {
            warn!(%status, reason = ?reason, "request unauthorized");
        } else {
            debug!(%status, error = %detail, "request rejected");
        }

        let body = ErrorBody {
            error: true,
            message: message.clone(),
            detail: None,
        };
        let mut res = (status, Json(body)).into_response();
        res.extensions_mut().insert(ErrorReport { message, detail });
        res
    }
}

/// Fallback for unknown paths and for known paths hit with a method they do
/// not serve.
pub async fn route_not_found(method: Method, uri: Uri) -> AppError {
    AppError::NotFound(format!("Route not found: {method} {}", uri.path()))
}

/// Re-renders error responses with the internal detail when not running in
/// production.
pub async fn expose_error_detail(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let res = next.run(req).await;
    if state.config.env.is_production() {
        return res;
    }
    let Some(report) = res.extensions().get::<ErrorReport>().cloned() else {
        return res;
    };

    let body = ErrorBody {
        error: true,
        message: report.message.clone(),
        detail: Some(report.detail.clone()),
    };
    let mut out = (res.status(), Json(body)).into_response();
    out.extensions_mut().insert(report);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_maps_to_its_status_class() {
        let cases = [
            (AppError::Validation("x".into()), 400),
            (AppError::Unauthorized(AuthFailure::ExpiredToken), 401),
            (AppError::Forbidden("x".into()), 403),
            (AppError::NotFound("x".into()), 404),
            (AppError::Conflict("x".into()), 409),
            (AppError::TooManyRequests("x".into()), 429),
            (AppError::Configuration("x".into()), 500),
            (AppError::Upstream("x".into()), 500),
            (AppError::Internal(anyhow::anyhow!("boom")), 500),
        ];
        for (err, code) in cases {
            assert_eq!(err.status().as_u16(), code, "{err:?}");
        }
    }

    #[test]
    fn server_errors_hide_their_cause() {
        let err = AppError::Configuration("JWT_SECRET is not set".into());
        assert_eq!(err.client_message(), GENERIC_SERVER_MESSAGE);

        let err = AppError::Internal(anyhow::anyhow!("pool timed out"));
        assert_eq!(err.client_message(), GENERIC_SERVER_MESSAGE);
    }

    #[test]
    fn invalid_and_expired_tokens_look_the_same_to_clients() {
        let invalid = AppError::Unauthorized(AuthFailure::InvalidToken);
        let expired = AppError::Unauthorized(AuthFailure::ExpiredToken);
        assert_eq!(invalid.status(), expired.status());
        assert_eq!(invalid.client_message(), expired.client_message());
        assert_ne!(format!("{invalid}"), format!("{expired}"));
    }

    #[tokio::test]
    async fn response_body_has_error_flag_and_message() {
        let res = AppError::NotFound("Article not found".into()).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(res.extensions().get::<ErrorReport>().is_some());

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], true);
        assert_eq!(json["message"], "Article not found");
        assert!(json.get("detail").is_none());
    }
}
