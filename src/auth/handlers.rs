use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{SigninRequest, SigninResponse, SignupRequest},
        password::{hash_password, verify_password},
    },
    error::{route_not_found, AppError, AppResult, AuthFailure},
    state::AppState,
    users::{dto::PublicUser, repo::NewUser},
    validation::ValidJson,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup).fallback(route_not_found))
        .route("/signin", post(signin).fallback(route_not_found))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<PublicUser>)> {
    if state.users.find_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(payload.password).await?;
    let user = state
        .users
        .create(NewUser {
            email: payload.email,
            name: payload.name,
            password_hash,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Unknown email and wrong password produce the same response; only the log
/// line tells them apart.
#[instrument(skip(state, payload))]
pub async fn signin(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<SigninRequest>,
) -> AppResult<Json<SigninResponse>> {
    let Some(user) = state.users.find_by_email(&payload.email).await? else {
        warn!(email = %payload.email, "signin unknown email");
        return Err(AppError::Unauthorized(AuthFailure::BadCredentials));
    };

    if !verify_password(payload.password, user.password_hash.clone()).await? {
        warn!(email = %payload.email, user_id = %user.id, "signin invalid password");
        return Err(AppError::Unauthorized(AuthFailure::BadCredentials));
    }

    let token = state.jwt.issue(&user.id)?;

    info!(user_id = %user.id, "user signed in");
    Ok(Json(SigninResponse {
        token,
        user: user.into(),
    }))
}
