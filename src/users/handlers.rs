use axum::{extract::State, routing::get, Json, Router};
use tracing::{instrument, warn};

use super::dto::{PublicUser, UserIdPath};
use crate::{
    auth::extractors::AuthUser,
    error::{route_not_found, AppError, AppResult},
    state::AppState,
    validation::ValidPath,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(get_me).fallback(route_not_found))
        .route("/users/:userId", get(get_user).fallback(route_not_found))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<PublicUser>> {
    let user = state.users.find_by_id(&user_id).await?.ok_or_else(|| {
        warn!(user_id = %user_id, "token subject no longer exists");
        AppError::NotFound("User not found".into())
    })?;
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    ValidPath(path): ValidPath<UserIdPath>,
) -> AppResult<Json<PublicUser>> {
    let user = state
        .users
        .find_by_id(&path.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(Json(user.into()))
}
