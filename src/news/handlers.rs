use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use super::dto::{NewsResults, SearchQuery};
use crate::{
    error::{route_not_found, AppResult},
    state::AppState,
    validation::ValidQuery,
};

/// Public: no [`crate::auth::extractors::AuthUser`] here.
pub fn news_routes() -> Router<AppState> {
    Router::new().route("/news", get(search_news).fallback(route_not_found))
}

#[instrument(skip(state))]
pub async fn search_news(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<SearchQuery>,
) -> AppResult<Json<NewsResults>> {
    let results = state.news.search(&query.q).await?;
    Ok(Json(results))
}
