use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{ArticleIdPath, CreateArticleRequest, DeleteArticleResponse},
    repo::{Article, NewArticle},
};
use crate::{
    auth::extractors::AuthUser,
    error::{route_not_found, AppError, AppResult},
    state::AppState,
    validation::{ValidJson, ValidPath},
};

pub fn article_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/articles",
            get(list_articles)
                .post(create_article)
                .fallback(route_not_found),
        )
        .route(
            "/articles/:articleId",
            delete(delete_article).fallback(route_not_found),
        )
}

#[instrument(skip(state))]
pub async fn list_articles(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<Article>>> {
    let articles = state.articles.list_by_owner(&user_id).await?;
    Ok(Json(articles))
}

#[instrument(skip(state, body))]
pub async fn create_article(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidJson(body): ValidJson<CreateArticleRequest>,
) -> AppResult<(StatusCode, Json<Article>)> {
    let article = state
        .articles
        .create(NewArticle {
            keyword: body.keyword,
            title: body.title,
            text: body.text,
            date: body.date,
            source: body.source,
            link: body.link,
            image: body.image,
            owner: user_id,
        })
        .await?;
    info!(article_id = %article.id, owner = %article.owner, "article saved");
    Ok((StatusCode::CREATED, Json(article)))
}

/// Existence is checked before ownership, and both before the delete.
#[instrument(skip(state))]
pub async fn delete_article(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidPath(path): ValidPath<ArticleIdPath>,
) -> AppResult<Json<DeleteArticleResponse>> {
    let id = path.article_id;
    let article = state
        .articles
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Article not found".into()))?;

    if article.owner != user_id {
        warn!(article_id = %id, owner = %article.owner, caller = %user_id, "delete by non-owner");
        return Err(AppError::Forbidden(
            "You do not have permission to delete this article".into(),
        ));
    }

    // Lost a race with a concurrent delete.
    if !state.articles.delete(&id, &user_id).await? {
        return Err(AppError::NotFound("Article not found".into()));
    }

    info!(article_id = %id, "article deleted");
    Ok(Json(DeleteArticleResponse {
        message: "Article deleted",
    }))
}
