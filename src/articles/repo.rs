use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::id::ObjectId;

/// Saved article. `owner` is set from the authenticated caller at creation
/// and never changes.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub keyword: String,
    pub title: String,
    pub text: String,
    pub date: String,
    pub source: String,
    pub link: String,
    pub image: String,
    pub owner: ObjectId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub keyword: String,
    pub title: String,
    pub text: String,
    pub date: String,
    pub source: String,
    pub link: String,
    pub image: String,
    pub owner: ObjectId,
}

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Articles owned by `owner`, newest first.
    async fn list_by_owner(&self, owner: &ObjectId) -> anyhow::Result<Vec<Article>>;
    async fn find_by_id(&self, id: &ObjectId) -> anyhow::Result<Option<Article>>;
    async fn create(&self, article: NewArticle) -> anyhow::Result<Article>;
    /// Deletes only if `owner` still owns the row. Returns whether a row went away.
    async fn delete(&self, id: &ObjectId, owner: &ObjectId) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgArticleStore {
    db: PgPool,
}

impl PgArticleStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn list_by_owner(&self, owner: &ObjectId) -> anyhow::Result<Vec<Article>> {
        let rows = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, keyword, title, text, date, source, link, image, owner, created_at
            FROM articles
            WHERE owner = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.db)
        .await
        .context("list articles by owner")?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: &ObjectId) -> anyhow::Result<Option<Article>> {
        let row = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, keyword, title, text, date, source, link, image, owner, created_at
            FROM articles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find article by id")?;
        Ok(row)
    }

    async fn create(&self, a: NewArticle) -> anyhow::Result<Article> {
        let row = sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO articles (id, keyword, title, text, date, source, link, image, owner)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, keyword, title, text, date, source, link, image, owner, created_at
            "#,
        )
        .bind(ObjectId::new())
        .bind(&a.keyword)
        .bind(&a.title)
        .bind(&a.text)
        .bind(&a.date)
        .bind(&a.source)
        .bind(&a.link)
        .bind(&a.image)
        .bind(&a.owner)
        .fetch_one(&self.db)
        .await
        .context("insert article")?;
        Ok(row)
    }

    async fn delete(&self, id: &ObjectId, owner: &ObjectId) -> anyhow::Result<bool> {
        let result = sqlx::query(r#"DELETE FROM articles WHERE id = $1 AND owner = $2"#)
            .bind(id)
            .bind(owner)
            .execute(&self.db)
            .await
            .context("delete article")?;
        Ok(result.rows_affected() > 0)
    }
}
