use crate::articles::repo::{ArticleStore, PgArticleStore};
use crate::auth::jwt::JwtKeys;
use crate::config::AppConfig;
use crate::db;
use crate::news::client::NewsClient;
use crate::rate_limit::RateLimiter;
use crate::users::repo::{PgUserStore, UserStore};
use std::sync::Arc;

/// Everything a handler may touch, passed in explicitly.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub users: Arc<dyn UserStore>,
    pub articles: Arc<dyn ArticleStore>,
    pub news: NewsClient,
    pub auth_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        config.warn_missing_secrets();

        let pool = db::connect(&config.database_url).await?;
        db::migrate(&pool).await?;

        let users = Arc::new(PgUserStore::new(pool.clone())) as Arc<dyn UserStore>;
        let articles = Arc::new(PgArticleStore::new(pool)) as Arc<dyn ArticleStore>;
        Self::from_parts(config, users, articles)
    }

    pub fn from_parts(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        articles: Arc<dyn ArticleStore>,
    ) -> anyhow::Result<Self> {
        let jwt = JwtKeys::from_config(&config.jwt);
        let news = NewsClient::new(&config.news)?;
        let auth_limiter = Arc::new(RateLimiter::new(&config.auth_rate_limit));
        Ok(Self {
            config: Arc::new(config),
            jwt,
            users,
            articles,
            news,
            auth_limiter,
        })
    }
}

#[cfg(test)]
impl AppState {
    pub fn fake() -> Self {
        Self::fake_with(crate::testing::test_config())
    }

    pub fn fake_with(config: AppConfig) -> Self {
        use crate::testing::{MemoryArticleStore, MemoryUserStore};

        Self::from_parts(
            config,
            Arc::new(MemoryUserStore::default()),
            Arc::new(MemoryArticleStore::default()),
        )
        .expect("fake state")
    }
}
