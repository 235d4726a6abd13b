use anyhow::Context;
use time::{macros::format_description, Duration, OffsetDateTime};
use tracing::{debug, error};

use super::dto::{NewsResults, UpstreamBody};
use crate::{
    config::NewsConfig,
    error::{AppError, AppResult},
};

const LOOKBACK_DAYS: i64 = 7;

/// Thin pass-through to the news search API. The API key travels in a
/// header so it never shows up in a URL or in a logged `reqwest` error.
#[derive(Clone)]
pub struct NewsClient {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    language: String,
}

impl NewsClient {
    pub fn new(cfg: &NewsConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .user_agent(concat!("news-explorer/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build news http client")?;
        Ok(Self {
            http,
            api_url: cfg.api_url.clone(),
            api_key: cfg.api_key.clone(),
            language: cfg.language.clone(),
        })
    }

    fn from_date(now: OffsetDateTime) -> anyhow::Result<String> {
        let date = (now - Duration::days(LOOKBACK_DAYS)).date();
        date.format(format_description!("[year]-[month]-[day]"))
            .context("format search start date")
    }

    pub async fn search(&self, q: &str) -> AppResult<NewsResults> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            error!("NEWS_API_KEY is not configured");
            AppError::Configuration("NEWS_API_KEY is not set".into())
        })?;
        let from = Self::from_date(OffsetDateTime::now_utc())?;

        let res = self
            .http
            .get(&self.api_url)
            .query(&[
                ("q", q),
                ("from", from.as_str()),
                ("sortBy", "publishedAt"),
                ("language", self.language.as_str()),
            ])
            .header("X-Api-Key", api_key)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("news request failed: {}", e.without_url())))?;

        let status = res.status();
        let body: Option<UpstreamBody> = res.json().await.ok();

        if !status.is_success() {
            let message = body.and_then(|b| b.message).unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "news api answered {status}: {message}"
            )));
        }
        let body = body.ok_or_else(|| AppError::Upstream("news api sent an unreadable body".into()))?;
        if body.status.as_deref() == Some("error") {
            return Err(AppError::Upstream(format!(
                "news api reported an error: {}",
                body.message.unwrap_or_default()
            )));
        }

        debug!(q, total = body.total_results, "news search relayed");
        Ok(NewsResults {
            status: "ok",
            articles: body.articles,
            total_results: body.total_results,
        })
    }
}
