use std::time::Duration;

use anyhow::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => anyhow::bail!("unknown APP_ENV {other:?}"),
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// `None` when `JWT_SECRET` is unset; issuing and verifying then fail per request.
    pub secret: Option<String>,
    pub issuer: String,
    pub audience: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub language: String,
    pub timeout_secs: u64,
}

impl NewsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Fixed-window limit applied per client address to `/signup` and `/signin`.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_secs: u64,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub database_url: String,
    pub jwt: JwtConfig,
    pub news: NewsConfig,
    pub cors_origins: Vec<String>,
    pub auth_rate_limit: RateLimitConfig,
}

pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 120;
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let env = match std::env::var("APP_ENV") {
            Ok(raw) => Environment::parse(&raw)?,
            Err(_) => Environment::Development,
        };
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt = JwtConfig {
            secret: non_empty_var("JWT_SECRET"),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "news-explorer".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "news-explorer-users".into()),
            ttl_days: check_ttl_days(
                parsed_var("JWT_TTL_DAYS")?.unwrap_or(DEFAULT_TOKEN_TTL_DAYS),
            )?,
        };
        let news = NewsConfig {
            api_key: non_empty_var("NEWS_API_KEY"),
            api_url: std::env::var("NEWS_API_URL")
                .unwrap_or_else(|_| "https://newsapi.org/v2/everything".into()),
            language: std::env::var("NEWS_API_LANGUAGE").unwrap_or_else(|_| "es".into()),
            timeout_secs: parsed_var("NEWS_API_TIMEOUT_SECS")?.unwrap_or(10),
        };
        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173,http://localhost:5176".into())
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();
        let auth_rate_limit = RateLimitConfig {
            max_requests: parsed_var("AUTH_RATE_LIMIT_MAX")?.unwrap_or(50),
            window_secs: parsed_var("AUTH_RATE_LIMIT_WINDOW_SECS")?.unwrap_or(15 * 60),
        };
        if auth_rate_limit.window_secs == 0 {
            anyhow::bail!("AUTH_RATE_LIMIT_WINDOW_SECS must be positive");
        }

        Ok(Self {
            env,
            database_url,
            jwt,
            news,
            cors_origins,
            auth_rate_limit,
        })
    }

    /// Logs configuration that is allowed to be missing at startup but will
    /// fail the requests that need it.
    pub fn warn_missing_secrets(&self) {
        if self.jwt.secret.is_none() {
            tracing::warn!("JWT_SECRET is not set; signin and protected routes will fail");
        }
        if self.news.api_key.is_none() {
            tracing::warn!("NEWS_API_KEY is not set; /news will fail");
        }
    }
}

fn check_ttl_days(days: i64) -> anyhow::Result<i64> {
    if !(1..=MAX_TOKEN_TTL_DAYS).contains(&days) {
        anyhow::bail!("JWT_TTL_DAYS must be between 1 and {MAX_TOKEN_TTL_DAYS}, got {days}");
    }
    Ok(days)
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_var<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("{key} is not valid")),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_known_names() {
        assert_eq!(Environment::parse("production").unwrap(), Environment::Production);
        assert_eq!(Environment::parse(" Dev ").unwrap(), Environment::Development);
        assert_eq!(Environment::parse("test").unwrap(), Environment::Test);
        assert!(Environment::parse("staging").is_err());
    }

    #[test]
    fn token_lifetime_must_be_in_range() {
        assert_eq!(check_ttl_days(DEFAULT_TOKEN_TTL_DAYS).unwrap(), 120);
        assert_eq!(check_ttl_days(1).unwrap(), 1);
        assert_eq!(check_ttl_days(MAX_TOKEN_TTL_DAYS).unwrap(), MAX_TOKEN_TTL_DAYS);
        assert!(check_ttl_days(0).is_err());
        assert!(check_ttl_days(-5).is_err());
        assert!(check_ttl_days(i64::MAX).is_err());
    }

    #[test]
    fn only_production_hides_details() {
        assert!(Environment::Production.is_production());
        assert!(!Environment::Development.is_production());
        assert!(!Environment::Test.is_production());
    }
}
