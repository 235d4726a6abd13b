use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Mutex,
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::{config::RateLimitConfig, error::AppError, state::AppState};

const LIMIT_MESSAGE: &str = "Too many authentication attempts, try again later";

/// Entries older than a window are swept once the table grows past this.
const SWEEP_THRESHOLD: usize = 10_000;

struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter keyed by client address.
pub struct RateLimiter {
    max: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(cfg: &RateLimitConfig) -> Self {
        Self {
            max: cfg.max_requests,
            window: cfg.window(),
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Counts one request for `key`; `false` once the window is used up.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        if windows.len() >= SWEEP_THRESHOLD {
            let window = self.window;
            windows.retain(|_, w| now.duration_since(w.started) <= window);
        }

        let entry = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) > self.window {
            entry.started = now;
            entry.count = 0;
        }
        if entry.count >= self.max {
            return false;
        }
        entry.count += 1;
        true
    }
}

/// First forwarded address, then `x-real-ip`, then the socket peer.
fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.trim().to_string())
        })
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".into())
}

pub async fn limit_auth_requests(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(req.headers(), peer);

    if !state.auth_limiter.check(&key) {
        warn!(client = %key, path = %req.uri().path(), "auth rate limit exceeded");
        return AppError::TooManyRequests(LIMIT_MESSAGE.into()).into_response();
    }
    next.run(req).await
}
