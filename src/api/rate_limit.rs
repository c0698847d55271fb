use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use log::warn;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use super::response::ApiError;
use super::AppState;
use crate::config::RateLimitConfig;
use crate::error::AnalysisError;

/// Tracked clients before stale windows are swept
const SWEEP_THRESHOLD: usize = 4096;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request budget per client
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    trust_proxy: bool,
    clients: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit: limit.max(1),
            window: window.max(Duration::from_secs(1)),
            trust_proxy: false,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.requests, Duration::from_secs(config.window_secs))
            .trusting_proxy(config.trust_proxy)
    }

    /// Take client identity from `X-Forwarded-For` instead of the peer address
    pub fn trusting_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }

    /// Identity a request is counted under
    pub fn client_key(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
        client_key(headers, peer, self.trust_proxy)
    }

    pub fn check(&self, client: &str) -> Result<(), AnalysisError> {
        self.check_at(client, Instant::now())
    }

    /// Count one request from `client` at `now`
    pub fn check_at(&self, client: &str, now: Instant) -> Result<(), AnalysisError> {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);

        if clients.len() > SWEEP_THRESHOLD {
            let window = self.window;
            clients.retain(|_, w| now.saturating_duration_since(w.started) < window);
        }

        let entry = clients.entry(client.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        let elapsed = now.saturating_duration_since(entry.started);
        if elapsed >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        if entry.count >= self.limit {
            let remaining = self.window.saturating_sub(now.saturating_duration_since(entry.started));
            let retry_after_secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
            return Err(AnalysisError::RateLimited {
                retry_after_secs: retry_after_secs.max(1),
            });
        }
        entry.count += 1;
        Ok(())
    }
}

/// Peer address of the connection.
///
/// The first `X-Forwarded-For` hop is used instead only when `trust_proxy`
/// is set, since clients can put anything in that header.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    let forwarded = || {
        headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|hop| !hop.is_empty())
            .map(str::to_string)
    };
    trust_proxy
        .then(forwarded)
        .flatten()
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware for the pipeline routes; rejects before the handler runs
pub async fn enforce(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let client = state.limiter.client_key(request.headers(), peer);

    match state.limiter.check(&client) {
        Ok(()) => next.run(request).await,
        Err(e) => {
            warn!("Rate limit exceeded for {client} on {}", request.uri().path());
            ApiError::plain(e).into_response()
        }
    }
}
