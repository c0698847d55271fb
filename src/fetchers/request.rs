use log::{debug, warn};
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::config::FetcherConfig;
use crate::error::FetchError;

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// Lowercased markers of bot-challenge and access-denied interstitials
const CHALLENGE_MARKERS: &[&str] = &[
    "cf-browser-verification",
    "challenge-platform",
    "<title>just a moment...</title>",
    "attention required! | cloudflare",
    "g-recaptcha",
    "h-captcha",
    "<title>access denied</title>",
    "verify you are human",
];

/// Pick a user agent from the pool
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS[rng.gen_range(0..USER_AGENTS.len())]
}

/// Whether the body looks like a bot-challenge page instead of content
pub fn looks_like_challenge(body: &str) -> bool {
    let head: String = body.chars().take(20_000).collect::<String>().to_lowercase();
    CHALLENGE_MARKERS.iter().any(|marker| head.contains(marker))
}

/// Outcome of a single direct attempt
#[derive(Debug)]
pub(crate) enum Attempt {
    Success(String),
    /// Failed in a way another attempt might fix
    Retry(FetchError),
    /// Rate limited by the site; retry after a longer pause
    Throttled(FetchError),
    /// No point retrying or escalating
    Fatal(FetchError),
}

/// Plain HTTP GET strategy with rotating browser-like headers
pub struct RequestFetcher {
    client: Client,
    min_delay_ms: u64,
    max_delay_ms: u64,
    min_body_bytes: usize,
}

impl RequestFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            min_delay_ms: config.min_delay_ms,
            max_delay_ms: config.max_delay_ms.max(config.min_delay_ms),
            min_body_bytes: config.min_body_bytes,
        })
    }

    fn headers(profile: usize) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(random_user_agent()));
        if profile % 2 == 0 {
            headers.insert(
                ACCEPT,
                HeaderValue::from_static(
                    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
                ),
            );
            headers.insert(
                ACCEPT_LANGUAGE,
                HeaderValue::from_static("nl-NL,nl;q=0.9,en;q=0.8"),
            );
            headers.insert("DNT", HeaderValue::from_static("1"));
            headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));
        } else {
            headers.insert(
                ACCEPT,
                HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
            );
            headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
            headers.insert(REFERER, HeaderValue::from_static("https://www.google.com/"));
        }
        headers
    }

    async fn human_delay(&self) {
        if self.max_delay_ms == 0 {
            return;
        }
        let millis = rand::thread_rng().gen_range(self.min_delay_ms..=self.max_delay_ms);
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }

    /// One GET with the header profile for `attempt`
    pub(crate) async fn attempt(&self, url: &str, attempt: usize) -> Attempt {
        self.human_delay().await;

        let response = match self
            .client
            .get(url)
            .headers(Self::headers(attempt))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Attempt::Retry(FetchError::from_reqwest(e)),
        };

        let status = response.status();
        debug!("GET {} -> {}", url, status);
        match status {
            StatusCode::FORBIDDEN => {
                warn!("403 Forbidden from {url}, site is blocking access");
                return Attempt::Retry(FetchError::Blocked(format!("{url} returned 403")));
            }
            StatusCode::NOT_FOUND | StatusCode::GONE => {
                return Attempt::Fatal(FetchError::NotFound(format!("{url} returned {status}")));
            }
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("429 from {url}, backing off");
                return Attempt::Throttled(FetchError::Blocked(format!("{url} returned 429")));
            }
            s if !s.is_success() => {
                return Attempt::Retry(FetchError::Network(format!("{url} returned {s}")));
            }
            _ => {}
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Attempt::Retry(FetchError::from_reqwest(e)),
        };

        if body.len() < self.min_body_bytes {
            warn!("Response from {url} too short: {} bytes", body.len());
            return Attempt::Retry(FetchError::Network(format!(
                "{url} returned an empty page"
            )));
        }

        if looks_like_challenge(&body) {
            warn!("Bot challenge detected on {url}");
            return Attempt::Retry(FetchError::Blocked(format!(
                "{url} served a bot challenge"
            )));
        }

        Attempt::Success(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> FetcherConfig {
        FetcherConfig {
            min_delay_ms: 0,
            max_delay_ms: 0,
            ..FetcherConfig::default()
        }
    }

    #[test]
    fn test_challenge_detection() {
        assert!(looks_like_challenge(
            "<html><head><title>Just a moment...</title></head></html>"
        ));
        assert!(looks_like_challenge(
            r#"<div class="g-recaptcha" data-sitekey="x"></div>"#
        ));
        assert!(!looks_like_challenge(
            "<html><body><ul class='ingredients'><li>200 g bloem</li></ul></body></html>"
        ));
    }

    #[test]
    fn test_random_user_agent_from_pool() {
        let agent = random_user_agent();
        assert!(USER_AGENTS.contains(&agent));
    }

    #[tokio::test]
    async fn test_attempt_maps_statuses() {
        let mut server = mockito::Server::new_async().await;
        let _forbidden = server.mock("GET", "/blocked").with_status(403).create_async().await;
        let _missing = server.mock("GET", "/missing").with_status(404).create_async().await;
        let _short = server
            .mock("GET", "/short")
            .with_status(200)
            .with_body("<html></html>")
            .create_async()
            .await;

        let fetcher = RequestFetcher::new(&fast_config()).unwrap();

        assert!(matches!(
            fetcher.attempt(&format!("{}/blocked", server.url()), 0).await,
            Attempt::Retry(FetchError::Blocked(_))
        ));
        assert!(matches!(
            fetcher.attempt(&format!("{}/missing", server.url()), 0).await,
            Attempt::Fatal(FetchError::NotFound(_))
        ));
        assert!(matches!(
            fetcher.attempt(&format!("{}/short", server.url()), 0).await,
            Attempt::Retry(FetchError::Network(_))
        ));
    }
}
