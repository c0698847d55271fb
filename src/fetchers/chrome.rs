use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Renderer;
use crate::error::FetchError;

#[derive(Serialize)]
struct ContentRequest<'a> {
    url: &'a str,
    wait_ms: u64,
}

#[derive(Deserialize)]
struct ContentResponse {
    content: String,
}

/// Renders pages through an external headless-browser service.
///
/// The service owns the browser process; each call is one scoped render.
pub struct ChromeRenderer {
    endpoint: String,
    client: Client,
    wait_ms: u64,
}

impl ChromeRenderer {
    pub fn new(base_url: &str, wait_ms: u64) -> Self {
        let endpoint = format!("{}/api/fetch-content", base_url.trim_end_matches('/'));
        Self {
            endpoint,
            client: Client::new(),
            wait_ms,
        }
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    fn name(&self) -> &str {
        "chrome"
    }

    async fn render(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        debug!("Rendering {} via {}", url, self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(timeout)
            .json(&ContentRequest {
                url,
                wait_ms: self.wait_ms,
            })
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        match response.status() {
            s if s.is_success() => {}
            StatusCode::FORBIDDEN => {
                return Err(FetchError::Blocked(format!("renderer was blocked on {url}")))
            }
            StatusCode::NOT_FOUND => {
                return Err(FetchError::NotFound(format!("renderer got 404 for {url}")))
            }
            StatusCode::GATEWAY_TIMEOUT | StatusCode::REQUEST_TIMEOUT => {
                return Err(FetchError::Timeout(format!("renderer timed out on {url}")))
            }
            s => {
                return Err(FetchError::Network(format!(
                    "Chrome fetch failed with status: {s}"
                )))
            }
        }

        let content: ContentResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Network(format!("Invalid renderer response: {e}")))?;
        Ok(content.content)
    }
}
