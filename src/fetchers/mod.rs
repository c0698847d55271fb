mod chrome;
mod request;

pub use chrome::ChromeRenderer;
pub use request::{looks_like_challenge, random_user_agent, RequestFetcher};

use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::FetcherConfig;
use crate::error::FetchError;
use request::Attempt;

/// Domains known to block scrapers outright
const BLOCKING_DOMAINS: &[&str] = &["ah.nl", "jumbo.com"];

/// How a document was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    Direct,
    Rendered,
}

/// Raw page returned by a fetcher
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    pub url: String,
    pub html: String,
    pub strategy: FetchStrategy,
}

/// Headless-browser capability: load `url`, wait for scripts, return the DOM as HTML
#[async_trait]
pub trait Renderer: Send + Sync {
    fn name(&self) -> &str;

    async fn render(&self, url: &str, timeout: Duration) -> Result<String, FetchError>;
}

/// Source of recipe pages for the URL pipeline
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a page, escalating through strategies as needed
    async fn fetch(&self, url: &str) -> Result<HtmlDocument, FetchError>;

    /// Fetch through the rendering strategy only; `None` when no renderer exists
    async fn render(&self, _url: &str) -> Option<Result<HtmlDocument, FetchError>> {
        None
    }
}

/// Lowercased host without a `www.` prefix
pub fn domain_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        .map(|h| h.trim_start_matches("www.").to_string())
        .unwrap_or_default()
}

/// Direct HTTP first, then the renderer, each retried with linear backoff
pub struct LayeredFetcher {
    request: RequestFetcher,
    renderer: Option<Arc<dyn Renderer>>,
    request_attempts: u32,
    render_attempts: u32,
    retry_delay: Duration,
    render_timeout: Duration,
}

impl LayeredFetcher {
    pub fn new(
        config: &FetcherConfig,
        renderer: Option<Arc<dyn Renderer>>,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            request: RequestFetcher::new(config)?,
            renderer,
            request_attempts: config.request_attempts.max(1),
            render_attempts: config.render_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            render_timeout: config.render_timeout(),
        })
    }

    /// Build from configuration, wiring the Chrome renderer when a URL is configured
    pub fn from_config(config: &FetcherConfig) -> Result<Self, FetchError> {
        let renderer = config.renderer_url().map(|url| {
            info!("Headless rendering enabled via {url}");
            Arc::new(ChromeRenderer::new(&url, config.render_wait_ms)) as Arc<dyn Renderer>
        });
        Self::new(config, renderer)
    }

    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    async fn fetch_direct(&self, url: &str, errors: &mut Vec<FetchError>) -> Option<String> {
        for attempt in 1..=self.request_attempts {
            info!(
                "Direct fetch attempt {}/{} for {}",
                attempt, self.request_attempts, url
            );
            let backoff = match self.request.attempt(url, attempt as usize - 1).await {
                Attempt::Success(html) => return Some(html),
                Attempt::Fatal(e) => {
                    errors.push(e);
                    return None;
                }
                Attempt::Retry(e) => {
                    warn!("Direct fetch failed (attempt {attempt}): {e}");
                    errors.push(e);
                    self.retry_delay * attempt
                }
                Attempt::Throttled(e) => {
                    errors.push(e);
                    self.retry_delay * attempt * 5
                }
            };
            if attempt < self.request_attempts {
                debug!("Waiting {:?} before retry", backoff);
                sleep(backoff).await;
            }
        }
        None
    }

    async fn fetch_rendered(
        &self,
        renderer: &dyn Renderer,
        url: &str,
        errors: &mut Vec<FetchError>,
    ) -> Option<String> {
        for attempt in 1..=self.render_attempts {
            info!(
                "Render attempt {}/{} for {} via {}",
                attempt,
                self.render_attempts,
                url,
                renderer.name()
            );
            match renderer.render(url, self.render_timeout).await {
                Ok(html) if !html.trim().is_empty() => return Some(html),
                Ok(_) => errors.push(FetchError::Network(format!("renderer returned nothing for {url}"))),
                Err(e) => {
                    warn!("Render failed (attempt {attempt}): {e}");
                    let fatal = matches!(e, FetchError::NotFound(_));
                    errors.push(e);
                    if fatal {
                        return None;
                    }
                }
            }
            if attempt < self.render_attempts {
                sleep(self.retry_delay * attempt).await;
            }
        }
        None
    }
}

/// Collapse the errors of every attempt into the one reported to the caller
fn classify(url: &str, errors: Vec<FetchError>) -> FetchError {
    if let Some(e) = errors.iter().find(|e| matches!(e, FetchError::NotFound(_))) {
        return e.clone();
    }
    if let Some(e) = errors.iter().find(|e| matches!(e, FetchError::Blocked(_))) {
        return e.clone();
    }
    if !errors.is_empty() && errors.iter().all(|e| matches!(e, FetchError::Timeout(_))) {
        return errors[0].clone();
    }
    let domain = domain_of(url);
    if BLOCKING_DOMAINS
        .iter()
        .any(|d| domain == *d || domain.ends_with(&format!(".{d}")))
    {
        return FetchError::Blocked(format!("{domain} blocks automated access"));
    }
    errors
        .into_iter()
        .last()
        .map(|e| match e {
            FetchError::Timeout(msg) | FetchError::Network(msg) => FetchError::Network(msg),
            other => other,
        })
        .unwrap_or_else(|| FetchError::Network(format!("all fetch strategies failed for {url}")))
}

#[async_trait]
impl Fetcher for LayeredFetcher {
    async fn fetch(&self, url: &str) -> Result<HtmlDocument, FetchError> {
        let mut errors = Vec::new();

        if let Some(html) = self.fetch_direct(url, &mut errors).await {
            return Ok(HtmlDocument {
                url: url.to_string(),
                html,
                strategy: FetchStrategy::Direct,
            });
        }

        let terminal = errors.iter().any(|e| matches!(e, FetchError::NotFound(_)));
        if let (Some(renderer), false) = (&self.renderer, terminal) {
            info!("Direct fetch failed, escalating to {}", renderer.name());
            if let Some(html) = self.fetch_rendered(renderer.as_ref(), url, &mut errors).await {
                return Ok(HtmlDocument {
                    url: url.to_string(),
                    html,
                    strategy: FetchStrategy::Rendered,
                });
            }
        }

        Err(classify(url, errors))
    }

    async fn render(&self, url: &str) -> Option<Result<HtmlDocument, FetchError>> {
        let renderer = self.renderer.as_ref()?;
        let mut errors = Vec::new();
        let result = match self.fetch_rendered(renderer.as_ref(), url, &mut errors).await {
            Some(html) => Ok(HtmlDocument {
                url: url.to_string(),
                html,
                strategy: FetchStrategy::Rendered,
            }),
            None => Err(classify(url, errors)),
        };
        Some(result)
    }
}
