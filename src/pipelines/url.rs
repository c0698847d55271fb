use ::url::{Host, Url};
use log::{info, warn};
use std::net::{Ipv4Addr, Ipv6Addr};

use super::{enter, Analyzer, Stage};
use crate::aggregate::AnalyseOptions;
use crate::error::{AnalysisError, ExtractionError};
use crate::fetchers::FetchStrategy;
use crate::model::RecipeAnalysis;

fn is_private_v4(ip: &Ipv4Addr) -> bool {
    ip.is_loopback() || ip.is_private() || ip.is_link_local() || ip.is_unspecified()
}

fn is_private_v6(ip: &Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || (first & 0xfe00) == 0xfc00
        || (first & 0xffc0) == 0xfe80
        || ip.to_ipv4_mapped().is_some_and(|v4| is_private_v4(&v4))
}

/// Accept only http(s) URLs of reasonable length, on public hosts unless
/// `allow_private` is set
pub fn validate(url: &str, max_len: usize, allow_private: bool) -> Result<(), AnalysisError> {
    let invalid = |msg: &str| Err(AnalysisError::Validation(msg.to_string()));
    let url = url.trim();

    if url.is_empty() {
        return invalid("URL is required");
    }
    if url.len() > max_len {
        return invalid("URL is too long");
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return invalid("URL must start with http:// or https://");
    }
    let Ok(parsed) = Url::parse(url) else {
        return invalid("URL is not valid");
    };
    let local = match parsed.host() {
        None => return invalid("URL has no host"),
        Some(Host::Domain(domain)) => {
            let domain = domain.to_lowercase();
            domain == "localhost" || domain.ends_with(".localhost") || domain.ends_with(".local")
        }
        Some(Host::Ipv4(ip)) => is_private_v4(&ip),
        Some(Host::Ipv6(ip)) => is_private_v6(&ip),
    };
    if local && !allow_private {
        return invalid("Local or private addresses are not allowed");
    }
    Ok(())
}

/// Fetch a page, extract its ingredients and score them.
///
/// A page whose plain HTML has no ingredient list is rendered once more
/// through the headless strategy, for sites that build the list in script.
pub async fn process(
    analyzer: &Analyzer,
    url: &str,
    options: AnalyseOptions,
) -> Result<RecipeAnalysis, AnalysisError> {
    enter(Stage::Fetching, url);
    let document = analyzer.fetcher.fetch(url).await?;

    enter(Stage::Extracting, url);
    let extracted = match analyzer.extractor.extract(&document.url, &document.html) {
        Ok(extracted) => extracted,
        Err(ExtractionError::NoIngredientsFound)
            if document.strategy == FetchStrategy::Direct =>
        {
            match analyzer.fetcher.render(url).await {
                Some(Ok(rendered)) => {
                    info!("No ingredients in direct HTML of {url}, retrying rendered page");
                    analyzer.extractor.extract(&rendered.url, &rendered.html)?
                }
                Some(Err(e)) => {
                    warn!("Rendering {url} after empty extraction failed: {e}");
                    return Err(ExtractionError::NoIngredientsFound.into());
                }
                None => return Err(ExtractionError::NoIngredientsFound.into()),
            }
        }
        Err(e) => return Err(e.into()),
    };

    Ok(analyzer.score(extracted, options).await)
}
