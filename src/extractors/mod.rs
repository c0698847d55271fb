//! Turns a fetched page or pasted text into raw ingredient lines.
//!
//! HTML goes through an ordered cascade of strategies. The first strategy
//! producing a full group of lines wins; when none does, the earliest
//! partial group is used.

pub mod filters;
mod heading;
mod html_class;
mod json_ld;
mod learned;
mod microdata;
pub mod site;
mod text;
mod title;

pub use heading::HeadingExtractor;
pub use html_class::HtmlClassExtractor;
pub use json_ld::JsonLdExtractor;
pub use learned::{LearnedExtractor, LearnedPattern, PatternMemory};
pub use microdata::MicroDataExtractor;
pub use site::{SiteExtractor, SiteProfile, SITE_PROFILES};
pub use text::{extract_text, DEFAULT_TEXT_TITLE};
pub use title::{extract_title, DEFAULT_TITLE};

use log::{debug, info};
use scraper::{ElementRef, Html};
use std::sync::Arc;

use crate::error::ExtractionError;
use crate::fetchers::domain_of;
use crate::model::{ExtractedRecipe, RawIngredientLine};

/// Lines a strategy must produce to win outright
pub const WINNING_GROUP_SIZE: usize = 3;

pub struct ParsingContext {
    pub url: String,
    pub domain: String,
    pub document: Html,
}

impl ParsingContext {
    pub fn new(url: &str, html: &str) -> Self {
        Self {
            url: url.to_string(),
            domain: domain_of(url),
            document: Html::parse_document(html),
        }
    }
}

/// Lines proposed by one strategy
#[derive(Debug, Clone, PartialEq)]
pub struct Candidates {
    pub strategy: &'static str,
    pub selector: Option<String>,
    pub lines: Vec<String>,
}

impl Candidates {
    pub fn new(strategy: &'static str, selector: Option<&str>, lines: Vec<String>) -> Self {
        Self {
            strategy,
            selector: selector.map(str::to_string),
            lines,
        }
    }

    fn source(&self) -> String {
        match &self.selector {
            Some(selector) => format!("{}:{}", self.strategy, selector),
            None => self.strategy.to_string(),
        }
    }
}

/// One ingredient-finding strategy
pub trait Extractor {
    fn name(&self) -> &'static str;

    /// Screened lines, or `None` when the strategy does not apply to the page
    fn extract(&self, context: &ParsingContext) -> Option<Candidates>;
}

/// All text under an element, space separated
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ")
}

/// Cascade driver for HTML pages
pub struct HtmlExtractor {
    patterns: Arc<PatternMemory>,
    html_class: HtmlClassExtractor,
    max_lines: usize,
}

impl HtmlExtractor {
    pub fn new(patterns: Arc<PatternMemory>, max_lines: usize) -> Self {
        Self {
            patterns,
            html_class: HtmlClassExtractor::new(),
            max_lines,
        }
    }

    pub fn patterns(&self) -> &PatternMemory {
        &self.patterns
    }

    fn run_cascade(&self, context: &ParsingContext) -> Option<Candidates> {
        let learned = LearnedExtractor {
            memory: &self.patterns,
        };
        let cascade: [&dyn Extractor; 6] = [
            &SiteExtractor,
            &learned,
            &JsonLdExtractor,
            &MicroDataExtractor,
            &self.html_class,
            &HeadingExtractor,
        ];

        let mut partial: Option<Candidates> = None;
        for extractor in cascade {
            match extractor.extract(context) {
                Some(candidates) if candidates.lines.len() >= WINNING_GROUP_SIZE => {
                    debug!(
                        "{} won with {} lines",
                        extractor.name(),
                        candidates.lines.len()
                    );
                    return Some(candidates);
                }
                Some(candidates) => {
                    debug!(
                        "{} found only {} lines",
                        extractor.name(),
                        candidates.lines.len()
                    );
                    partial.get_or_insert(candidates);
                }
                None => debug!("{} found nothing", extractor.name()),
            }
        }
        partial
    }

    fn remember(&self, domain: &str, winner: &Candidates) {
        let Some(selector) = winner.selector.as_deref() else {
            return;
        };
        let learnable = match winner.strategy {
            "learned" => true,
            "html_class" => site::profile_for(domain).is_none(),
            _ => false,
        };
        if learnable {
            self.patterns.record(domain, selector);
        }
    }

    /// Title and ingredient lines of an HTML page
    pub fn extract(&self, url: &str, html: &str) -> Result<ExtractedRecipe, ExtractionError> {
        let context = ParsingContext::new(url, html);
        let winner = self
            .run_cascade(&context)
            .ok_or(ExtractionError::NoIngredientsFound)?;
        self.remember(&context.domain, &winner);

        let source = winner.source();
        info!(
            "Extracted {} ingredient lines from {} via {}",
            winner.lines.len(),
            context.url,
            source
        );

        let lines = winner
            .lines
            .into_iter()
            .take(self.max_lines)
            .enumerate()
            .map(|(position, text)| RawIngredientLine {
                text,
                source: source.clone(),
                position,
            })
            .collect();

        Ok(ExtractedRecipe {
            title: extract_title(&context.document),
            lines,
        })
    }
}
