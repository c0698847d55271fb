use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::html_class::select_lines;
use super::{Candidates, Extractor, ParsingContext};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearnedPattern {
    pub selector: String,
    pub success_count: u32,
}

/// Selectors that worked before, remembered per domain
#[derive(Debug, Default)]
pub struct PatternMemory {
    patterns: Mutex<BTreeMap<String, LearnedPattern>>,
}

impl PatternMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, domain: &str) -> Option<LearnedPattern> {
        self.patterns
            .lock()
            .ok()
            .and_then(|patterns| patterns.get(domain).cloned())
    }

    /// Record a successful selector; a different selector replaces the old one
    pub fn record(&self, domain: &str, selector: &str) {
        if domain.is_empty() {
            return;
        }
        let Ok(mut patterns) = self.patterns.lock() else {
            return;
        };
        match patterns.get_mut(domain) {
            Some(pattern) if pattern.selector == selector => pattern.success_count += 1,
            _ => {
                info!("Learned new pattern for {domain}: {selector}");
                patterns.insert(
                    domain.to_string(),
                    LearnedPattern {
                        selector: selector.to_string(),
                        success_count: 1,
                    },
                );
            }
        }
    }

    pub fn snapshot(&self) -> BTreeMap<String, LearnedPattern> {
        self.patterns
            .lock()
            .map(|patterns| patterns.clone())
            .unwrap_or_default()
    }
}

/// Tries the selector remembered for the page's domain
pub struct LearnedExtractor<'a> {
    pub memory: &'a PatternMemory,
}

impl Extractor for LearnedExtractor<'_> {
    fn name(&self) -> &'static str {
        "learned"
    }

    fn extract(&self, context: &ParsingContext) -> Option<Candidates> {
        let pattern = self.memory.get(&context.domain)?;
        let lines = select_lines(context, &pattern.selector);
        (!lines.is_empty()).then(|| Candidates::new(self.name(), Some(pattern.selector.as_str()), lines))
    }
}
