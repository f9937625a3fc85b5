//! Title Search
//!
//! A linear scan over candidate pages. A page matches when its title contains
//! the query case-insensitively. Results keep the order in which pages were
//! encountered (no relevance ranking) and scanning stops once `limit` matches
//! are collected.

use crate::config::EngineConfig;
use crate::models::{BlockKind, Page};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Optional search filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    /// Restrict results to one space
    #[serde(default)]
    pub space_id: Option<String>,
    /// Maximum results; defaults to `EngineConfig::search_default_limit`
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SearchOptions {
    pub fn in_space(space_id: impl Into<String>) -> Self {
        Self {
            space_id: Some(space_id.into()),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Effective limit, capped by `search_max_limit`
    pub fn effective_limit(&self, config: &EngineConfig) -> usize {
        self.limit
            .unwrap_or(config.search_default_limit)
            .min(config.search_max_limit)
    }
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub page: Page,
    /// First two paragraph blocks, truncated
    pub excerpt: String,
    /// Title with each occurrence of the query wrapped in highlight markers
    pub highlight: String,
}

/// Scan `pages` for titles containing `query`
///
/// The caller is responsible for excluding pages of deleted spaces.
pub fn search_pages<'a, I>(
    pages: I,
    query: &str,
    options: &SearchOptions,
    config: &EngineConfig,
) -> Vec<SearchResult>
where
    I: IntoIterator<Item = &'a Page>,
{
    let limit = options.effective_limit(config);
    if limit == 0 {
        return Vec::new();
    }

    let matcher = match query_matcher(query) {
        Ok(matcher) => matcher,
        Err(e) => {
            tracing::warn!("Unusable search query {:?}: {}", query, e);
            return Vec::new();
        }
    };

    let mut results = Vec::new();
    for page in pages {
        if let Some(space_id) = options.space_id.as_deref() {
            if page.space_id != space_id {
                continue;
            }
        }

        if !matcher.is_match(&page.title) {
            continue;
        }

        results.push(SearchResult {
            page: page.clone(),
            excerpt: build_excerpt(page, config.excerpt_length),
            highlight: highlight(&matcher, query, &page.title, config),
        });

        if results.len() >= limit {
            break;
        }
    }

    tracing::debug!("Search {:?} matched {} pages", query, results.len());
    results
}

fn query_matcher(query: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
}

/// Content of the first two non-empty paragraph blocks joined by a space,
/// cut to `max_chars` characters
///
/// Paragraph text is used as written; only blocks with no content at all
/// are skipped.
pub fn build_excerpt(page: &Page, max_chars: usize) -> String {
    let joined = page
        .content
        .iter()
        .filter(|block| matches!(block.kind, BlockKind::Paragraph))
        .map(|block| block.content.as_str())
        .filter(|text| !text.is_empty())
        .take(2)
        .collect::<Vec<_>>()
        .join(" ");

    joined.chars().take(max_chars).collect()
}

fn highlight(matcher: &Regex, query: &str, title: &str, config: &EngineConfig) -> String {
    if query.is_empty() {
        return title.to_string();
    }

    let mut out = String::with_capacity(title.len() + 16);
    let mut last = 0;
    for m in matcher.find_iter(title) {
        out.push_str(&title[last..m.start()]);
        out.push_str(&config.highlight_open);
        out.push_str(m.as_str());
        out.push_str(&config.highlight_close);
        last = m.end();
    }
    out.push_str(&title[last..]);
    out
}
