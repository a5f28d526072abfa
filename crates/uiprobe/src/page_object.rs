//! Page Object Model support.
//!
//! A page object is a named bundle of [`Locator`](crate::locator::Locator)s
//! plus a borrowed [`Page`]. It is created per scenario, holds no resolved
//! elements, and exposes task-level operations composed from the page's
//! primitive interactions.
//!
//! # Example
//!
//! ```ignore
//! struct LoginPage<'p> {
//!     page: &'p Page,
//!     username: Locator,
//! }
//!
//! impl PageObject for LoginPage<'_> {
//!     fn path(&self) -> &str {
//!         "/login"
//!     }
//!
//!     fn page(&self) -> &Page {
//!         self.page
//!     }
//! }
//! ```

use async_trait::async_trait;
use std::collections::HashMap;

use crate::page::Page;
use crate::result::ProbeResult;
use crate::wait::{wait_for, Observed};

/// A screen or widget of the site under test
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Site path the object lives at (e.g. `/text-box`)
    fn path(&self) -> &str;

    /// The page this object drives
    fn page(&self) -> &Page;

    /// Name for logs and reports
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Matcher for URLs that belong to this object
    fn url_matcher(&self) -> UrlMatcher {
        UrlMatcher::new(self.path())
    }

    /// Navigate straight to the object's path
    async fn open(&self) -> ProbeResult<()> {
        tracing::info!(page = self.page_name(), path = self.path(), "opening page object");
        self.page().goto(self.path()).await
    }

    /// Whether the page currently shows this object
    async fn is_loaded(&self) -> ProbeResult<bool> {
        let url = self.page().url().await?;
        Ok(self.url_matcher().matches(&url))
    }

    /// Poll until the page shows this object
    async fn wait_loaded(&self) -> ProbeResult<()> {
        let matcher = self.url_matcher();
        let options = self.page().config().assertion_wait();
        let page = self.page();
        wait_for(
            &format!("url to match {}", matcher.pattern()),
            || current_url_matches(page, &matcher),
            &options,
        )
        .await
        .map(|_| ())
    }
}

async fn current_url_matches(page: &Page, matcher: &UrlMatcher) -> ProbeResult<Observed> {
    let url = page.url().await?;
    Ok(Observed::new(matcher.matches(&url), url))
}

/// URL path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Parameter(String),
}

impl UrlMatcher {
    /// Create a matcher from a path pattern.
    ///
    /// Patterns support:
    /// - Literal segments: `/text-box`
    /// - Wildcards: `/books/*`
    /// - Named parameters: `/books/:isbn`
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == "*" {
                    UrlSegment::Wildcard
                } else if let Some(name) = s.strip_prefix(':') {
                    UrlSegment::Parameter(name.to_string())
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Path segments of a URL or bare path; query and fragment ignored
    fn path_segments(url: &str) -> Vec<&str> {
        let rest = url.split_once("://").map_or(url, |(_, rest)| {
            rest.find('/').map_or("", |i| &rest[i..])
        });
        let end = rest.find(['?', '#']).unwrap_or(rest.len());
        rest[..end].split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Check if a URL (absolute or path) matches the pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let url_segments = Self::path_segments(url);

        // wildcards and parameters each consume exactly one segment
        if url_segments.len() != self.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(url_segments)
            .all(|(segment, actual)| match segment {
                UrlSegment::Literal(lit) => lit == actual,
                UrlSegment::Wildcard | UrlSegment::Parameter(_) => true,
            })
    }

    /// Extract named parameters from a matching URL
    #[must_use]
    pub fn extract_params(&self, url: &str) -> HashMap<String, String> {
        let url_segments = Self::path_segments(url);
        self.segments
            .iter()
            .zip(url_segments)
            .filter_map(|(segment, actual)| match segment {
                UrlSegment::Parameter(name) => Some((name.clone(), actual.to_string())),
                _ => None,
            })
            .collect()
    }

    /// The original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod url_matcher_tests {
        use super::*;

        #[test]
        fn test_literal_match() {
            let matcher = UrlMatcher::new("/text-box");
            assert!(matcher.matches("https://demoqa.com/text-box"));
            assert!(matcher.matches("/text-box/"));
            assert!(matcher.matches("https://demoqa.com/text-box?x=1#top"));
            assert!(!matcher.matches("https://demoqa.com/checkbox"));
            assert!(!matcher.matches("https://demoqa.com/text-box/extra"));
        }

        #[test]
        fn test_root_pattern() {
            let matcher = UrlMatcher::new("/");
            assert!(matcher.matches("https://demoqa.com"));
            assert!(matcher.matches("https://demoqa.com/"));
            assert!(!matcher.matches("https://demoqa.com/elements"));
        }

        #[test]
        fn test_wildcard_and_parameters() {
            let matcher = UrlMatcher::new("/books/:isbn/*");
            assert!(matcher.matches("https://demoqa.com/books/9781449325862/reviews"));
            let params = matcher.extract_params("https://demoqa.com/books/9781449325862/reviews");
            assert_eq!(params.get("isbn").map(String::as_str), Some("9781449325862"));
            assert!(!matcher.matches("https://demoqa.com/books/9781449325862"));
            assert_eq!(matcher.pattern(), "/books/:isbn/*");
        }
    }
}
