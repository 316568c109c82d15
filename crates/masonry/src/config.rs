//! Tunables for the masonry balancer.
//!
//! Defaults reproduce the production block. Hosts can override them from the
//! environment, and the page URL can switch on per-cell diagnostics.

use core::time::Duration;
use std::env;
use url::Url;

/// Query parameter that turns on per-cell height diagnostics.
pub const DEBUG_QUERY_PARAM: &str = "debug-template-list";

#[derive(Clone, Debug, PartialEq)]
pub struct MasonryConfig {
    /// Delay before re-measuring a container that has no width yet
    pub retry_delay_ms: u64,
    /// How many pending cells get their images switched to eager loading
    pub eager_lookahead: usize,
    /// Slack allowed when deciding whether a cell fits a column height gap
    pub fill_tolerance_px: f64,
    /// Vertical margin added to a placeholder's authored height
    pub placeholder_margin_px: f64,
    /// Give up after this many consecutive deferred measurements (host only)
    pub measure_retry_limit: Option<u32>,
    /// Log computed vs. measured height for every placed cell
    pub debug: bool,
}

impl Default for MasonryConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: 200,
            eager_lookahead: 5,
            fill_tolerance_px: 50.0,
            placeholder_margin_px: 20.0,
            measure_retry_limit: None,
            debug: false,
        }
    }
}

impl MasonryConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `MASONRY_RETRY_MS`: re-measure delay in milliseconds (default: 200)
    /// - `MASONRY_EAGER_LOOKAHEAD`: eager-loaded cells ahead of the head (default: 5)
    /// - `MASONRY_MEASURE_RETRIES`: retry cap for the async host (default: unbounded)
    /// - `MASONRY_DEBUG`: set to "1" to enable per-cell diagnostics
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let retry_delay_ms = env::var("MASONRY_RETRY_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(defaults.retry_delay_ms)
            .max(1);
        let eager_lookahead = env::var("MASONRY_EAGER_LOOKAHEAD")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(defaults.eager_lookahead);
        let measure_retry_limit = env::var("MASONRY_MEASURE_RETRIES")
            .ok()
            .and_then(|val| val.parse::<u32>().ok());
        let debug = env::var("MASONRY_DEBUG").ok().as_deref() == Some("1");
        Self {
            retry_delay_ms,
            eager_lookahead,
            measure_retry_limit,
            debug,
            ..defaults
        }
    }

    /// Enable diagnostics when the page was opened with [`DEBUG_QUERY_PARAM`].
    #[must_use]
    pub fn with_page_url(mut self, url: &Url) -> Self {
        if url.query_pairs().any(|(name, _)| name == DEBUG_QUERY_PARAM) {
            self.debug = true;
        }
        self
    }

    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_url_query_enables_debug() {
        let plain = Url::parse("https://example.com/templates?tab=all").unwrap();
        let flagged = Url::parse("https://example.com/templates?debug-template-list")
            .unwrap();

        assert!(!MasonryConfig::default().with_page_url(&plain).debug);
        assert!(MasonryConfig::default().with_page_url(&flagged).debug);
    }

    #[test]
    fn defaults_match_the_block() {
        let config = MasonryConfig::default();
        assert_eq!(config.retry_delay(), Duration::from_millis(200));
        assert_eq!(config.eager_lookahead, 5);
        assert_eq!(config.measure_retry_limit, None);
    }
}
