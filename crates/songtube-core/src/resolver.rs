//! Resolve a song query to a single accepted video

use crate::config::Config;
use crate::error::{ConfigError, ResolveError};
use crate::search::{parse_duration, parse_view_count, SearchBackend, SearchResult, YOUTUBE_BASE_URL};
use crate::token::AccessToken;
use tracing::{debug, info};

/// Gates applied to the most viewed candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptanceThresholds {
    /// Exclusive upper bound on duration
    pub max_length_seconds: u64,
    /// Exclusive lower bound on view count
    pub min_view_count: u64,
}

/// A candidate after its display strings have been parsed.
#[derive(Debug)]
struct RankedCandidate<'a> {
    result: &'a SearchResult,
    duration: Option<u64>,
    views: u64,
}

pub struct Resolver<B> {
    backend: B,
    token: AccessToken,
    base_url: String,
}

impl<B: SearchBackend> Resolver<B> {
    pub fn new(token: AccessToken, backend: B) -> Self {
        Self {
            backend,
            token,
            base_url: YOUTUBE_BASE_URL.to_string(),
        }
    }

    /// Build a resolver from configuration. Fails before touching the
    /// backend when no access token is configured.
    pub fn from_config(config: &Config, backend: B) -> Result<Self, ConfigError> {
        let token = config.access_token()?;
        Ok(Self::new(token, backend).with_base_url(&config.search.base_url))
    }

    /// Override the prefix used to turn relative links into locators.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.token
    }

    /// Search for `query` and return the locator of the most viewed
    /// candidate, provided it passes `thresholds`.
    ///
    /// A `result_count` of zero is treated as one.
    pub async fn search(
        &self,
        query: &str,
        thresholds: AcceptanceThresholds,
        result_count: usize,
    ) -> Result<String, ResolveError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ResolveError::InvalidQuery);
        }

        let results = self.backend.search(query, result_count.max(1)).await?;
        if results.is_empty() {
            return Err(ResolveError::ItemNotFound);
        }

        let chosen = rank(&results).ok_or(ResolveError::ItemNotFound)?;
        let locator = format!("{}{}", self.base_url, chosen.result.url_suffix);

        info!(
            "Chose {} ({} views) out of {} candidates",
            locator,
            chosen.views,
            results.len()
        );

        check_thresholds(&chosen, thresholds, locator)
    }
}

/// Parse every candidate and return the one with the most views. The sort is
/// stable, so ties go to the earliest candidate in backend order.
fn rank(results: &[SearchResult]) -> Option<RankedCandidate<'_>> {
    let mut candidates: Vec<RankedCandidate<'_>> = results
        .iter()
        .map(|result| {
            let candidate = RankedCandidate {
                result,
                duration: parse_duration(&result.duration),
                views: parse_view_count(&result.views),
            };
            debug!(
                "Candidate {}: duration {:?}s, {} views",
                result.url_suffix, candidate.duration, candidate.views
            );
            candidate
        })
        .collect();

    candidates.sort_by(|a, b| b.views.cmp(&a.views));
    candidates.into_iter().next()
}

fn check_thresholds(
    chosen: &RankedCandidate<'_>,
    thresholds: AcceptanceThresholds,
    locator: String,
) -> Result<String, ResolveError> {
    let Some(duration) = chosen.duration else {
        return Err(ResolveError::UnparsableDuration {
            raw: chosen.result.duration.clone(),
            locator,
        });
    };

    if duration >= thresholds.max_length_seconds {
        return Err(ResolveError::DurationExceeded {
            duration,
            max_length: thresholds.max_length_seconds,
            locator,
        });
    }

    if chosen.views <= thresholds.min_view_count {
        return Err(ResolveError::ViewCountTooLow {
            views: chosen.views,
            min_view_count: thresholds.min_view_count,
            locator,
        });
    }

    Ok(locator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default, Clone)]
    struct FakeSearch {
        results: Vec<SearchResult>,
        calls: Arc<AtomicUsize>,
        requested: Arc<AtomicUsize>,
    }

    impl FakeSearch {
        fn with(results: Vec<SearchResult>) -> Self {
            Self {
                results,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl SearchBackend for FakeSearch {
        async fn search(&self, _query: &str, count: usize) -> Result<Vec<SearchResult>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested.store(count, Ordering::SeqCst);
            Ok(self.results.clone())
        }
    }

    fn result(id: &str, duration: &str, views: &str) -> SearchResult {
        SearchResult {
            url_suffix: format!("/watch?v={}", id),
            duration: duration.to_string(),
            views: views.to_string(),
            title: None,
        }
    }

    fn token() -> AccessToken {
        AccessToken::new("token", "test").unwrap()
    }

    fn lenient() -> AcceptanceThresholds {
        AcceptanceThresholds {
            max_length_seconds: 600,
            min_view_count: 0,
        }
    }

    #[tokio::test]
    async fn test_picks_most_viewed_candidate() {
        let resolver = Resolver::new(
            token(),
            FakeSearch::with(vec![
                result("first", "3:00", "10 views"),
                result("popular", "3:30", "1,000,000 views"),
                result("middle", "4:00", "5,000 views"),
            ]),
        );

        let locator = resolver.search("artist song", lenient(), 3).await.unwrap();
        assert_eq!(locator, "https://www.youtube.com/watch?v=popular");
    }

    #[tokio::test]
    async fn test_ties_go_to_backend_order() {
        let resolver = Resolver::new(
            token(),
            FakeSearch::with(vec![
                result("low", "3:00", "1 view"),
                result("tie-a", "3:00", "500 views"),
                result("tie-b", "3:00", "500 views"),
            ]),
        );

        let locator = resolver.search("q", lenient(), 3).await.unwrap();
        assert_eq!(locator, "https://www.youtube.com/watch?v=tie-a");
    }

    #[tokio::test]
    async fn test_no_candidates_is_not_found() {
        let resolver = Resolver::new(token(), FakeSearch::default());
        let err = resolver.search("q", lenient(), 1).await.unwrap_err();
        assert!(matches!(err, ResolveError::ItemNotFound));
    }

    #[tokio::test]
    async fn test_duration_exceeded_checks_top_candidate_only() {
        // The short video is ignored because it is not the most viewed.
        let resolver = Resolver::new(
            token(),
            FakeSearch::with(vec![
                result("short", "2:00", "10 views"),
                result("long", "10:00", "9,999 views"),
            ]),
        );

        let err = resolver.search("q", lenient(), 2).await.unwrap_err();
        match err {
            ResolveError::DurationExceeded {
                duration,
                max_length,
                locator,
            } => {
                assert_eq!(duration, 600);
                assert_eq!(max_length, 600);
                assert_eq!(locator, "https://www.youtube.com/watch?v=long");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_hours_are_folded_into_duration() {
        let resolver = Resolver::new(
            token(),
            FakeSearch::with(vec![result("mix", "1:02:03", "1,000 views")]),
        );

        let thresholds = AcceptanceThresholds {
            max_length_seconds: 3600,
            min_view_count: 0,
        };
        let err = resolver.search("q", thresholds, 1).await.unwrap_err();
        assert!(matches!(err, ResolveError::DurationExceeded { duration: 3723, .. }));
    }

    #[tokio::test]
    async fn test_view_count_is_exclusive_lower_bound() {
        let resolver = Resolver::new(
            token(),
            FakeSearch::with(vec![result("meh", "3:00", "1,000 views")]),
        );

        let thresholds = AcceptanceThresholds {
            max_length_seconds: 600,
            min_view_count: 1000,
        };
        let err = resolver.search("q", thresholds, 1).await.unwrap_err();
        assert!(matches!(
            err,
            ResolveError::ViewCountTooLow {
                views: 1000,
                min_view_count: 1000,
                ..
            }
        ));

        let thresholds = AcceptanceThresholds {
            max_length_seconds: 600,
            min_view_count: 999,
        };
        assert!(resolver.search("q", thresholds, 1).await.is_ok());
    }

    #[tokio::test]
    async fn test_no_views_counts_as_zero() {
        let resolver = Resolver::new(
            token(),
            FakeSearch::with(vec![result("new", "3:00", "No views")]),
        );

        let err = resolver.search("q", lenient(), 1).await.unwrap_err();
        assert!(matches!(err, ResolveError::ViewCountTooLow { views: 0, .. }));
    }

    #[tokio::test]
    async fn test_live_stream_duration_is_unparsable() {
        let resolver = Resolver::new(
            token(),
            FakeSearch::with(vec![result("live", "", "12 watching")]),
        );

        let err = resolver.search("q", lenient(), 1).await.unwrap_err();
        assert!(matches!(err, ResolveError::UnparsableDuration { .. }));
    }

    #[tokio::test]
    async fn test_empty_query_skips_backend() {
        let backend = FakeSearch::with(vec![result("x", "3:00", "10 views")]);
        let calls = backend.calls.clone();
        let resolver = Resolver::new(token(), backend);

        let err = resolver.search("   ", lenient(), 1).await.unwrap_err();
        assert!(matches!(err, ResolveError::InvalidQuery));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_result_count_requests_one() {
        let backend = FakeSearch::with(vec![result("x", "3:00", "10 views")]);
        let requested = backend.requested.clone();
        let resolver = Resolver::new(token(), backend);

        resolver.search("q", lenient(), 0).await.unwrap();
        assert_eq!(requested.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_custom_base_url() {
        let resolver = Resolver::new(
            token(),
            FakeSearch::with(vec![result("x", "3:00", "10 views")]),
        )
        .with_base_url("https://music.youtube.com/");

        let locator = resolver.search("q", lenient(), 1).await.unwrap();
        assert_eq!(locator, "https://music.youtube.com/watch?v=x");
    }

    #[test]
    fn test_missing_token_fails_before_any_search() {
        let backend = FakeSearch::with(vec![result("x", "3:00", "10 views")]);
        let calls = backend.calls.clone();

        let err = Resolver::from_config(&Config::default(), backend).err().unwrap();
        assert!(matches!(err, ConfigError::ConfigurationMissing(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
