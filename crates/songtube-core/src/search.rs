//! Search backend capability and result parsing

use crate::error::SearchError;
use async_trait::async_trait;
use regex::Regex;

pub const YOUTUBE_BASE_URL: &str = "https://www.youtube.com";

/// One candidate as shown on the results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Relative link, e.g. `/watch?v=dQw4w9WgXcQ`
    pub url_suffix: String,
    /// "M:SS" or "H:MM:SS"
    pub duration: String,
    /// Human formatted, e.g. "1,234,567 views"
    pub views: String,
    pub title: Option<String>,
}

/// Anything that can turn a query into a list of candidates.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Return up to `count` candidates for `query`, in backend order.
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>, SearchError>;
}

/// Parse a clock-style duration into seconds.
///
/// Every `:`-separated group is folded in, so "1:02:03" is 3723 and "3:45"
/// is 225. Returns `None` for empty input or non-numeric groups.
pub fn parse_duration(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    raw.split(':').try_fold(0u64, |total, group| {
        let value: u64 = group.trim().parse().ok()?;
        total.checked_mul(60)?.checked_add(value)
    })
}

/// Parse a view count by keeping only its digits. Never fails: text without
/// digits, or a number too large for `u64`, counts as zero.
pub fn parse_view_count(raw: &str) -> u64 {
    digits_only(raw).unwrap_or(0)
}

fn digits_only(raw: &str) -> Option<u64> {
    let re = Regex::new(r"[^0-9]").ok()?;
    re.replace_all(raw, "").parse().ok()
}
