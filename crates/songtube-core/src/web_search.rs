//! YouTube search by scraping the results page
//!
//! The results page embeds its data as a `ytInitialData` JSON object. Each
//! `videoRenderer` inside the primary item sections becomes one
//! [`SearchResult`], keeping the display strings untouched so ranking sees
//! exactly what a visitor would.

use crate::error::SearchError;
use crate::search::{SearchBackend, SearchResult};
use async_trait::async_trait;
use reqwest::header::ACCEPT_LANGUAGE;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

const INITIAL_DATA_MARKER: &str = "ytInitialData";
const SECTION_CONTENTS: &str =
    "/contents/twoColumnSearchResultsRenderer/primaryContents/sectionListRenderer/contents";

#[derive(Debug, Clone)]
pub struct WebSearch {
    client: reqwest::Client,
    base_url: Url,
}

impl WebSearch {
    pub fn new(base_url: &str) -> Result<Self, SearchError> {
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: Url::parse(base_url)?,
        })
    }

    fn results_url(&self, query: &str) -> Result<Url, SearchError> {
        let mut url = self.base_url.join("/results")?;
        url.query_pairs_mut().append_pair("search_query", query);
        Ok(url)
    }
}

#[async_trait]
impl SearchBackend for WebSearch {
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>, SearchError> {
        let url = self.results_url(query)?;
        info!("Searching YouTube for: {}", query);

        let response = self
            .client
            .get(url)
            // Keep "views" and clock durations in the English format
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SearchError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let data = extract_initial_data(&body)?;

        let mut results = collect_videos(&data);
        results.truncate(count);
        debug!("Search returned {} candidates", results.len());

        Ok(results)
    }
}

/// Pull the `ytInitialData` object out of a results page.
pub fn extract_initial_data(page: &str) -> Result<Value, SearchError> {
    let marker = page
        .find(INITIAL_DATA_MARKER)
        .ok_or(SearchError::MissingInitialData)?;
    let rest = &page[marker..];
    let start = rest.find('{').ok_or(SearchError::MissingInitialData)?;

    // Stops after the first complete value, ignoring the trailing `;</script>`
    serde_json::Deserializer::from_str(&rest[start..])
        .into_iter::<Value>()
        .next()
        .ok_or(SearchError::MissingInitialData)?
        .map_err(|e| SearchError::Parse(e.to_string()))
}

fn collect_videos(data: &Value) -> Vec<SearchResult> {
    let Some(sections) = data.pointer(SECTION_CONTENTS).and_then(Value::as_array) else {
        return Vec::new();
    };

    sections
        .iter()
        .filter_map(|section| section.pointer("/itemSectionRenderer/contents"))
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(|item| item.get("videoRenderer"))
        .filter_map(video_to_result)
        .collect()
}

fn video_to_result(video: &Value) -> Option<SearchResult> {
    let url_suffix = video
        .pointer("/navigationEndpoint/commandMetadata/webCommandMetadata/url")
        .and_then(Value::as_str)?
        .to_string();

    let duration = video
        .pointer("/lengthText/simpleText")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(SearchResult {
        url_suffix,
        duration,
        views: text_of(video.get("viewCountText")).unwrap_or_else(|| "0".to_string()),
        title: text_of(video.get("title")),
    })
}

/// YouTube text is either `{"simpleText": ..}` or `{"runs": [{"text": ..}, ..]}`.
fn text_of(node: Option<&Value>) -> Option<String> {
    let node = node?;
    if let Some(text) = node.get("simpleText").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    let runs = node.get("runs")?.as_array()?;
    Some(
        runs.iter()
            .filter_map(|run| run.get("text").and_then(Value::as_str))
            .collect(),
    )
}
