//! iTunes Search API client for song artwork.

use super::{ArtworkLookup, LookupError};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const ITUNES_API_BASE: &str = "https://itunes.apple.com";

pub struct ItunesClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    #[serde(rename = "artworkUrl100")]
    artwork_url_100: Option<String>,
}

impl ItunesClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the search service (e.g., "https://itunes.apple.com")
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(base_url: &str, timeout_sec: u64) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    fn search_url(&self, title: &str, artist: &str) -> String {
        let term = urlencoding::encode(&format!("{} {}", title, artist)).into_owned();
        format!(
            "{}/search?term={}&media=music&entity=song&limit=1",
            self.base_url, term
        )
    }
}

/// Pulls the first result's artwork URL out of a search response body.
fn parse_artwork(body: &str) -> Result<Option<String>, LookupError> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response
        .results
        .into_iter()
        .next()
        .and_then(|r| r.artwork_url_100)
        .filter(|url| !url.trim().is_empty()))
}

#[async_trait]
impl ArtworkLookup for ItunesClient {
    async fn lookup(&self, title: &str, artist: &str) -> Result<Option<String>, LookupError> {
        let url = self.search_url(title, artist);
        debug!("Artwork lookup: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(LookupError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        parse_artwork(&body)
    }
}
