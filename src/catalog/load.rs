use super::Song;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

/// Where the catalogue lives: a local JSON file or an `http(s)` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogueSource {
    File(PathBuf),
    Url(String),
}

impl CatalogueSource {
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            CatalogueSource::Url(s.to_string())
        } else {
            CatalogueSource::File(PathBuf::from(s))
        }
    }
}

impl std::fmt::Display for CatalogueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogueSource::File(path) => write!(f, "{}", path.display()),
            CatalogueSource::Url(url) => f.write_str(url),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP {0} loading songs.json")]
    Status(u16),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid catalogue JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Fetches and parses the catalogue once. No retry, no pagination.
pub async fn load_songs(source: &CatalogueSource) -> Result<Vec<Song>, CatalogueError> {
    info!("Loading catalogue from {}...", source);
    let result = match source {
        CatalogueSource::File(path) => {
            let text = tokio::fs::read_to_string(path).await?;
            serde_json::from_str::<Vec<Song>>(&text).map_err(CatalogueError::from)
        }
        CatalogueSource::Url(url) => fetch_songs(url).await,
    };

    match &result {
        Ok(songs) => info!("Catalogue has {} songs", songs.len()),
        Err(e) => warn!("Could not load catalogue from {}: {}", source, e),
    }
    result
}

async fn fetch_songs(url: &str) -> Result<Vec<Song>, CatalogueError> {
    let response = reqwest::get(url).await?;
    if !response.status().is_success() {
        return Err(CatalogueError::Status(response.status().as_u16()));
    }
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}
