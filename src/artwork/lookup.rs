use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("lookup service returned status {0}")]
    Status(u16),

    #[error("invalid lookup response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// External service resolving a song to an artwork image URL.
#[async_trait]
pub trait ArtworkLookup: Send + Sync {
    /// Returns the best candidate's artwork URL, or `None` when the service
    /// has no usable match.
    async fn lookup(&self, title: &str, artist: &str) -> Result<Option<String>, LookupError>;
}
