//! Songshelf Library
//!
//! A searchable song catalogue whose visible entries are lazily enriched with
//! artwork. This library exposes the internal modules for testing and reuse.

pub mod artwork;
pub mod catalog;
pub mod config;
pub mod links;
pub mod normalize;
pub mod search;
pub mod terminal;
pub mod viewport;

// Re-export commonly used types for convenience
pub use artwork::{ArtworkCache, ArtworkLookup, ItunesClient};
pub use catalog::{CatalogStore, Song};
pub use normalize::{normalize, song_key, SongKey};
pub use search::SearchController;
pub use viewport::VisibilityScheduler;
