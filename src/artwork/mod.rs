//! Lazy, deduplicated artwork enrichment.
//!
//! - `cache`: the write-once record map, in-flight tracking and dispatch
//! - `lookup`: the lookup service seam
//! - `itunes`: iTunes Search API implementation of the seam

mod cache;
mod itunes;
mod lookup;

pub use cache::{Artwork, ArtworkCache, ArtworkRecord, CacheStats, Enrichment, Resolution};
pub use itunes::{ItunesClient, ITUNES_API_BASE};
pub use lookup::{ArtworkLookup, LookupError};
