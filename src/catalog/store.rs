use super::Song;
use crate::normalize::normalize;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// A song together with its normalized fields, computed once at load time.
#[derive(Debug)]
struct Entry {
    song: Arc<Song>,
    title: String,
    artist: String,
}

impl Entry {
    fn new(song: Song) -> Self {
        Self {
            title: normalize(&song.title),
            artist: normalize(&song.artist),
            song: Arc::new(song),
        }
    }

    fn matches(&self, term: &str) -> bool {
        self.title.contains(term) || self.artist.contains(term)
    }
}

/// Holds the full catalogue sorted by normalized title, then artist.
///
/// Filtered views share the stored `Arc<Song>`s, they never own songs.
#[derive(Debug)]
pub struct CatalogStore {
    entries: RwLock<Arc<[Entry]>>,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self {
            entries: RwLock::new(Arc::from(Vec::new())),
        }
    }
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_songs(songs: Vec<Song>) -> Self {
        let store = Self::new();
        store.load(songs);
        store
    }

    /// Replaces the catalogue with `songs`, stably sorted.
    pub fn load(&self, songs: Vec<Song>) {
        let mut entries: Vec<Entry> = songs.into_iter().map(Entry::new).collect();
        // `sort_by` is stable: identical keys keep their source order.
        entries.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.artist.cmp(&b.artist)));
        debug!("Catalogue loaded with {} songs", entries.len());
        *self.entries.write().unwrap_or_else(|e| e.into_inner()) = entries.into();
    }

    fn snapshot(&self) -> Arc<[Entry]> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All songs in stored order.
    pub fn songs(&self) -> Vec<Arc<Song>> {
        self.snapshot().iter().map(|e| e.song.clone()).collect()
    }

    /// Songs whose normalized title or artist contains the normalized `query`.
    ///
    /// An empty query yields the whole catalogue. Ordering always follows the
    /// stored sort order.
    pub fn filter(&self, query: &str) -> Vec<Arc<Song>> {
        let term = normalize(query);
        let entries = self.snapshot();
        if term.is_empty() {
            return entries.iter().map(|e| e.song.clone()).collect();
        }
        entries
            .iter()
            .filter(|e| e.matches(&term))
            .map(|e| e.song.clone())
            .collect()
    }
}
