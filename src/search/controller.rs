use crate::artwork::Artwork;
use crate::catalog::{CatalogStore, CatalogueError, Song};
use crate::links::lyrics_link;
use crate::viewport::{PlaceholderHandle, VisibilityScheduler};
use std::sync::Arc;
use tracing::debug;

/// One song as handed to the render layer.
#[derive(Debug, Clone)]
pub struct RenderedRow {
    pub song: Arc<Song>,
    pub placeholder: PlaceholderHandle,
    /// Artwork already cached when the row was rendered.
    pub artwork: Option<Artwork>,
    pub lyrics_url: String,
}

/// The render layer: replaces the displayed result list wholesale.
pub trait ResultsView: Send + Sync {
    fn render(&self, status: &str, rows: Vec<RenderedRow>);

    /// Shows a status message with no result list, e.g. a catalogue error.
    fn show_status(&self, status: &str);
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub songs: Vec<Arc<Song>>,
    pub status: String,
    pub generation: u64,
}

pub fn status_line(showing: usize, total: usize) -> String {
    if showing == 0 {
        format!("No matches. Showing 0 of {} songs.", total)
    } else {
        format!("Showing {} of {} songs.", showing, total)
    }
}

/// Turns user input into a filtered, re-rendered result list.
pub struct SearchController {
    store: Arc<CatalogStore>,
    scheduler: Arc<VisibilityScheduler>,
    view: Arc<dyn ResultsView>,
}

impl SearchController {
    pub fn new(
        store: Arc<CatalogStore>,
        scheduler: Arc<VisibilityScheduler>,
        view: Arc<dyn ResultsView>,
    ) -> Self {
        Self {
            store,
            scheduler,
            view,
        }
    }

    /// Entry point for both keystrokes and explicit submits.
    ///
    /// Tears down the previous render's watches and renders a fresh list.
    /// Repeating a query against an unchanged catalogue renders the same set.
    pub fn apply_query(&self, raw_query: &str) -> SearchOutcome {
        let songs = self.store.filter(raw_query);
        let status = status_line(songs.len(), self.store.len());
        let generation = self.scheduler.begin_render();
        debug!(
            "Query {:?} matched {} songs (generation {})",
            raw_query,
            songs.len(),
            generation
        );

        let cache = self.scheduler.cache();
        let rows = songs
            .iter()
            .map(|song| {
                let title = song.display_title();
                let artist = song.display_artist();
                RenderedRow {
                    song: song.clone(),
                    placeholder: self.scheduler.watch(title, artist),
                    artwork: cache.cached_artwork(title, artist),
                    lyrics_url: lyrics_link(title, artist),
                }
            })
            .collect();
        self.view.render(&status, rows);

        SearchOutcome {
            songs,
            status,
            generation,
        }
    }

    /// Reports a failed catalogue load on the status surface.
    pub fn catalogue_error(&self, error: &CatalogueError) {
        self.scheduler.begin_render();
        self.view.show_status(&format!("Catalogue error: {}", error));
    }
}
