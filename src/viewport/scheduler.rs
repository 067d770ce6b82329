use crate::artwork::{Artwork, ArtworkCache, ArtworkRecord, Enrichment};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Identifies one rendered placeholder.
///
/// Every render begins a new generation, so a placeholder recreated by a
/// later render never shares a handle with its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceholderHandle {
    pub generation: u64,
    pub slot: u64,
}

/// The render layer's side of enrichment: fills a placeholder in place.
///
/// Called with the scheduler's lock held, implementations must not call back
/// into the scheduler.
pub trait PlaceholderSink: Send + Sync {
    fn apply_artwork(&self, placeholder: PlaceholderHandle, artwork: &Artwork);
}

#[derive(Debug)]
struct Watch {
    title: String,
    artist: String,
}

#[derive(Debug, Default)]
struct WatchState {
    generation: u64,
    next_slot: u64,
    watches: HashMap<PlaceholderHandle, Watch>,
}

type SharedWatches = Arc<Mutex<WatchState>>;

fn lock(state: &SharedWatches) -> MutexGuard<'_, WatchState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Applies `artwork` unless `placeholder` belongs to a torn-down render.
fn apply_if_live(
    state: &SharedWatches,
    sink: &dyn PlaceholderSink,
    placeholder: PlaceholderHandle,
    artwork: &Artwork,
) {
    let state = lock(state);
    if state.generation != placeholder.generation {
        debug!(
            "Dropping artwork for stale placeholder {:?} (live generation {})",
            placeholder, state.generation
        );
        return;
    }
    sink.apply_artwork(placeholder, artwork);
}

/// One-shot visibility triggers for rendered placeholders.
pub struct VisibilityScheduler {
    cache: Arc<ArtworkCache>,
    sink: Arc<dyn PlaceholderSink>,
    state: SharedWatches,
}

impl VisibilityScheduler {
    pub fn new(cache: Arc<ArtworkCache>, sink: Arc<dyn PlaceholderSink>) -> Self {
        Self {
            cache,
            sink,
            state: Arc::new(Mutex::new(WatchState::default())),
        }
    }

    pub fn cache(&self) -> &Arc<ArtworkCache> {
        &self.cache
    }

    /// Discards every watch of the previous render and starts a new generation.
    pub fn begin_render(&self) -> u64 {
        let mut state = lock(&self.state);
        let discarded = state.watches.len();
        state.watches.clear();
        state.generation += 1;
        state.next_slot = 0;
        debug!(
            "Render generation {} begins, {} stale watches discarded",
            state.generation, discarded
        );
        state.generation
    }

    /// Registers a one-shot trigger for a fresh placeholder of the current render.
    pub fn watch(&self, title: &str, artist: &str) -> PlaceholderHandle {
        let mut state = lock(&self.state);
        let handle = PlaceholderHandle {
            generation: state.generation,
            slot: state.next_slot,
        };
        state.next_slot += 1;
        state.watches.insert(
            handle,
            Watch {
                title: title.to_string(),
                artist: artist.to_string(),
            },
        );
        handle
    }

    /// Handles `placeholder` entering the observation region.
    ///
    /// The watch fires at most once. Unknown or stale handles are ignored.
    /// Must be called from within a tokio runtime.
    pub fn on_intersection(&self, placeholder: PlaceholderHandle) {
        let watch = {
            let mut state = lock(&self.state);
            if state.generation != placeholder.generation {
                return;
            }
            state.watches.remove(&placeholder)
        };
        let Some(watch) = watch else {
            return;
        };

        match self.cache.ensure_enriched(&watch.title, &watch.artist) {
            Enrichment::Ready(ArtworkRecord::Found(artwork)) => {
                apply_if_live(&self.state, self.sink.as_ref(), placeholder, &artwork);
            }
            Enrichment::Ready(ArtworkRecord::Empty) => {}
            Enrichment::Dispatched(resolution) | Enrichment::Pending(resolution) => {
                let state = self.state.clone();
                let sink = self.sink.clone();
                tokio::spawn(async move {
                    if let Some(artwork) = resolution.resolved().await {
                        apply_if_live(&state, sink.as_ref(), placeholder, &artwork);
                    }
                });
            }
        }
    }

    /// Batch form of [`Self::on_intersection`] for one round of intersection entries.
    pub fn report_visible<I>(&self, placeholders: I)
    where
        I: IntoIterator<Item = PlaceholderHandle>,
    {
        for placeholder in placeholders {
            self.on_intersection(placeholder);
        }
    }

    pub fn generation(&self) -> u64 {
        lock(&self.state).generation
    }

    pub fn watched_count(&self) -> usize {
        lock(&self.state).watches.len()
    }
}
