use super::ArtworkLookup;
use crate::normalize::{song_key, SongKey};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// An artwork image URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Artwork(String);

impl Artwork {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn url(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Artwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Settled outcome of a lookup. `Empty` means "looked up, nothing usable",
/// which is different from having no record at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtworkRecord {
    Found(Artwork),
    Empty,
}

impl ArtworkRecord {
    pub fn artwork(&self) -> Option<&Artwork> {
        match self {
            ArtworkRecord::Found(artwork) => Some(artwork),
            ArtworkRecord::Empty => None,
        }
    }
}

/// Completion of an outstanding lookup.
///
/// Yields the artwork only when the lookup found one. An empty or failed
/// lookup closes the channel and yields `None`.
#[derive(Debug)]
pub struct Resolution(oneshot::Receiver<Artwork>);

impl Resolution {
    pub async fn resolved(self) -> Option<Artwork> {
        self.0.await.ok()
    }
}

#[derive(Debug)]
pub enum Enrichment {
    /// A record already exists, nothing was dispatched.
    Ready(ArtworkRecord),
    /// Another caller's lookup is outstanding, nothing was dispatched.
    Pending(Resolution),
    /// This call dispatched the one lookup for the key.
    Dispatched(Resolution),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub found: usize,
    pub empty: usize,
    pub in_flight: usize,
    pub lookups_dispatched: u64,
}

#[derive(Default)]
struct CacheState {
    /// Write-once per key, never evicted.
    records: HashMap<SongKey, ArtworkRecord>,
    /// Keys with an outstanding lookup, with the callers waiting on it.
    in_flight: HashMap<SongKey, Vec<oneshot::Sender<Artwork>>>,
    lookups_dispatched: u64,
}

type SharedState = Arc<Mutex<CacheState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, CacheState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Stores `record` unless the key already has one, clears the in-flight entry
/// and wakes the waiters.
fn settle(state: &SharedState, key: SongKey, record: ArtworkRecord) {
    let (stored, waiters) = {
        let mut state = lock(state);
        let stored = state.records.entry(key.clone()).or_insert(record).clone();
        let waiters = state.in_flight.remove(&key).unwrap_or_default();
        (stored, waiters)
    };

    match stored {
        ArtworkRecord::Found(artwork) => {
            debug!("Artwork found for {}", key);
            for waiter in waiters {
                let _ = waiter.send(artwork.clone());
            }
        }
        // Dropping the senders tells every waiter there is nothing to show.
        ArtworkRecord::Empty => debug!("No artwork for {}", key),
    }
}

/// Settles its key as `Empty` if dropped before [`InFlightGuard::settle`], so
/// a panicking or aborted lookup never leaves the key in flight.
struct InFlightGuard {
    state: SharedState,
    key: Option<SongKey>,
}

impl InFlightGuard {
    fn settle(mut self, record: ArtworkRecord) {
        if let Some(key) = self.key.take() {
            settle(&self.state, key, record);
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            warn!("Artwork lookup for {} ended without a result", key);
            settle(&self.state, key, ArtworkRecord::Empty);
        }
    }
}

/// Process-wide artwork cache and lookup dispatcher.
///
/// It is the only writer of the record and in-flight maps. `ensure_enriched`
/// decides under a single lock, so concurrent callers for the same key never
/// issue two lookups.
pub struct ArtworkCache {
    state: SharedState,
    lookup: Arc<dyn ArtworkLookup>,
}

impl ArtworkCache {
    pub fn new(lookup: Arc<dyn ArtworkLookup>) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState::default())),
            lookup,
        }
    }

    /// Makes sure the song has, or is getting, an artwork record.
    ///
    /// Must be called from within a tokio runtime: a dispatched lookup runs on
    /// a spawned task. Lookup failures are recorded as `Empty` and never
    /// surface to the caller.
    pub fn ensure_enriched(&self, title: &str, artist: &str) -> Enrichment {
        let key = song_key(title, artist);
        let (sender, receiver) = oneshot::channel();

        {
            let mut state = lock(&self.state);
            if let Some(record) = state.records.get(&key) {
                return Enrichment::Ready(record.clone());
            }
            if let Some(waiters) = state.in_flight.get_mut(&key) {
                waiters.push(sender);
                return Enrichment::Pending(Resolution(receiver));
            }
            state.in_flight.insert(key.clone(), vec![sender]);
            state.lookups_dispatched += 1;
        }

        debug!("Dispatching artwork lookup for {}", key);
        let guard = InFlightGuard {
            state: self.state.clone(),
            key: Some(key),
        };
        let lookup = self.lookup.clone();
        let title = title.to_string();
        let artist = artist.to_string();

        tokio::spawn(async move {
            let record = match lookup.lookup(&title, &artist).await {
                Ok(Some(url)) if !url.trim().is_empty() => ArtworkRecord::Found(Artwork::new(url)),
                Ok(_) => ArtworkRecord::Empty,
                Err(e) => {
                    warn!("Artwork lookup failed for \"{}\" by \"{}\": {}", title, artist, e);
                    ArtworkRecord::Empty
                }
            };
            guard.settle(record);
        });

        Enrichment::Dispatched(Resolution(receiver))
    }

    pub fn record(&self, key: &SongKey) -> Option<ArtworkRecord> {
        lock(&self.state).records.get(key).cloned()
    }

    pub fn cached(&self, title: &str, artist: &str) -> Option<ArtworkRecord> {
        self.record(&song_key(title, artist))
    }

    /// Cached artwork, only when a lookup found one.
    pub fn cached_artwork(&self, title: &str, artist: &str) -> Option<Artwork> {
        self.cached(title, artist)
            .and_then(|record| record.artwork().cloned())
    }

    pub fn is_in_flight(&self, key: &SongKey) -> bool {
        lock(&self.state).in_flight.contains_key(key)
    }

    pub fn stats(&self) -> CacheStats {
        let state = lock(&self.state);
        let found = state
            .records
            .values()
            .filter(|r| matches!(r, ArtworkRecord::Found(_)))
            .count();
        CacheStats {
            found,
            empty: state.records.len() - found,
            in_flight: state.in_flight.len(),
            lookups_dispatched: state.lookups_dispatched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artwork::LookupError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Semaphore;

    enum Reply {
        Art(&'static str),
        Nothing,
        Fail,
        Panic,
    }

    /// Lookup that blocks until the test opens the gate.
    struct GatedLookup {
        gate: Semaphore,
        calls: AtomicUsize,
        reply: Reply,
    }

    impl GatedLookup {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                gate: Semaphore::new(0),
                calls: AtomicUsize::new(0),
                reply,
            })
        }

        fn open(&self) {
            self.gate.add_permits(1000);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ArtworkLookup for GatedLookup {
        async fn lookup(&self, _title: &str, _artist: &str) -> Result<Option<String>, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _permit = self.gate.acquire().await.unwrap();
            match self.reply {
                Reply::Art(url) => Ok(Some(url.to_string())),
                Reply::Nothing => Ok(None),
                Reply::Fail => Err(LookupError::Status(503)),
                Reply::Panic => panic!("lookup exploded"),
            }
        }
    }

    fn resolution(enrichment: Enrichment) -> Resolution {
        match enrichment {
            Enrichment::Dispatched(r) | Enrichment::Pending(r) => r,
            Enrichment::Ready(record) => panic!("unexpected ready record {:?}", record),
        }
    }

    #[tokio::test]
    async fn test_concurrent_ensure_dispatches_once() {
        let lookup = GatedLookup::new(Reply::Art("https://art/1.jpg"));
        let cache = ArtworkCache::new(lookup.clone());

        let first = cache.ensure_enriched("Let It Be", "The Beatles");
        let second = cache.ensure_enriched("let it be", "THE BEATLES");
        assert!(matches!(first, Enrichment::Dispatched(_)));
        assert!(matches!(second, Enrichment::Pending(_)));
        assert_eq!(cache.stats().lookups_dispatched, 1);
        assert!(cache.is_in_flight(&song_key("Let It Be", "The Beatles")));

        lookup.open();
        let art = resolution(first).resolved().await;
        assert_eq!(art, Some(Artwork::new("https://art/1.jpg")));
        assert_eq!(lookup.calls(), 1);
    }

    #[tokio::test]
    async fn test_pending_caller_also_receives_artwork() {
        let lookup = GatedLookup::new(Reply::Art("https://art/2.jpg"));
        let cache = ArtworkCache::new(lookup.clone());

        let first = resolution(cache.ensure_enriched("Heroes", "David Bowie"));
        let second = resolution(cache.ensure_enriched("Heroes", "David Bowie"));
        lookup.open();

        assert_eq!(first.resolved().await, Some(Artwork::new("https://art/2.jpg")));
        assert_eq!(second.resolved().await, Some(Artwork::new("https://art/2.jpg")));
    }

    #[tokio::test]
    async fn test_settled_key_is_cached_and_not_in_flight() {
        let lookup = GatedLookup::new(Reply::Art("https://art/3.jpg"));
        let cache = ArtworkCache::new(lookup.clone());
        lookup.open();

        resolution(cache.ensure_enriched("Song", "Artist"))
            .resolved()
            .await;

        let key = song_key("Song", "Artist");
        assert!(!cache.is_in_flight(&key));
        assert_eq!(
            cache.record(&key),
            Some(ArtworkRecord::Found(Artwork::new("https://art/3.jpg")))
        );
        assert!(matches!(
            cache.ensure_enriched("Song", "Artist"),
            Enrichment::Ready(ArtworkRecord::Found(_))
        ));
        assert_eq!(lookup.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_result_is_cached_and_never_retried() {
        let lookup = GatedLookup::new(Reply::Nothing);
        let cache = ArtworkCache::new(lookup.clone());
        lookup.open();

        let art = resolution(cache.ensure_enriched("Obscure", "Nobody"))
            .resolved()
            .await;
        assert_eq!(art, None);

        for _ in 0..3 {
            assert!(matches!(
                cache.ensure_enriched("Obscure", "Nobody"),
                Enrichment::Ready(ArtworkRecord::Empty)
            ));
        }
        assert_eq!(lookup.calls(), 1);
        assert_eq!(cache.cached_artwork("Obscure", "Nobody"), None);
    }

    #[tokio::test]
    async fn test_failure_is_recorded_as_empty() {
        let lookup = GatedLookup::new(Reply::Fail);
        let cache = ArtworkCache::new(lookup.clone());
        lookup.open();

        let art = resolution(cache.ensure_enriched("Broken", "Service"))
            .resolved()
            .await;
        assert_eq!(art, None);

        let key = song_key("Broken", "Service");
        assert!(!cache.is_in_flight(&key));
        assert_eq!(cache.record(&key), Some(ArtworkRecord::Empty));
        assert_eq!(
            cache.stats(),
            CacheStats {
                found: 0,
                empty: 1,
                in_flight: 0,
                lookups_dispatched: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_panicking_lookup_still_clears_in_flight() {
        let lookup = GatedLookup::new(Reply::Panic);
        let cache = ArtworkCache::new(lookup.clone());
        lookup.open();

        let art = resolution(cache.ensure_enriched("Boom", "Crash"))
            .resolved()
            .await;
        assert_eq!(art, None);

        let key = song_key("Boom", "Crash");
        assert!(!cache.is_in_flight(&key));
        assert_eq!(cache.record(&key), Some(ArtworkRecord::Empty));
    }

    #[tokio::test]
    async fn test_distinct_songs_dispatch_separately() {
        let lookup = GatedLookup::new(Reply::Art("https://art/x.jpg"));
        let cache = ArtworkCache::new(lookup.clone());

        let a = resolution(cache.ensure_enriched("One", "A"));
        let b = resolution(cache.ensure_enriched("One", "B"));
        lookup.open();
        a.resolved().await;
        b.resolved().await;

        assert_eq!(lookup.calls(), 2);
        assert_eq!(cache.stats().found, 2);
    }
}
