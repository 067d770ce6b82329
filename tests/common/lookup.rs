use async_trait::async_trait;
use songshelf::artwork::{ArtworkLookup, LookupError};
use songshelf::{song_key, SongKey};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::Semaphore;

enum Response {
    Artwork(String),
    Failure(u16),
}

/// Mock lookup service with per-song responses and call counters.
///
/// Lookups block until [`MockLookup::open_gate`] is called, so tests can
/// observe the in-flight window.
pub struct MockLookup {
    responses: Mutex<HashMap<SongKey, Response>>,
    calls: Mutex<HashMap<SongKey, usize>>,
    gate: Semaphore,
    gate_open: AtomicBool,
}

#[allow(dead_code)]
impl MockLookup {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
            gate: Semaphore::new(0),
            gate_open: AtomicBool::new(false),
        }
    }

    pub fn set_artwork(&self, title: &str, artist: &str, url: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(song_key(title, artist), Response::Artwork(url.to_string()));
    }

    pub fn set_failure(&self, title: &str, artist: &str, status: u16) {
        self.responses
            .lock()
            .unwrap()
            .insert(song_key(title, artist), Response::Failure(status));
    }

    pub fn open_gate(&self) {
        if !self.gate_open.swap(true, Ordering::SeqCst) {
            self.gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    pub fn call_count(&self, title: &str, artist: &str) -> usize {
        *self
            .calls
            .lock()
            .unwrap()
            .get(&song_key(title, artist))
            .unwrap_or(&0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl ArtworkLookup for MockLookup {
    async fn lookup(&self, title: &str, artist: &str) -> Result<Option<String>, LookupError> {
        let key = song_key(title, artist);
        *self.calls.lock().unwrap().entry(key.clone()).or_insert(0) += 1;

        let _permit = self.gate.acquire().await.unwrap();

        match self.responses.lock().unwrap().get(&key) {
            Some(Response::Artwork(url)) => Ok(Some(url.clone())),
            Some(Response::Failure(status)) => Err(LookupError::Status(*status)),
            None => Ok(None),
        }
    }
}
