use songshelf::artwork::Artwork;
use songshelf::viewport::{PlaceholderHandle, PlaceholderSink};
use std::sync::Mutex;

/// Placeholder sink remembering every artwork application.
#[derive(Default)]
pub struct RecordingSink {
    applied: Mutex<Vec<(PlaceholderHandle, String)>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn applied(&self) -> Vec<(PlaceholderHandle, String)> {
        self.applied.lock().unwrap().clone()
    }

    pub fn artwork_for(&self, placeholder: PlaceholderHandle) -> Option<String> {
        self.applied
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(handle, _)| *handle == placeholder)
            .map(|(_, url)| url.clone())
    }
}

impl PlaceholderSink for RecordingSink {
    fn apply_artwork(&self, placeholder: PlaceholderHandle, artwork: &Artwork) {
        self.applied
            .lock()
            .unwrap()
            .push((placeholder, artwork.url().to_string()));
    }
}
