use crate::artwork::Artwork;
use crate::search::{RenderedRow, ResultsView};
use crate::viewport::{ObservationRegion, PlaceholderHandle, PlaceholderSink};
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct ViewState {
    status: String,
    rows: Vec<RenderedRow>,
    offset: usize,
    artwork: HashMap<PlaceholderHandle, Artwork>,
}

/// Scrollable result list printed to the terminal.
///
/// Acts as both the render target of the search controller and the
/// placeholder sink of the visibility scheduler.
pub struct TerminalView {
    region: ObservationRegion,
    state: Mutex<ViewState>,
}

impl TerminalView {
    pub fn new(region: ObservationRegion) -> Self {
        Self {
            region,
            state: Mutex::new(ViewState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Scrolls by whole pages, negative is up. Returns the new offset.
    pub fn scroll_pages(&self, pages: isize) -> usize {
        let mut state = self.lock();
        let delta = self.region.viewport_rows.saturating_mul(pages.unsigned_abs());
        let offset = if pages < 0 {
            state.offset.saturating_sub(delta)
        } else {
            state.offset.saturating_add(delta)
        };
        state.offset = self.region.clamp_offset(offset, state.rows.len());
        state.offset
    }

    /// Placeholders currently inside the observation region.
    pub fn intersecting_placeholders(&self) -> Vec<PlaceholderHandle> {
        let state = self.lock();
        state.rows[self.region.intersecting(state.offset, state.rows.len())]
            .iter()
            .map(|row| row.placeholder)
            .collect()
    }

    pub fn artwork_for(&self, placeholder: PlaceholderHandle) -> Option<Artwork> {
        self.lock().artwork.get(&placeholder).cloned()
    }

    /// Text of the current screen: status line, then the visible rows.
    pub fn draw(&self) -> String {
        let state = self.lock();
        let mut out = String::new();
        let _ = writeln!(out, "{}", state.status);

        let visible = self.region.visible(state.offset, state.rows.len());
        for (index, row) in state.rows[visible.clone()].iter().enumerate() {
            let art = match state.artwork.get(&row.placeholder) {
                Some(artwork) => format!("[art] {}", artwork),
                None => "[ .. ]".to_string(),
            };
            let _ = writeln!(
                out,
                "{:>4}. {} - {}\n      {}\n      lyrics: {}",
                visible.start + index + 1,
                row.song.display_title(),
                row.song.display_artist(),
                art,
                row.lyrics_url
            );
        }
        if visible.end < state.rows.len() {
            let _ = writeln!(out, "      ... {} more (:n)", state.rows.len() - visible.end);
        }
        out
    }
}

impl ResultsView for TerminalView {
    fn render(&self, status: &str, rows: Vec<RenderedRow>) {
        let mut state = self.lock();
        state.status = status.to_string();
        state.offset = 0;
        state.artwork = rows
            .iter()
            .filter_map(|row| row.artwork.clone().map(|art| (row.placeholder, art)))
            .collect();
        state.rows = rows;
    }

    fn show_status(&self, status: &str) {
        let mut state = self.lock();
        state.status = status.to_string();
        state.offset = 0;
        state.rows.clear();
        state.artwork.clear();
    }
}

impl PlaceholderSink for TerminalView {
    fn apply_artwork(&self, placeholder: PlaceholderHandle, artwork: &Artwork) {
        let mut state = self.lock();
        // Slots are handed out in render order, so a live handle indexes its row.
        let is_rendered = state
            .rows
            .get(placeholder.slot as usize)
            .is_some_and(|row| row.placeholder == placeholder);
        if is_rendered {
            state.artwork.insert(placeholder, artwork.clone());
        }
    }
}
