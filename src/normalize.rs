//! Text canonicalization shared by sorting, search matching and song identity.
//!
//! Search and deduplication must agree on what counts as "the same text", so
//! every comparison in the crate goes through [`normalize`].

use serde::Serialize;
use std::fmt;

/// Separator between the normalized title and artist inside a [`SongKey`].
/// `normalize` never emits it, which keeps keys collision-free.
const KEY_DELIMITER: char = '|';

fn is_apostrophe_variant(c: char) -> bool {
    // Includes the mojibake of U+2019 ("â€™") seen in badly re-encoded catalogues.
    matches!(c, '\'' | '\u{2019}' | '\u{2018}' | '\u{02BC}' | '\u{2032}' | 'â' | '€' | '™')
}

/// Canonical comparison form of `text`.
///
/// Lower-cases, folds apostrophe variants, spells out `&` as `and`, turns every
/// character outside `[a-z0-9]` and whitespace into a space, then collapses
/// whitespace runs and trims.
pub fn normalize(text: &str) -> String {
    let mut spaced = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        let c = if is_apostrophe_variant(c) { '\'' } else { c };
        match c {
            '&' => spaced.push_str("and"),
            'a'..='z' | '0'..='9' => spaced.push(c),
            _ => spaced.push(' '),
        }
    }
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Deduplication key of a song: normalized title and artist.
///
/// Used both for the artwork record map and for in-flight tracking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SongKey(String);

impl SongKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SongKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn song_key(title: &str, artist: &str) -> SongKey {
    let mut key = normalize(title);
    key.push(KEY_DELIMITER);
    key.push_str(&normalize(artist));
    SongKey(key)
}
