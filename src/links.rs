//! Outbound reference links for a song.

const SEARCH_ENGINE_URL: &str = "https://www.google.com/search";

/// Search-engine query for the song's lyrics.
pub fn lyrics_link(title: &str, artist: &str) -> String {
    let query = urlencoding::encode(&format!("{} {} lyrics", title, artist)).into_owned();
    format!("{}?q={}", SEARCH_ENGINE_URL, query)
}
