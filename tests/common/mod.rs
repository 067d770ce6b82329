//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{MockLookup, RecordingSink};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let lookup = MockLookup::new();
//!     lookup.set_artwork("Let It Be", "The Beatles", "https://art/let-it-be.jpg");
//!     lookup.open_gate();
//! }
//! ```

mod lookup;
mod sink;

pub use lookup::MockLookup;
#[allow(unused_imports)]
pub use sink::RecordingSink;

use songshelf::artwork::ArtworkCache;
use std::time::Duration;

const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Waits until `cache` has no lookup in flight, then yields so the tasks
/// woken by the settled lookups can apply their artwork.
///
/// Panics if lookups are still running after [`SETTLE_TIMEOUT`], e.g. when a
/// test forgot to open the [`MockLookup`] gate.
#[allow(dead_code)]
pub async fn settle(cache: &ArtworkCache) {
    tokio::time::timeout(SETTLE_TIMEOUT, async {
        while cache.stats().in_flight > 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("artwork lookups still in flight");
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
