mod load;
mod song;
mod store;

pub use load::{load_songs, CatalogueError, CatalogueSource};
pub use song::Song;
pub use store::CatalogStore;
