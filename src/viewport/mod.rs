mod region;
mod scheduler;

pub use region::ObservationRegion;
pub use scheduler::{PlaceholderHandle, PlaceholderSink, VisibilityScheduler};
