mod controller;

pub use controller::{status_line, RenderedRow, ResultsView, SearchController, SearchOutcome};
