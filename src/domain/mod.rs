pub mod alert;
pub mod diff;
pub mod geo;
pub mod history;
pub mod listing;
pub mod recommendation;
pub mod snapshot;
pub mod stats;
