mod pipeline;
mod scheduler;

pub use pipeline::{analyze_listing, refresh_listing, AppState};
pub use scheduler::spawn_scheduler;
