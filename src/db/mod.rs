pub mod alerts;
pub mod connection;
pub mod history;
pub mod snapshots;

pub use connection::Database;
