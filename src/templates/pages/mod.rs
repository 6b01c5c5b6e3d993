pub mod home;
pub mod listing;

pub use home::home_page;
pub use listing::{listing_page, ListingPageVm};
