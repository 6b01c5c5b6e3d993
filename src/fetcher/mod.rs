mod fetcher;
mod fetcher_error;
pub mod normalize;
mod provider;

pub use fetcher::{CompetitorFetcher, FetchSettings, MarketFetch};
pub use fetcher_error::FetchError;
pub use provider::{ListingProvider, RapidApiProvider, UnconfiguredProvider};
