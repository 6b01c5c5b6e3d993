use crate::analysis::{spawn_scheduler, AppState};
use crate::config::Config;
use crate::db::connection::{init_db, Database};
use crate::fetcher::{ListingProvider, RapidApiProvider, UnconfiguredProvider};
use crate::recommender::{GeminiClient, TextGenerator};
use crate::router::handle;
use astra::Server;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod analysis;
mod config;
mod db;
mod domain;
mod errors;
mod fetcher;
mod recommender;
mod responses;
mod router;
mod spreadsheets;
mod templates;

#[cfg(test)]
mod tests;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,listing_radar=debug")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let db = Database::new(config.database_path.clone());
    if let Err(e) = init_db(&db) {
        tracing::error!("Database initialization failed: {e}");
        std::process::exit(1);
    }

    let provider: Arc<dyn ListingProvider> = match RapidApiProvider::new(&config.provider) {
        Ok(p) => Arc::new(p),
        Err(e) => {
            tracing::warn!("Listing provider disabled: {e}");
            Arc::new(UnconfiguredProvider::new(e.to_string()))
        }
    };

    let generator: Option<Arc<dyn TextGenerator>> = match GeminiClient::new(&config.gemini) {
        Ok(client) => {
            tracing::info!(model = client.model(), "AI recommendations enabled");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!("AI recommendations disabled, using rule-based fallbacks: {e}");
            None
        }
    };

    let state = AppState::new(db, provider, generator, config.analysis.clone());

    if config.analysis.scheduler_enabled {
        if let Err(e) = spawn_scheduler(state.clone()) {
            tracing::error!("Could not start scheduler: {e}");
        }
    }

    tracing::info!(addr = %config.bind_addr, workers = config.max_workers, "Starting server");

    let server = Server::bind(&config.bind_addr).max_workers(config.max_workers);
    let result = server.serve(move |req, _info| handle(req, &state));

    if let Err(e) = result {
        tracing::error!("Server ended with error: {e}");
    }

    tracing::info!("Server shut down cleanly.");
}
