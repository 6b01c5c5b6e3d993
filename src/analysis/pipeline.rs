use crate::config::AnalysisConfig;
use crate::db::snapshots::{get_current_snapshot, record_analysis};
use crate::db::Database;
use crate::domain::alert::Alert;
use crate::domain::snapshot::{AnalysisSnapshot, StoredSnapshot};
use crate::domain::stats::compute_market_stats;
use crate::errors::ServerError;
use crate::fetcher::{CompetitorFetcher, FetchSettings, ListingProvider, MarketFetch};
use crate::recommender::{Recommender, TextGenerator};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Everything a request handler or the scheduler needs to run an analysis.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub provider: Arc<dyn ListingProvider>,
    /// `None` when no model key is configured; recommendations then use fallbacks.
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub fetch: FetchSettings,
    pub analysis: AnalysisConfig,
}

impl AppState {
    pub fn new(
        db: Database,
        provider: Arc<dyn ListingProvider>,
        generator: Option<Arc<dyn TextGenerator>>,
        analysis: AnalysisConfig,
    ) -> Self {
        Self {
            db,
            provider,
            generator,
            fetch: FetchSettings::from(&analysis),
            analysis,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalysisOutcome {
    pub snapshot: StoredSnapshot,
    pub alerts: Vec<Alert>,
}

/// Fetch, aggregate, recommend, diff against the current snapshot and store.
pub fn analyze_listing(state: &AppState, listing_id: &str) -> Result<AnalysisOutcome, ServerError> {
    let listing_id = listing_id.trim();
    if listing_id.is_empty() {
        return Err(ServerError::BadRequest("listing_id is required".into()));
    }

    let started = Instant::now();
    tracing::info!(listing_id, "analysis started");

    let fetcher = CompetitorFetcher::new(state.provider.as_ref(), state.fetch.clone());
    let MarketFetch { target, competitors } = fetcher.fetch_market(listing_id)?;

    let stats = compute_market_stats(&target, &competitors);
    let recommendations = Recommender::new(state.generator.as_deref()).recommend(&target, &stats);

    let snapshot = AnalysisSnapshot {
        listing_id: listing_id.to_string(),
        captured_at: Utc::now(),
        target,
        competitors,
        stats,
        recommendations,
    };

    let (stored, alerts) = record_analysis(&state.db, &snapshot)?;

    tracing::info!(
        listing_id,
        snapshot_id = stored.id,
        competitors = stored.snapshot.competitors.len(),
        alerts = alerts.len(),
        elapsed = ?started.elapsed(),
        "analysis stored"
    );

    Ok(AnalysisOutcome {
        snapshot: stored,
        alerts,
    })
}

/// Re-runs the analysis for a listing that already has a current snapshot.
pub fn refresh_listing(state: &AppState, listing_id: &str) -> Result<AnalysisOutcome, ServerError> {
    let tracked = state
        .db
        .with_conn(|conn| get_current_snapshot(conn, listing_id))?
        .is_some();
    if !tracked {
        return Err(ServerError::NotFound);
    }
    analyze_listing(state, listing_id)
}
