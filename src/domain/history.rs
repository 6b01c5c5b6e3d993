use crate::domain::snapshot::AnalysisSnapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A point-in-time price/rating observation for one competitor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitorHistoryEntry {
    pub listing_id: String,
    pub competitor_id: String,
    pub competitor_name: String,
    pub recorded_at: DateTime<Utc>,
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub review_count: i64,
}

/// One entry per competitor in the snapshot, stamped with the capture time.
pub fn history_entries(snapshot: &AnalysisSnapshot) -> Vec<CompetitorHistoryEntry> {
    snapshot
        .competitors
        .iter()
        .map(|c| CompetitorHistoryEntry {
            listing_id: snapshot.listing_id.clone(),
            competitor_id: c.id.clone(),
            competitor_name: c.name.clone(),
            recorded_at: snapshot.captured_at,
            price: c.price,
            rating: c.rating,
            review_count: c.review_count,
        })
        .collect()
}
