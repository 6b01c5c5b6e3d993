// src/domain/snapshot.rs

use crate::domain::listing::{CompetitorRecord, TargetListing};
use crate::domain::recommendation::Recommendations;
use crate::domain::stats::MarketStats;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One listing's analysis at a point in time. This is the stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub listing_id: String,
    pub captured_at: DateTime<Utc>,
    pub target: TargetListing,
    pub competitors: Vec<CompetitorRecord>,
    pub stats: MarketStats,
    pub recommendations: Recommendations,
}

impl AnalysisSnapshot {
    pub fn competitor(&self, id: &str) -> Option<&CompetitorRecord> {
        self.competitors.iter().find(|c| c.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredSnapshot {
    pub id: i64,
    pub is_current: bool,
    #[serde(flatten)]
    pub snapshot: AnalysisSnapshot,
}

/// Lightweight row for history listings and the dashboard index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotSummary {
    pub id: i64,
    pub listing_id: String,
    pub listing_name: String,
    pub captured_at: DateTime<Utc>,
    pub is_current: bool,
    pub competitor_count: i64,
    pub price_avg: f64,
    pub rating_avg: f64,
    pub target_price: Option<f64>,
    pub suggested_price: Option<f64>,
}

/// Dashboard row: a listing's current snapshot summary and its unread alert count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedListing {
    #[serde(flatten)]
    pub summary: SnapshotSummary,
    pub unread_alerts: i64,
}
