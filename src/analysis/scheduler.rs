use crate::analysis::pipeline::{analyze_listing, AppState};
use crate::db::snapshots::tracked_listing_ids;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::thread::JoinHandle;
use std::time::Duration;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
    pub refreshed: usize,
    pub failed: usize,
}

/// Next occurrence of `hour`:00 UTC strictly after `now`.
pub fn next_run_after(now: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    let today = now
        .date_naive()
        .and_hms_opt(hour.min(23), 0, 0)
        .map(|t| t.and_utc());

    match today {
        Some(t) if t > now => t,
        Some(t) => t + ChronoDuration::days(1),
        None => now + ChronoDuration::days(1),
    }
}

/// Refreshes every tracked listing, one at a time. Failures are logged and skipped.
pub fn run_scheduled_refresh(state: &AppState) -> RefreshSummary {
    let ids = match state.db.with_conn(|conn| tracked_listing_ids(conn)) {
        Ok(ids) => ids,
        Err(e) => {
            tracing::error!("scheduled refresh could not list tracked listings: {e}");
            return RefreshSummary::default();
        }
    };

    tracing::info!(listings = ids.len(), "scheduled refresh started");
    let mut summary = RefreshSummary::default();

    for (i, listing_id) in ids.iter().enumerate() {
        if i > 0 {
            std::thread::sleep(state.analysis.listing_delay);
        }
        match analyze_listing(state, listing_id) {
            Ok(outcome) => {
                summary.refreshed += 1;
                tracing::debug!(listing_id, alerts = outcome.alerts.len(), "listing refreshed");
            }
            Err(e) => {
                summary.failed += 1;
                tracing::warn!(listing_id, "scheduled refresh failed: {e}");
            }
        }
    }

    tracing::info!(
        refreshed = summary.refreshed,
        failed = summary.failed,
        "scheduled refresh finished"
    );
    summary
}

/// Background thread that wakes once a day at the configured UTC hour.
pub fn spawn_scheduler(state: AppState) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("scheduler".into())
        .spawn(move || loop {
            let now = Utc::now();
            let next = next_run_after(now, state.analysis.schedule_hour_utc);
            tracing::info!(next_run = %next, "scheduler sleeping");

            std::thread::sleep((next - now).to_std().unwrap_or(Duration::ZERO));
            run_scheduled_refresh(&state);
        })
}
