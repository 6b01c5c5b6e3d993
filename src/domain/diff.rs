// src/domain/diff.rs

use crate::domain::alert::{AlertType, NewAlert, Severity};
use crate::domain::listing::CompetitorRecord;
use crate::domain::snapshot::AnalysisSnapshot;
use crate::domain::stats::round_to;

/// Absolute nightly price move (dollars) that triggers a price-change alert.
pub const PRICE_CHANGE_THRESHOLD: f64 = 10.0;
pub const PRICE_HIGH_PERCENT: f64 = 20.0;
pub const PRICE_MEDIUM_PERCENT: f64 = 10.0;

pub const RATING_CHANGE_THRESHOLD: f64 = 0.2;
pub const RATING_HIGH_DELTA: f64 = 0.5;

/// Market average moves must be strictly larger than this to alert.
pub const MARKET_TREND_THRESHOLD: f64 = 15.0;
pub const MARKET_TREND_HIGH_THRESHOLD: f64 = 30.0;

// Absorbs float noise such as 4.8 - 4.6 = 0.1999..
const EPSILON: f64 = 1e-9;

/// Compares the newest snapshot with the previous one for the same listing and
/// returns the alerts to record. The first snapshot of a listing yields nothing.
pub fn diff_snapshots(previous: Option<&AnalysisSnapshot>, current: &AnalysisSnapshot) -> Vec<NewAlert> {
    let Some(previous) = previous else {
        return Vec::new();
    };

    let mut alerts = Vec::new();

    for comp in &current.competitors {
        match previous.competitor(&comp.id) {
            Some(before) => {
                alerts.extend(price_alert(&current.listing_id, before, comp));
                alerts.extend(rating_alert(&current.listing_id, before, comp));
                alerts.extend(amenity_alert(&current.listing_id, before, comp));
            }
            None => alerts.push(new_competitor_alert(&current.listing_id, comp)),
        }
    }

    alerts.extend(market_trend_alert(previous, current));
    alerts
}

/// Signed, unrounded percentage change from `old` to `new`; `None` when `old` is zero.
pub fn percent_change(old: f64, new: f64) -> Option<f64> {
    if old == 0.0 {
        None
    } else {
        Some((new - old) / old * 100.0)
    }
}

pub fn price_severity(percent: Option<f64>) -> Severity {
    match percent.map(f64::abs) {
        Some(p) if p + EPSILON >= PRICE_HIGH_PERCENT => Severity::High,
        Some(p) if p + EPSILON >= PRICE_MEDIUM_PERCENT => Severity::Medium,
        Some(_) => Severity::Low,
        None => Severity::Medium,
    }
}

/// Severity of a market-average move; only meaningful above the alert threshold.
pub fn market_trend_severity(previous_avg: f64, current_avg: f64) -> Severity {
    let delta = current_avg - previous_avg;
    if delta.abs() > MARKET_TREND_HIGH_THRESHOLD {
        Severity::High
    } else if delta > 0.0 {
        Severity::Opportunity
    } else {
        Severity::Medium
    }
}

fn price_alert(listing_id: &str, before: &CompetitorRecord, after: &CompetitorRecord) -> Option<NewAlert> {
    let (old, new) = (before.price?, after.price?);
    let delta = new - old;
    if delta.abs() + EPSILON < PRICE_CHANGE_THRESHOLD {
        return None;
    }

    let percent = percent_change(old, new);
    let direction = if delta > 0.0 { "raised" } else { "lowered" };
    let percent_text = percent
        .map(|p| format!(" ({p:+.1}%)"))
        .unwrap_or_default();

    Some(NewAlert {
        listing_id: listing_id.to_string(),
        competitor_id: Some(after.id.clone()),
        alert_type: AlertType::PriceChange,
        severity: price_severity(percent),
        title: format!("{} {} their price", after.name, direction),
        message: format!(
            "{} {} the nightly price from ${:.2} to ${:.2}{}",
            after.name, direction, old, new, percent_text
        ),
        previous_value: Some(format!("{old:.2}")),
        current_value: Some(format!("{new:.2}")),
        change_percent: percent.map(|p| round_to(p, 2)),
    })
}

fn rating_alert(listing_id: &str, before: &CompetitorRecord, after: &CompetitorRecord) -> Option<NewAlert> {
    let (old, new) = (before.rating?, after.rating?);
    let delta = new - old;
    if delta.abs() + EPSILON < RATING_CHANGE_THRESHOLD {
        return None;
    }

    let severity = if delta.abs() + EPSILON >= RATING_HIGH_DELTA {
        Severity::High
    } else {
        Severity::Low
    };
    let direction = if delta > 0.0 { "improved" } else { "dropped" };

    Some(NewAlert {
        listing_id: listing_id.to_string(),
        competitor_id: Some(after.id.clone()),
        alert_type: AlertType::RatingChange,
        severity,
        title: format!("{} rating {}", after.name, direction),
        message: format!("{} rating went from {:.2} to {:.2}", after.name, old, new),
        previous_value: Some(format!("{old:.2}")),
        current_value: Some(format!("{new:.2}")),
        change_percent: percent_change(old, new).map(|p| round_to(p, 2)),
    })
}

fn amenity_alert(listing_id: &str, before: &CompetitorRecord, after: &CompetitorRecord) -> Option<NewAlert> {
    let added: Vec<&str> = after
        .amenities
        .difference(&before.amenities)
        .map(String::as_str)
        .collect();
    if added.is_empty() {
        return None;
    }

    Some(NewAlert {
        listing_id: listing_id.to_string(),
        competitor_id: Some(after.id.clone()),
        alert_type: AlertType::AmenityChange,
        severity: Severity::Medium,
        title: format!("{} added amenities", after.name),
        message: format!("{} now offers: {}", after.name, added.join(", ")),
        previous_value: Some(join_set(before.amenities.iter())),
        current_value: Some(join_set(after.amenities.iter())),
        change_percent: None,
    })
}

fn new_competitor_alert(listing_id: &str, comp: &CompetitorRecord) -> NewAlert {
    let distance = comp
        .distance_km
        .map(|d| format!(" {d:.1} km away"))
        .unwrap_or_default();

    NewAlert {
        listing_id: listing_id.to_string(),
        competitor_id: Some(comp.id.clone()),
        alert_type: AlertType::NewCompetitor,
        severity: Severity::Medium,
        title: format!("New competitor: {}", comp.name),
        message: format!(
            "{} appeared{} at {}",
            comp.name,
            distance,
            comp.display_price()
        ),
        previous_value: None,
        current_value: comp.price.map(|p| format!("{p:.2}")),
        change_percent: None,
    }
}

fn market_trend_alert(previous: &AnalysisSnapshot, current: &AnalysisSnapshot) -> Option<NewAlert> {
    if !previous.stats.has_prices() || !current.stats.has_prices() {
        return None;
    }

    let (old, new) = (previous.stats.price_avg, current.stats.price_avg);
    let delta = new - old;
    if delta.abs() <= MARKET_TREND_THRESHOLD {
        return None;
    }

    let direction = if delta > 0.0 { "up" } else { "down" };

    Some(NewAlert {
        listing_id: current.listing_id.clone(),
        competitor_id: None,
        alert_type: AlertType::MarketTrend,
        severity: market_trend_severity(old, new),
        title: format!("Market prices trending {direction}"),
        message: format!(
            "Average competitor price moved from ${old:.2} to ${new:.2} ({delta:+.2})"
        ),
        previous_value: Some(format!("{old:.2}")),
        current_value: Some(format!("{new:.2}")),
        change_percent: percent_change(old, new).map(|p| round_to(p, 2)),
    })
}

fn join_set<'a>(items: impl Iterator<Item = &'a String>) -> String {
    items.map(String::as_str).collect::<Vec<_>>().join(", ")
}
