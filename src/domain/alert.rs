// src/domain/alert.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    PriceChange,
    NewCompetitor,
    AmenityChange,
    RatingChange,
    MarketTrend,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::PriceChange => "price_change",
            AlertType::NewCompetitor => "new_competitor",
            AlertType::AmenityChange => "amenity_change",
            AlertType::RatingChange => "rating_change",
            AlertType::MarketTrend => "market_trend",
        }
    }
}

impl FromStr for AlertType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price_change" => Ok(AlertType::PriceChange),
            "new_competitor" => Ok(AlertType::NewCompetitor),
            "amenity_change" => Ok(AlertType::AmenityChange),
            "rating_change" => Ok(AlertType::RatingChange),
            "market_trend" => Ok(AlertType::MarketTrend),
            other => Err(format!("unknown alert type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Opportunity,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Opportunity => "opportunity",
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "opportunity" => Ok(Severity::Opportunity),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// An alert produced by the diff engine, not yet stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAlert {
    pub listing_id: String,
    pub competitor_id: Option<String>,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub previous_value: Option<String>,
    pub current_value: Option<String>,
    /// Signed percentage change, where one makes sense.
    pub change_percent: Option<f64>,
}

/// A stored alert. Only `is_read` ever changes after insert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub id: i64,
    pub listing_id: String,
    pub competitor_id: Option<String>,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub previous_value: Option<String>,
    pub current_value: Option<String>,
    pub change_percent: Option<f64>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
