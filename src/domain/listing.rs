// src/domain/listing.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

/// The listing being analyzed, flattened out of whatever shape the provider returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetListing {
    pub id: String,
    pub name: String,
    /// Nightly price in dollars.
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub review_count: i64,
    pub amenities: BTreeSet<String>,
    pub location: Coordinate,
    pub property_type: Option<String>,
    pub bedrooms: Option<i64>,
    pub city: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

/// A nearby listing competing with the target. Compared field-by-field across snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorRecord {
    pub id: String,
    pub name: String,
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub review_count: i64,
    pub amenities: BTreeSet<String>,
    pub location: Option<Coordinate>,
    /// Distance from the target, filled in once the target is known.
    pub distance_km: Option<f64>,
    pub property_type: Option<String>,
    pub bedrooms: Option<i64>,
    pub url: Option<String>,
}

impl CompetitorRecord {
    pub fn display_price(&self) -> String {
        match self.price {
            Some(p) => format!("${p:.2}"),
            None => "n/a".to_string(),
        }
    }
}
