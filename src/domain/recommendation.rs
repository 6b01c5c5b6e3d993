// src/domain/recommendation.rs

use serde::{Deserialize, Serialize};

/// Where a recommendation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Ai,
    Fallback,
}

impl RecommendationSource {
    pub fn label(&self) -> &'static str {
        match self {
            RecommendationSource::Ai => "AI",
            RecommendationSource::Fallback => "Rule-based",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRecommendation {
    /// `None` when there is no price to anchor a suggestion on.
    pub suggested_price: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub reasoning: String,
    /// "none" | "low" | "medium" | "high"
    pub confidence: String,
    pub source: RecommendationSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSuggestion {
    pub feature: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecommendations {
    pub suggestions: Vec<FeatureSuggestion>,
    pub source: RecommendationSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptionRecommendation {
    pub title: String,
    pub description: String,
    pub source: RecommendationSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub pricing: PricingRecommendation,
    pub features: FeatureRecommendations,
    pub description: DescriptionRecommendation,
}
