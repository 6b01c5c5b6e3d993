// Rule-based recommendations used whenever the model is unavailable or unusable.

use crate::domain::listing::TargetListing;
use crate::domain::recommendation::{
    DescriptionRecommendation, FeatureRecommendations, FeatureSuggestion, PricingRecommendation,
    RecommendationSource,
};
use crate::domain::stats::{round_to, MarketStats};

/// Price adjustment per 0.1 of rating above/below the market average.
const RATING_STEP_ADJUSTMENT: f64 = 0.05;
const MAX_RATING_ADJUSTMENT: f64 = 0.15;
const MAX_FEATURE_SUGGESTIONS: usize = 5;

pub fn fallback_pricing(target: &TargetListing, stats: &MarketStats) -> PricingRecommendation {
    let base = if stats.has_prices() {
        stats.price_avg
    } else {
        match target.price.filter(|p| p.is_finite() && *p > 0.0) {
            Some(p) => p,
            None => return insufficient_pricing_data(),
        }
    };

    let adjustment = match target.rating {
        Some(r) if stats.rating_avg > 0.0 => {
            // round to whole 0.1 steps so 4.79 vs 4.7 does not move the price
            let steps = ((r - stats.rating_avg) / 0.1).round();
            (steps * RATING_STEP_ADJUSTMENT).clamp(-MAX_RATING_ADJUSTMENT, MAX_RATING_ADJUSTMENT)
        }
        _ => 0.0,
    };

    let mut suggested = base * (1.0 + adjustment);
    if stats.has_prices() {
        suggested = suggested.clamp(stats.price_min, stats.price_max);
    }
    let suggested = round_to(suggested, 2);

    let (min_price, max_price) = if stats.has_prices() {
        (stats.price_min, stats.price_max)
    } else {
        (round_to(suggested * 0.9, 2), round_to(suggested * 1.1, 2))
    };

    let reasoning = if stats.has_prices() {
        format!(
            "Based on {} nearby competitors averaging ${:.2}/night with an average rating of {:.2}; adjusted {:+.0}% for this listing's rating.",
            stats.priced_count,
            stats.price_avg,
            stats.rating_avg,
            adjustment * 100.0
        )
    } else {
        "No priced competitors were found nearby; keeping the current price.".to_string()
    };

    PricingRecommendation {
        suggested_price: Some(suggested),
        min_price: Some(min_price),
        max_price: Some(max_price),
        reasoning,
        confidence: "low".to_string(),
        source: RecommendationSource::Fallback,
    }
}

// Neither the market nor the listing itself has a price.
fn insufficient_pricing_data() -> PricingRecommendation {
    PricingRecommendation {
        suggested_price: None,
        min_price: None,
        max_price: None,
        reasoning: "Insufficient data: no nearby competitor prices and no current price for this listing."
            .to_string(),
        confidence: "none".to_string(),
        source: RecommendationSource::Fallback,
    }
}

pub fn fallback_features(stats: &MarketStats) -> FeatureRecommendations {
    let suggestions = stats
        .missing_amenities
        .iter()
        .take(MAX_FEATURE_SUGGESTIONS)
        .map(|name| {
            let percent = stats.amenity_share(name).map(|a| a.percent).unwrap_or(0.0);
            FeatureSuggestion {
                feature: name.clone(),
                reason: format!("Offered by {percent}% of nearby competitors"),
            }
        })
        .collect();

    FeatureRecommendations {
        suggestions,
        source: RecommendationSource::Fallback,
    }
}

pub fn fallback_description(target: &TargetListing) -> DescriptionRecommendation {
    let kind = target.property_type.as_deref().unwrap_or("Stay");
    let place = target.city.as_deref().unwrap_or("the area");
    let highlights: Vec<&str> = target.amenities.iter().take(3).map(String::as_str).collect();

    let title = format!("{kind} in {place}");
    let description = if highlights.is_empty() {
        format!("{} is a comfortable {} in {}.", target.name, kind.to_lowercase(), place)
    } else {
        format!(
            "{} is a comfortable {} in {} featuring {}.",
            target.name,
            kind.to_lowercase(),
            place,
            highlights.join(", ")
        )
    };

    DescriptionRecommendation {
        title,
        description,
        source: RecommendationSource::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stats::compute_market_stats;
    use crate::tests::fixtures::{competitor, target};

    #[test]
    fn pricing_follows_market_and_rating() {
        let comps = vec![
            competitor("a", Some(100.0), Some(4.5), &[]),
            competitor("b", Some(200.0), Some(4.5), &[]),
        ];
        let mut t = target();
        t.rating = Some(4.7);
        let stats = compute_market_stats(&t, &comps);

        let rec = fallback_pricing(&t, &stats);
        // avg 150, +2 steps => +10%
        assert_eq!(rec.suggested_price, Some(165.0));
        assert_eq!((rec.min_price, rec.max_price), (Some(100.0), Some(200.0)));
        assert_eq!(rec.source, RecommendationSource::Fallback);
        assert_eq!(rec.confidence, "low");
    }

    #[test]
    fn pricing_adjustment_is_capped_and_clamped() {
        let comps = vec![
            competitor("a", Some(100.0), Some(3.0), &[]),
            competitor("b", Some(110.0), Some(3.0), &[]),
        ];
        let mut t = target();
        t.rating = Some(5.0);
        let stats = compute_market_stats(&t, &comps);
        // 105 * 1.15 = 120.75, clamped to max 110
        assert_eq!(fallback_pricing(&t, &stats).suggested_price, Some(110.0));
    }

    #[test]
    fn pricing_without_market_keeps_current_price() {
        let mut t = target();
        t.price = Some(80.0);
        let stats = compute_market_stats(&t, &[]);
        let rec = fallback_pricing(&t, &stats);
        assert_eq!(rec.suggested_price, Some(80.0));
        assert_eq!((rec.min_price, rec.max_price), (Some(72.0), Some(88.0)));
    }

    #[test]
    fn pricing_without_any_price_suggests_nothing() {
        let mut t = target();
        t.price = None;
        let comps = vec![competitor("a", None, Some(4.5), &["wifi"])];
        let rec = fallback_pricing(&t, &compute_market_stats(&t, &comps));

        assert_eq!(rec.suggested_price, None);
        assert_eq!((rec.min_price, rec.max_price), (None, None));
        assert_eq!(rec.confidence, "none");
        assert!(rec.reasoning.starts_with("Insufficient data"));
        assert_eq!(rec.source, RecommendationSource::Fallback);
    }

    #[test]
    fn features_come_from_missing_amenities() {
        let comps = vec![
            competitor("a", None, None, &["wifi", "pool"]),
            competitor("b", None, None, &["wifi"]),
        ];
        let t = target();
        let recs = fallback_features(&compute_market_stats(&t, &comps));
        let names: Vec<&str> = recs.suggestions.iter().map(|s| s.feature.as_str()).collect();
        assert_eq!(names, vec!["wifi", "pool"]);
        assert_eq!(recs.suggestions[0].reason, "Offered by 100% of nearby competitors");
    }

    #[test]
    fn description_mentions_city_and_amenities() {
        let d = fallback_description(&target());
        assert_eq!(d.title, "Apartment in Austin");
        assert!(d.description.contains("kitchen"));
    }
}
