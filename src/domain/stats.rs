// src/domain/stats.rs

use crate::domain::listing::{CompetitorRecord, TargetListing};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Amenities offered by at least this share of competitors count as "expected".
pub const MISSING_AMENITY_SHARE: f64 = 50.0;
pub const TOP_KEYWORDS: usize = 10;

const STOP_WORDS: &[&str] = &[
    "and", "the", "with", "for", "near", "from", "in", "of", "to", "our", "your", "all", "min",
    "mins",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmenityShare {
    pub name: String,
    pub count: usize,
    /// Percentage of competitors offering the amenity, 1 decimal.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub word: String,
    pub count: usize,
}

/// Descriptive statistics over a competitor set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketStats {
    pub competitor_count: usize,
    /// Competitors that reported a usable price.
    pub priced_count: usize,
    pub price_min: f64,
    pub price_max: f64,
    pub price_avg: f64,
    pub rating_avg: f64,
    pub review_avg: f64,
    pub amenity_frequency: Vec<AmenityShare>,
    /// Share of priced competitors strictly cheaper than the target.
    pub target_price_percentile: Option<f64>,
    pub missing_amenities: Vec<String>,
    pub top_keywords: Vec<KeywordCount>,
}

impl MarketStats {
    pub fn has_prices(&self) -> bool {
        self.priced_count > 0
    }

    pub fn amenity_share(&self, name: &str) -> Option<&AmenityShare> {
        self.amenity_frequency.iter().find(|a| a.name == name)
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

pub fn compute_market_stats(target: &TargetListing, competitors: &[CompetitorRecord]) -> MarketStats {
    let prices: Vec<f64> = competitors
        .iter()
        .filter_map(|c| c.price)
        .filter(|p| *p > 0.0)
        .collect();
    let ratings: Vec<f64> = competitors.iter().filter_map(|c| c.rating).collect();
    let reviews: Vec<f64> = competitors.iter().map(|c| c.review_count as f64).collect();

    let price_min = prices.iter().cloned().fold(None, |acc: Option<f64>, p| {
        Some(acc.map_or(p, |m| m.min(p)))
    });
    let price_max = prices.iter().cloned().fold(None, |acc: Option<f64>, p| {
        Some(acc.map_or(p, |m| m.max(p)))
    });

    let amenity_frequency = amenity_frequency(competitors);

    let missing_amenities = amenity_frequency
        .iter()
        .filter(|a| a.percent >= MISSING_AMENITY_SHARE && !target.amenities.contains(&a.name))
        .map(|a| a.name.clone())
        .collect();

    let target_price_percentile = match target.price {
        Some(tp) if !prices.is_empty() => {
            let cheaper = prices.iter().filter(|p| **p < tp).count();
            Some(round_to(cheaper as f64 / prices.len() as f64 * 100.0, 1))
        }
        _ => None,
    };

    MarketStats {
        competitor_count: competitors.len(),
        priced_count: prices.len(),
        price_min: round_to(price_min.unwrap_or(0.0), 2),
        price_max: round_to(price_max.unwrap_or(0.0), 2),
        price_avg: round_to(mean(&prices), 2),
        rating_avg: round_to(mean(&ratings), 2),
        review_avg: round_to(mean(&reviews), 2),
        amenity_frequency,
        target_price_percentile,
        missing_amenities,
        top_keywords: keyword_frequency(competitors.iter().map(|c| c.name.as_str()), TOP_KEYWORDS),
    }
}

/// Count and share of competitors offering each amenity, most common first.
pub fn amenity_frequency(competitors: &[CompetitorRecord]) -> Vec<AmenityShare> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for c in competitors {
        for a in &c.amenities {
            *counts.entry(a.as_str()).or_default() += 1;
        }
    }

    let total = competitors.len();
    let mut shares: Vec<AmenityShare> = counts
        .into_iter()
        .map(|(name, count)| AmenityShare {
            name: name.to_string(),
            count,
            percent: round_to(count as f64 / total as f64 * 100.0, 1),
        })
        .collect();

    shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    shares
}

/// Most frequent title words, ignoring short words and stop words.
pub fn keyword_frequency<'a>(titles: impl Iterator<Item = &'a str>, limit: usize) -> Vec<KeywordCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for title in titles {
        for word in title
            .to_lowercase()
            .split(|ch: char| !ch.is_alphanumeric())
            .filter(|w| w.chars().count() >= 3 && !STOP_WORDS.contains(w))
        {
            *counts.entry(word.to_string()).or_default() += 1;
        }
    }

    let mut words: Vec<KeywordCount> = counts
        .into_iter()
        .map(|(word, count)| KeywordCount { word, count })
        .collect();
    words.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    words.truncate(limit);
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::listing::Coordinate;
    use std::collections::BTreeSet;

    fn amenities(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn comp(id: &str, name: &str, price: Option<f64>, rating: Option<f64>, reviews: i64, am: &[&str]) -> CompetitorRecord {
        CompetitorRecord {
            id: id.to_string(),
            name: name.to_string(),
            price,
            rating,
            review_count: reviews,
            amenities: amenities(am),
            location: None,
            distance_km: None,
            property_type: None,
            bedrooms: None,
            url: None,
        }
    }

    fn target(price: Option<f64>, am: &[&str]) -> TargetListing {
        TargetListing {
            id: "t1".to_string(),
            name: "Target".to_string(),
            price,
            rating: Some(4.7),
            review_count: 10,
            amenities: amenities(am),
            location: Coordinate { lat: 0.0, lng: 0.0 },
            property_type: None,
            bedrooms: None,
            city: None,
            description: None,
            url: None,
        }
    }

    #[test]
    fn stats_match_hand_computed_values() {
        let comps = vec![
            comp("a", "Cozy Loft Downtown", Some(100.0), Some(4.5), 10, &["wifi", "kitchen"]),
            comp("b", "Downtown Studio with Pool", Some(150.0), Some(4.9), 30, &["wifi", "pool"]),
            comp("c", "Cozy Cabin", Some(200.0), None, 20, &["wifi"]),
            comp("d", "Unpriced Room", None, Some(4.0), 0, &[]),
        ];
        let stats = compute_market_stats(&target(Some(160.0), &["kitchen"]), &comps);

        assert_eq!(stats.competitor_count, 4);
        assert_eq!(stats.priced_count, 3);
        assert_eq!(stats.price_min, 100.0);
        assert_eq!(stats.price_max, 200.0);
        assert_eq!(stats.price_avg, 150.0);
        // (4.5 + 4.9 + 4.0) / 3 = 4.4666..
        assert_eq!(stats.rating_avg, 4.47);
        assert_eq!(stats.review_avg, 15.0);

        assert_eq!(
            stats.amenity_frequency,
            vec![
                AmenityShare { name: "wifi".into(), count: 3, percent: 75.0 },
                AmenityShare { name: "kitchen".into(), count: 1, percent: 25.0 },
                AmenityShare { name: "pool".into(), count: 1, percent: 25.0 },
            ]
        );
        assert_eq!(stats.missing_amenities, vec!["wifi".to_string()]);
        // 100 and 150 are cheaper than 160
        assert_eq!(stats.target_price_percentile, Some(66.7));

        assert_eq!(stats.top_keywords[0], KeywordCount { word: "cozy".into(), count: 2 });
        assert_eq!(stats.top_keywords[1], KeywordCount { word: "downtown".into(), count: 2 });
        assert!(stats.top_keywords.iter().all(|k| k.word != "with"));
    }

    #[test]
    fn stats_are_reproducible() {
        let comps = vec![
            comp("a", "Sunny Flat", Some(80.0), Some(4.2), 3, &["wifi", "parking"]),
            comp("b", "Quiet Flat", Some(95.5), Some(4.6), 8, &["parking"]),
        ];
        let t = target(None, &[]);
        assert_eq!(compute_market_stats(&t, &comps), compute_market_stats(&t, &comps));
    }

    #[test]
    fn empty_competitor_set_is_zeroed() {
        let stats = compute_market_stats(&target(Some(120.0), &[]), &[]);
        assert_eq!(stats.competitor_count, 0);
        assert_eq!(stats.price_avg, 0.0);
        assert_eq!(stats.rating_avg, 0.0);
        assert!(stats.amenity_frequency.is_empty());
        assert_eq!(stats.target_price_percentile, None);
        assert!(!stats.has_prices());
    }

    #[test]
    fn keyword_limit_is_respected() {
        let titles = ["alpha beta gamma delta", "epsilon zeta eta theta", "iota kappa lambda"];
        let words = keyword_frequency(titles.iter().copied(), 3);
        assert_eq!(words.len(), 3);
        // all counts equal, so alphabetical
        assert_eq!(words[0].word, "alpha");
    }
}
