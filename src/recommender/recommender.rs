use crate::domain::listing::TargetListing;
use crate::domain::recommendation::{
    DescriptionRecommendation, FeatureRecommendations, FeatureSuggestion, PricingRecommendation,
    RecommendationSource, Recommendations,
};
use crate::domain::stats::{round_to, MarketStats};
use crate::recommender::fallback::{fallback_description, fallback_features, fallback_pricing};
use crate::recommender::parse::{parse_completion, DescriptionReply, FeatureReply, PricingReply};
use crate::recommender::prompts::{description_prompt, features_prompt, pricing_prompt};
use crate::recommender::{AiError, TextGenerator};

const CONFIDENCE_LEVELS: &[&str] = &["low", "medium", "high"];

pub struct Recommender<'a> {
    generator: Option<&'a dyn TextGenerator>,
}

impl<'a> Recommender<'a> {
    pub fn new(generator: Option<&'a dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Pricing, feature and description suggestions. The three prompts go out
    /// concurrently; each part falls back to the rule-based value on any failure.
    pub fn recommend(&self, target: &TargetListing, stats: &MarketStats) -> Recommendations {
        let Some(generator) = self.generator else {
            tracing::debug!("no text generator configured, using rule-based recommendations");
            return Recommendations {
                pricing: fallback_pricing(target, stats),
                features: fallback_features(stats),
                description: fallback_description(target),
            };
        };

        let (pricing, features, description) = std::thread::scope(|s| {
            let pricing = s.spawn(|| ai_pricing(generator, target, stats));
            let features = s.spawn(|| ai_features(generator, target, stats));
            let description = s.spawn(|| ai_description(generator, target, stats));
            (
                pricing.join().unwrap_or_else(|_| Err(AiError::Api("pricing call panicked".into()))),
                features.join().unwrap_or_else(|_| Err(AiError::Api("features call panicked".into()))),
                description.join().unwrap_or_else(|_| Err(AiError::Api("description call panicked".into()))),
            )
        });

        Recommendations {
            pricing: pricing.unwrap_or_else(|e| {
                tracing::warn!("AI pricing unavailable, using fallback: {e}");
                fallback_pricing(target, stats)
            }),
            features: features.unwrap_or_else(|e| {
                tracing::warn!("AI features unavailable, using fallback: {e}");
                fallback_features(stats)
            }),
            description: description.unwrap_or_else(|e| {
                tracing::warn!("AI description unavailable, using fallback: {e}");
                fallback_description(target)
            }),
        }
    }
}

fn ai_pricing(
    generator: &dyn TextGenerator,
    target: &TargetListing,
    stats: &MarketStats,
) -> Result<PricingRecommendation, AiError> {
    let reply: PricingReply = parse_completion(&generator.generate(&pricing_prompt(target, stats))?)?;

    if !reply.suggested_price.is_finite() || reply.suggested_price <= 0.0 {
        return Err(AiError::Parse(format!(
            "unusable suggested price {}",
            reply.suggested_price
        )));
    }

    let suggested = round_to(reply.suggested_price, 2);
    let min_price = reply.min_price.filter(|p| *p > 0.0 && *p <= suggested).unwrap_or(suggested);
    let max_price = reply.max_price.filter(|p| *p >= suggested).unwrap_or(suggested);
    let confidence = reply
        .confidence
        .map(|c| c.to_lowercase())
        .filter(|c| CONFIDENCE_LEVELS.contains(&c.as_str()))
        .unwrap_or_else(|| "medium".to_string());

    Ok(PricingRecommendation {
        suggested_price: Some(suggested),
        min_price: Some(round_to(min_price, 2)),
        max_price: Some(round_to(max_price, 2)),
        reasoning: reply.reasoning,
        confidence,
        source: RecommendationSource::Ai,
    })
}

fn ai_features(
    generator: &dyn TextGenerator,
    target: &TargetListing,
    stats: &MarketStats,
) -> Result<FeatureRecommendations, AiError> {
    let reply: FeatureReply = parse_completion(&generator.generate(&features_prompt(target, stats))?)?;

    let suggestions: Vec<FeatureSuggestion> = reply
        .suggestions
        .into_iter()
        .filter(|s| !s.feature.trim().is_empty())
        .take(5)
        .map(|s| FeatureSuggestion {
            feature: s.feature.trim().to_string(),
            reason: s.reason,
        })
        .collect();

    if suggestions.is_empty() {
        return Err(AiError::Parse("no feature suggestions".into()));
    }

    Ok(FeatureRecommendations {
        suggestions,
        source: RecommendationSource::Ai,
    })
}

fn ai_description(
    generator: &dyn TextGenerator,
    target: &TargetListing,
    stats: &MarketStats,
) -> Result<DescriptionRecommendation, AiError> {
    let reply: DescriptionReply =
        parse_completion(&generator.generate(&description_prompt(target, stats))?)?;

    if reply.title.trim().is_empty() || reply.description.trim().is_empty() {
        return Err(AiError::Parse("empty title or description".into()));
    }

    Ok(DescriptionRecommendation {
        title: reply.title.trim().to_string(),
        description: reply.description.trim().to_string(),
        source: RecommendationSource::Ai,
    })
}
