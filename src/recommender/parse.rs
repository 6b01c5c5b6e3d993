use crate::recommender::AiError;
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PricingReply {
    pub suggested_price: f64,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub confidence: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeatureReply {
    pub suggestions: Vec<FeatureItem>,
}

#[derive(Debug, Deserialize)]
pub struct FeatureItem {
    pub feature: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct DescriptionReply {
    pub title: String,
    pub description: String,
}

/// Pulls the JSON object out of a completion that may be fenced or wrapped in prose.
pub fn extract_json_object(completion: &str) -> Option<&str> {
    let trimmed = completion.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.trim_end().trim_end_matches("```"))
        .unwrap_or(trimmed);

    let start = body.find('{')?;
    let end = body.rfind('}')?;
    (start < end).then(|| &body[start..=end])
}

pub fn parse_completion<T: DeserializeOwned>(completion: &str) -> Result<T, AiError> {
    let json = extract_json_object(completion)
        .ok_or_else(|| AiError::Parse("no JSON object in completion".into()))?;
    serde_json::from_str(json).map_err(|e| AiError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_json_parses() {
        let reply: PricingReply = parse_completion(
            r#"{"suggested_price": 150, "min_price": 130, "max_price": 170, "reasoning": "ok", "confidence": "high"}"#,
        )
        .unwrap();
        assert_eq!(reply.suggested_price, 150.0);
        assert_eq!(reply.max_price, Some(170.0));
        assert_eq!(reply.confidence.as_deref(), Some("high"));
    }

    #[test]
    fn fenced_json_parses() {
        let completion = "```json\n{\"title\": \"Sunny Loft\", \"description\": \"Bright.\"}\n```";
        let reply: DescriptionReply = parse_completion(completion).unwrap();
        assert_eq!(reply.title, "Sunny Loft");
    }

    #[test]
    fn json_inside_prose_parses() {
        let completion = "Sure! Here you go: {\"suggestions\": [{\"feature\": \"hot tub\"}]} Hope it helps.";
        let reply: FeatureReply = parse_completion(completion).unwrap();
        assert_eq!(reply.suggestions.len(), 1);
        assert_eq!(reply.suggestions[0].reason, "");
    }

    #[test]
    fn prose_only_is_rejected() {
        let err = parse_completion::<PricingReply>("I think around $150 a night.").unwrap_err();
        assert!(matches!(err, AiError::Parse(_)));
    }

    #[test]
    fn wrong_shape_is_rejected() {
        assert!(parse_completion::<PricingReply>(r#"{"price": "cheap"}"#).is_err());
    }
}
