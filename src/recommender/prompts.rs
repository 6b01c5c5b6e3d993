use crate::domain::listing::TargetListing;
use crate::domain::stats::MarketStats;
use std::fmt::Write;

fn listing_block(target: &TargetListing) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Name: {}", target.name);
    if let Some(t) = &target.property_type {
        let _ = writeln!(out, "Type: {t}");
    }
    if let Some(city) = &target.city {
        let _ = writeln!(out, "City: {city}");
    }
    if let Some(b) = target.bedrooms {
        let _ = writeln!(out, "Bedrooms: {b}");
    }
    match target.price {
        Some(p) => {
            let _ = writeln!(out, "Current nightly price: ${p:.2}");
        }
        None => {
            let _ = writeln!(out, "Current nightly price: unknown");
        }
    }
    if let Some(r) = target.rating {
        let _ = writeln!(out, "Rating: {r:.2} from {} reviews", target.review_count);
    }
    let amenities: Vec<&str> = target.amenities.iter().map(String::as_str).collect();
    let _ = writeln!(out, "Amenities: {}", amenities.join(", "));
    out
}

fn market_block(stats: &MarketStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Competitors analyzed: {}", stats.competitor_count);
    if stats.has_prices() {
        let _ = writeln!(
            out,
            "Competitor nightly prices: min ${:.2}, max ${:.2}, average ${:.2}",
            stats.price_min, stats.price_max, stats.price_avg
        );
    }
    let _ = writeln!(out, "Average competitor rating: {:.2}", stats.rating_avg);
    let common: Vec<String> = stats
        .amenity_frequency
        .iter()
        .take(10)
        .map(|a| format!("{} ({}%)", a.name, a.percent))
        .collect();
    let _ = writeln!(out, "Most common amenities: {}", common.join(", "));
    if !stats.missing_amenities.is_empty() {
        let _ = writeln!(out, "Common amenities this listing lacks: {}", stats.missing_amenities.join(", "));
    }
    let words: Vec<&str> = stats.top_keywords.iter().map(|k| k.word.as_str()).collect();
    let _ = writeln!(out, "Frequent title keywords: {}", words.join(", "));
    out
}

pub fn pricing_prompt(target: &TargetListing, stats: &MarketStats) -> String {
    format!(
        "You are a short-term rental pricing analyst.\n\n\
         LISTING\n{}\nMARKET\n{}\n\
         Recommend a nightly price for this listing.\n\
         Respond with a single JSON object and nothing else:\n\
         {{\"suggested_price\": number, \"min_price\": number, \"max_price\": number, \
         \"reasoning\": string, \"confidence\": \"low\" | \"medium\" | \"high\"}}",
        listing_block(target),
        market_block(stats)
    )
}

pub fn features_prompt(target: &TargetListing, stats: &MarketStats) -> String {
    format!(
        "You advise short-term rental hosts on amenities.\n\n\
         LISTING\n{}\nMARKET\n{}\n\
         Suggest up to 5 amenities or features the host should add to compete.\n\
         Respond with a single JSON object and nothing else:\n\
         {{\"suggestions\": [{{\"feature\": string, \"reason\": string}}]}}",
        listing_block(target),
        market_block(stats)
    )
}

pub fn description_prompt(target: &TargetListing, stats: &MarketStats) -> String {
    let current = target.description.as_deref().unwrap_or("(none)");
    format!(
        "You write short-term rental listing copy.\n\n\
         LISTING\n{}Current description: {}\n\nMARKET\n{}\n\
         Write an improved title (max 50 characters) and description (max 500 characters).\n\
         Respond with a single JSON object and nothing else:\n\
         {{\"title\": string, \"description\": string}}",
        listing_block(target),
        current,
        market_block(stats)
    )
}
