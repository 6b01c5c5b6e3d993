// normalize.rs
//
// Providers disagree on almost every field. The shapes we accept:
//
// listing
//  ├── id | listing_id | listingId            (string or number)
//  ├── name | title | listing_name
//  ├── price                                  (number, "$1,234", {amount}, {rate: {amount}})
//  │   | pricing.nightly | nightly_price | price_per_night
//  ├── rating | avg_rating | star_rating | reviews.rating   (number or "4.85 (120)")
//  ├── review_count | reviews_count | number_of_reviews | reviews.count
//  ├── amenities | amenity_names              ([str] or [{name}] / [{title}])
//  └── lat/lng | latitude/longitude | lat/lon
//      at top level or under location | coordinates | coordinate | location.coordinate
//
// Detail responses may be wrapped in {data}, {result} or {listing};
// search responses are a bare array or an array under results | listings | data | items.

use crate::domain::listing::{CompetitorRecord, Coordinate, TargetListing};
use crate::fetcher::FetchError;
use serde_json::Value;
use std::collections::BTreeSet;

const ID_KEYS: &[&str] = &["id", "listing_id", "listingId"];
const NAME_KEYS: &[&str] = &["name", "title", "listing_name"];
const PRICE_KEYS: &[&str] = &["price", "pricing.nightly", "pricing", "nightly_price", "price_per_night", "rate"];
const RATING_KEYS: &[&str] = &["rating", "avg_rating", "star_rating", "reviews.rating"];
const REVIEW_KEYS: &[&str] = &["review_count", "reviews_count", "number_of_reviews", "reviewsCount", "reviews.count"];
const AMENITY_KEYS: &[&str] = &["amenities", "amenity_names"];
const LOCATION_ROOTS: &[&str] = &["", "location", "coordinates", "coordinate", "location.coordinate"];
const WRAPPER_KEYS: &[&str] = &["data", "result", "listing"];
const ARRAY_KEYS: &[&str] = &["results", "listings", "data", "items"];

/// Walks a dotted path, treating JSON null as absent.
fn lookup<'a>(v: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(v);
    }
    let mut cur = v;
    for part in path.split('.') {
        cur = cur.get(part)?;
    }
    if cur.is_null() {
        None
    } else {
        Some(cur)
    }
}

fn first<'a>(v: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths.iter().find_map(|p| lookup(v, p))
}

fn text(v: &Value, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|p| match lookup(v, p)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    })
}

/// Leading number out of strings like "$1,234.50" or "4.85 (120 reviews)".
pub fn parse_number_text(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .trim_start_matches(|c: char| !c.is_ascii_digit() && c != '.' && c != '-')
        .chars()
        .filter(|c| *c != ',')
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse().ok()
}

fn number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number_text(s),
        _ => None,
    }
}

fn price_value(v: &Value, depth: u8) -> Option<f64> {
    match v {
        Value::Object(_) if depth < 3 => ["amount", "rate", "nightly", "value", "price"]
            .iter()
            .find_map(|k| v.get(*k).and_then(|inner| price_value(inner, depth + 1))),
        _ => number(v),
    }
}

fn extract_id(v: &Value) -> Option<String> {
    ID_KEYS.iter().find_map(|k| match lookup(v, k)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn extract_price(v: &Value) -> Option<f64> {
    PRICE_KEYS
        .iter()
        .find_map(|k| lookup(v, k).and_then(|p| price_value(p, 0)))
        .filter(|p| *p > 0.0)
}

fn extract_rating(v: &Value) -> Option<f64> {
    RATING_KEYS
        .iter()
        .find_map(|k| lookup(v, k).and_then(number))
        .filter(|r| *r > 0.0)
}

fn extract_reviews(v: &Value) -> i64 {
    REVIEW_KEYS
        .iter()
        .find_map(|k| lookup(v, k).and_then(number))
        .map(|n| n.max(0.0) as i64)
        .unwrap_or(0)
}

fn extract_amenities(v: &Value) -> BTreeSet<String> {
    let Some(items) = first(v, AMENITY_KEYS).and_then(Value::as_array) else {
        return BTreeSet::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.as_str()),
            Value::Object(_) => item
                .get("name")
                .or_else(|| item.get("title"))
                .and_then(Value::as_str),
            _ => None,
        })
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn extract_location(v: &Value) -> Option<Coordinate> {
    LOCATION_ROOTS.iter().find_map(|root| {
        let node = lookup(v, root)?;
        let lat = first(node, &["lat", "latitude"]).and_then(number)?;
        let lng = first(node, &["lng", "lon", "long", "longitude"]).and_then(number)?;
        let valid = (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng);
        valid.then_some(Coordinate { lat, lng })
    })
}

fn extract_bedrooms(v: &Value) -> Option<i64> {
    first(v, &["bedrooms", "bedroom_count"])
        .and_then(number)
        .map(|n| n as i64)
}

/// Peels `{"data": {...}}`-style wrappers off a detail response.
pub fn unwrap_record(v: &Value) -> &Value {
    let mut cur = v;
    for _ in 0..3 {
        if extract_id(cur).is_some() {
            break;
        }
        match WRAPPER_KEYS.iter().find_map(|k| cur.get(*k).filter(|inner| inner.is_object())) {
            Some(inner) => cur = inner,
            None => break,
        }
    }
    cur
}

/// Finds the array of listings in a search response.
pub fn listing_array(v: &Value) -> Result<&Vec<Value>, FetchError> {
    if let Some(arr) = v.as_array() {
        return Ok(arr);
    }
    for key in ARRAY_KEYS {
        match v.get(*key) {
            Some(Value::Array(arr)) => return Ok(arr),
            Some(inner @ Value::Object(_)) => {
                if let Ok(arr) = listing_array(inner) {
                    return Ok(arr);
                }
            }
            _ => {}
        }
    }
    Err(FetchError::UnexpectedShape("no listing array in search response".into()))
}

pub fn normalize_target(raw: &Value) -> Result<TargetListing, FetchError> {
    let v = unwrap_record(raw);
    let id = extract_id(v).ok_or(FetchError::MissingField("id"))?;
    let location = extract_location(v).ok_or(FetchError::MissingField("location"))?;

    Ok(TargetListing {
        name: text(v, NAME_KEYS).unwrap_or_else(|| format!("Listing {id}")),
        price: extract_price(v),
        rating: extract_rating(v),
        review_count: extract_reviews(v),
        amenities: extract_amenities(v),
        location,
        property_type: text(v, &["property_type", "propertyType", "room_type", "type"]),
        bedrooms: extract_bedrooms(v),
        city: text(v, &["city", "location.city", "address.city"]),
        description: text(v, &["description", "summary"]),
        url: text(v, &["url", "listing_url", "link"]),
        id,
    })
}

pub fn normalize_competitor(raw: &Value) -> Result<CompetitorRecord, FetchError> {
    let v = unwrap_record(raw);
    let id = extract_id(v).ok_or(FetchError::MissingField("id"))?;

    Ok(CompetitorRecord {
        name: text(v, NAME_KEYS).unwrap_or_else(|| format!("Listing {id}")),
        price: extract_price(v),
        rating: extract_rating(v),
        review_count: extract_reviews(v),
        amenities: extract_amenities(v),
        location: extract_location(v),
        distance_km: None,
        property_type: text(v, &["property_type", "propertyType", "room_type", "type"]),
        bedrooms: extract_bedrooms(v),
        url: text(v, &["url", "listing_url", "link"]),
        id,
    })
}

/// Normalizes every usable entry of a search response; entries without an id are skipped.
pub fn normalize_search(raw: &Value) -> Result<Vec<CompetitorRecord>, FetchError> {
    let items = listing_array(raw)?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match normalize_competitor(item) {
            Ok(c) => out.push(c),
            Err(e) => tracing::warn!("Skipping search result: {e}"),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_target_shape() {
        let raw = json!({
            "id": "123",
            "name": "Beach House",
            "price": 150,
            "rating": 4.9,
            "review_count": 87,
            "amenities": ["WiFi", " Pool ", "wifi"],
            "lat": 25.76,
            "lng": -80.19,
            "city": "Miami",
            "bedrooms": 3
        });
        let t = normalize_target(&raw).unwrap();
        assert_eq!(t.id, "123");
        assert_eq!(t.name, "Beach House");
        assert_eq!(t.price, Some(150.0));
        assert_eq!(t.rating, Some(4.9));
        assert_eq!(t.review_count, 87);
        assert_eq!(t.amenities.iter().collect::<Vec<_>>(), vec!["pool", "wifi"]);
        assert_eq!(t.location, Coordinate { lat: 25.76, lng: -80.19 });
        assert_eq!(t.city.as_deref(), Some("Miami"));
        assert_eq!(t.bedrooms, Some(3));
    }

    #[test]
    fn wrapped_nested_target_shape() {
        let raw = json!({
            "data": {
                "listing_id": 987654,
                "title": "Loft",
                "price": { "rate": { "amount": "$1,250.50" } },
                "reviews": { "rating": "4.85 (120)", "count": "120" },
                "amenity_names": [{ "name": "Hot Tub" }, { "title": "Parking" }, 7],
                "location": { "latitude": "40.1", "longitude": "-73.9", "city": "NYC" }
            }
        });
        let t = normalize_target(&raw).unwrap();
        assert_eq!(t.id, "987654");
        assert_eq!(t.name, "Loft");
        assert_eq!(t.price, Some(1250.5));
        assert_eq!(t.rating, Some(4.85));
        assert_eq!(t.review_count, 120);
        assert!(t.amenities.contains("hot tub") && t.amenities.contains("parking"));
        assert_eq!(t.location, Coordinate { lat: 40.1, lng: -73.9 });
        assert_eq!(t.city.as_deref(), Some("NYC"));
    }

    #[test]
    fn pricing_object_and_coordinate_block() {
        let raw = json!({
            "listingId": "x9",
            "pricing": { "nightly": 99.0 },
            "coordinate": { "lat": 1.5, "lon": 2.5 }
        });
        let c = normalize_competitor(&raw).unwrap();
        assert_eq!(c.price, Some(99.0));
        assert_eq!(c.location, Some(Coordinate { lat: 1.5, lng: 2.5 }));
        assert_eq!(c.name, "Listing x9");
        assert!(c.amenities.is_empty());
    }

    #[test]
    fn target_without_location_is_rejected() {
        let err = normalize_target(&json!({ "id": "1", "name": "Nowhere" })).unwrap_err();
        assert!(matches!(err, FetchError::MissingField("location")));
    }

    #[test]
    fn zero_rating_and_price_are_absent() {
        let c = normalize_competitor(&json!({ "id": 5, "price": 0, "rating": 0 })).unwrap();
        assert_eq!(c.price, None);
        assert_eq!(c.rating, None);
    }

    #[test]
    fn search_array_variants() {
        let bare = json!([{ "id": "a" }, { "id": "b" }]);
        assert_eq!(normalize_search(&bare).unwrap().len(), 2);

        let wrapped = json!({ "data": { "results": [{ "id": "a" }, { "name": "no id" }] } });
        let comps = normalize_search(&wrapped).unwrap();
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0].id, "a");

        let listings = json!({ "listings": [] });
        assert!(normalize_search(&listings).unwrap().is_empty());

        assert!(normalize_search(&json!({ "message": "quota" })).is_err());
    }

    #[test]
    fn number_text_parsing() {
        assert_eq!(parse_number_text("$1,234.50"), Some(1234.5));
        assert_eq!(parse_number_text("4.85 (120)"), Some(4.85));
        assert_eq!(parse_number_text("USD 80"), Some(80.0));
        assert_eq!(parse_number_text("free"), None);
    }
}
