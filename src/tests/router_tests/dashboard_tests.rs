use crate::router::handle;
use crate::tests::fixtures::{market_provider, StubProvider};
use crate::tests::utils::{form_request, init_test_db, read_body, request, test_state};
use serde_json::json;

/// One listing under `id` with a single nearby competitor.
fn single_listing_provider(id: &str, listing_url: &str, competitor_url: &str) -> StubProvider {
    StubProvider::new()
        .with_listing(json!({
            "id": id,
            "name": "Casa Verde",
            "price": 95,
            "url": listing_url,
            "lat": 30.2672,
            "lng": -97.7431
        }))
        .with_search(json!([{
            "id": "c9",
            "name": "Hillside Cabin",
            "price": 105,
            "amenities": ["wifi"],
            "url": competitor_url,
            "lat": 30.2700,
            "lng": -97.7430
        }]))
}

#[test]
fn empty_dashboard_shows_analyze_form() {
    let db = init_test_db();
    let state = test_state(&db, market_provider(100.0, 4.5), None);

    let resp = handle(request("GET", "/"), &state);
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["Content-Type"], "text/html; charset=utf-8");

    let body = read_body(resp);
    assert!(body.contains("Analyze a listing"));
    assert!(body.contains("No listings tracked yet"));
}

#[test]
fn analyze_form_redirects_and_listing_page_renders() {
    let db = init_test_db();
    let state = test_state(&db, market_provider(100.0, 4.5), None);

    let resp = handle(form_request("/listings", "listing_id=L1"), &state);
    assert_eq!(resp.status(), 302);
    assert_eq!(resp.headers()["Location"], "/listings/L1");

    let body = read_body(handle(request("GET", "/"), &state));
    assert!(body.contains("Riverside Loft"));
    assert!(body.contains("/listings/L1"));

    let resp = handle(request("GET", "/listings/L1"), &state);
    assert_eq!(resp.status(), 200);
    let body = read_body(resp);
    assert!(body.contains("Cozy Studio"));
    assert!(body.contains("Lake House"));
    assert!(body.contains("Rule-based"));
}

#[test]
fn refresh_form_redirects_back() {
    let db = init_test_db();
    let state = test_state(&db, market_provider(100.0, 4.5), None);
    handle(form_request("/listings", "listing_id=L1"), &state);

    let resp = handle(form_request("/listings/L1/refresh", ""), &state);
    assert_eq!(resp.status(), 302);
    assert_eq!(resp.headers()["Location"], "/listings/L1");
}

#[test]
fn page_errors_render_html() {
    let db = init_test_db();
    let state = test_state(&db, market_provider(100.0, 4.5), None);

    let resp = handle(request("GET", "/listings/unknown"), &state);
    assert_eq!(resp.status(), 404);
    assert!(read_body(resp).contains("Error 404"));

    let resp = handle(form_request("/listings", "listing_id="), &state);
    assert_eq!(resp.status(), 400);

    let resp = handle(form_request("/listings/unknown/refresh", ""), &state);
    assert_eq!(resp.status(), 404);
}

#[test]
fn ids_with_spaces_and_accents_round_trip_through_redirects() {
    let db = init_test_db();
    let provider = single_listing_provider("Casa Ñ 1", "https://example.com/casa", "https://example.com/c9");
    let state = test_state(&db, provider, None);

    let resp = handle(form_request("/listings", "listing_id=Casa+%C3%91+1"), &state);
    assert_eq!(resp.status(), 302);
    assert_eq!(resp.headers()["Location"], "/listings/Casa%20%C3%91%201");

    let resp = handle(request("GET", "/listings/Casa%20%C3%91%201"), &state);
    assert_eq!(resp.status(), 200);
    let body = read_body(resp);
    assert!(body.contains("/listings/Casa%20%C3%91%201/refresh"));

    let resp = handle(form_request("/listings/Casa%20%C3%91%201/refresh", ""), &state);
    assert_eq!(resp.status(), 302);
    assert_eq!(resp.headers()["Location"], "/listings/Casa%20%C3%91%201");
}

#[test]
fn only_http_links_from_provider_data_are_rendered() {
    let db = init_test_db();
    let provider = single_listing_provider("L7", "javascript:alert(1)", "HTTPS://example.com/c9");
    let state = test_state(&db, provider, None);
    handle(form_request("/listings", "listing_id=L7"), &state);

    let body = read_body(handle(request("GET", "/listings/L7"), &state));
    assert!(body.contains("Hillside Cabin"));
    assert!(!body.contains("javascript:"));
    assert!(!body.contains("view listing"));
    assert!(body.contains(r#"href="HTTPS://example.com/c9""#));
}
