use crate::analysis::AppState;
use crate::db::Database;
use crate::router::handle;
use crate::tests::fixtures::market_provider;
use crate::tests::utils::{form_request, init_test_db, json_request, read_json, request, test_state};

/// Two analyses of L1 with c1 moving from $100 to $130, leaving unread alerts.
fn state_with_alerts(db: &Database) -> AppState {
    let first = test_state(db, market_provider(100.0, 4.5), None);
    handle(json_request("POST", "/api/analyze", r#"{"listing_id": "L1"}"#), &first);

    let second = test_state(db, market_provider(130.0, 4.5), None);
    handle(json_request("POST", "/api/analyze", r#"{"listing_id": "L1"}"#), &second);
    second
}

#[test]
fn alerts_are_listed_and_filtered() {
    let db = init_test_db();
    let state = state_with_alerts(&db);

    let all = read_json(handle(request("GET", "/api/listings/L1/alerts"), &state));
    let all = all.as_array().unwrap().clone();
    assert!(!all.is_empty());

    let price = all
        .iter()
        .find(|a| a["alert_type"] == "price_change")
        .expect("price alert");
    assert_eq!(price["severity"], "high");
    assert_eq!(price["change_percent"], 30.0);
    assert_eq!(price["is_read"], false);

    let id = price["id"].as_i64().unwrap();
    let resp = handle(request("POST", &format!("/api/alerts/{id}/read")), &state);
    assert_eq!(resp.status(), 200);
    assert_eq!(read_json(resp)["is_read"], true);

    let unread = read_json(handle(request("GET", "/api/listings/L1/alerts?unread=true"), &state));
    assert_eq!(unread.as_array().unwrap().len(), all.len() - 1);
}

#[test]
fn mark_all_read_reports_count() {
    let db = init_test_db();
    let state = state_with_alerts(&db);

    let all = read_json(handle(request("GET", "/api/listings/L1/alerts"), &state));
    let count = all.as_array().unwrap().len() as u64;

    let resp = handle(request("POST", "/api/listings/L1/alerts/read"), &state);
    assert_eq!(resp.status(), 200);
    assert_eq!(read_json(resp)["updated"], count);

    let again = read_json(handle(request("POST", "/api/listings/L1/alerts/read"), &state));
    assert_eq!(again["updated"], 0);
}

#[test]
fn missing_or_malformed_alert_ids() {
    let db = init_test_db();
    let state = test_state(&db, market_provider(100.0, 4.5), None);

    let resp = handle(request("POST", "/api/alerts/424242/read"), &state);
    assert_eq!(resp.status(), 404);

    let resp = handle(request("POST", "/api/alerts/abc/read"), &state);
    assert_eq!(resp.status(), 400);
}

#[test]
fn form_mark_read_redirects_to_listing() {
    let db = init_test_db();
    let state = state_with_alerts(&db);

    let all = read_json(handle(request("GET", "/api/listings/L1/alerts"), &state));
    let id = all[0]["id"].as_i64().unwrap();

    let resp = handle(form_request(&format!("/alerts/{id}/read"), "listing_id=L1"), &state);
    assert_eq!(resp.status(), 302);
    assert_eq!(resp.headers()["Location"], "/listings/L1");

    let resp = handle(form_request("/listings/L1/alerts/read", ""), &state);
    assert_eq!(resp.status(), 302);

    let unread = read_json(handle(request("GET", "/api/listings/L1/alerts?unread=1"), &state));
    assert!(unread.as_array().unwrap().is_empty());
}
