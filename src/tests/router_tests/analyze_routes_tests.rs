use crate::router::handle;
use crate::tests::fixtures::market_provider;
use crate::tests::utils::{init_test_db, json_request, read_json, request, test_state};

#[test]
fn health_reports_database() {
    let db = init_test_db();
    let state = test_state(&db, market_provider(100.0, 4.5), None);

    let resp = handle(request("GET", "/health"), &state);
    assert_eq!(resp.status(), 200);

    let body = read_json(resp);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
    assert!(body["timestamp"].is_string());
}

#[test]
fn analyze_returns_snapshot_and_no_alerts_first_time() {
    let db = init_test_db();
    let state = test_state(&db, market_provider(100.0, 4.5), None);

    let resp = handle(json_request("POST", "/api/analyze", r#"{"listing_id": "L1"}"#), &state);
    assert_eq!(resp.status(), 200);

    let body = read_json(resp);
    assert_eq!(body["snapshot"]["listing_id"], "L1");
    assert_eq!(body["snapshot"]["is_current"], true);
    assert_eq!(body["snapshot"]["competitors"].as_array().unwrap().len(), 2);
    assert_eq!(body["snapshot"]["recommendations"]["pricing"]["source"], "fallback");
    assert_eq!(body["alerts"].as_array().unwrap().len(), 0);
}

#[test]
fn second_analysis_produces_alerts() {
    let db = init_test_db();
    let first = test_state(&db, market_provider(100.0, 4.5), None);
    handle(json_request("POST", "/api/analyze", r#"{"listing_id": "L1"}"#), &first);

    let second = test_state(&db, market_provider(125.0, 4.0), None);
    let resp = handle(json_request("POST", "/api/analyze", r#"{"listing_id": "L1"}"#), &second);
    assert_eq!(resp.status(), 200);

    let body = read_json(resp);
    let types: Vec<&str> = body["alerts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["alert_type"].as_str().unwrap())
        .collect();
    assert!(types.contains(&"price_change"));
    assert!(types.contains(&"rating_change"));

    let resp = handle(request("GET", "/api/listings/L1/history?limit=5"), &second);
    assert_eq!(resp.status(), 200);
    let history = read_json(resp);
    assert_eq!(history["snapshots"].as_array().unwrap().len(), 2);
    assert_eq!(history["competitors"].as_array().unwrap().len(), 4);
}

#[test]
fn analyze_rejects_bad_bodies() {
    let db = init_test_db();
    let state = test_state(&db, market_provider(100.0, 4.5), None);

    let resp = handle(json_request("POST", "/api/analyze", "not json"), &state);
    assert_eq!(resp.status(), 400);
    assert!(read_json(resp)["error"].is_string());

    let resp = handle(json_request("POST", "/api/analyze", r#"{"listing_id": " "}"#), &state);
    assert_eq!(resp.status(), 400);
}

#[test]
fn provider_failure_is_bad_gateway() {
    let db = init_test_db();
    let state = test_state(&db, market_provider(100.0, 4.5), None);

    let resp = handle(json_request("POST", "/api/analyze", r#"{"listing_id": "nope"}"#), &state);
    assert_eq!(resp.status(), 502);
}

#[test]
fn untracked_listing_routes_are_not_found() {
    let db = init_test_db();
    let state = test_state(&db, market_provider(100.0, 4.5), None);

    for (method, uri) in [
        ("GET", "/api/listings/L1"),
        ("GET", "/api/listings/L1/history"),
        ("GET", "/api/listings/L1/history.xlsx"),
        ("POST", "/api/listings/L1/refresh"),
        ("GET", "/api/nothing-here"),
    ] {
        let resp = handle(request(method, uri), &state);
        assert_eq!(resp.status(), 404, "{method} {uri}");
    }
}

#[test]
fn listings_index_and_detail() {
    let db = init_test_db();
    let state = test_state(&db, market_provider(100.0, 4.5), None);
    handle(json_request("POST", "/api/analyze", r#"{"listing_id": "L1"}"#), &state);

    let list = read_json(handle(request("GET", "/api/listings"), &state));
    let rows = list.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["listing_id"], "L1");
    assert_eq!(rows[0]["listing_name"], "Riverside Loft");
    assert_eq!(rows[0]["unread_alerts"], 0);

    let detail = read_json(handle(request("GET", "/api/listings/L1"), &state));
    assert_eq!(detail["target"]["name"], "Riverside Loft");
    assert_eq!(detail["stats"]["competitor_count"], 2);

    let resp = handle(request("POST", "/api/listings/L1/refresh"), &state);
    assert_eq!(resp.status(), 200);

    let resp = handle(request("GET", "/api/listings/L1/history.xlsx"), &state);
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()["Content-Type"],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert!(resp.headers()["Content-Disposition"]
        .to_str()
        .unwrap()
        .contains("history_L1.xlsx"));
}

#[test]
fn invalid_history_limit_is_rejected() {
    let db = init_test_db();
    let state = test_state(&db, market_provider(100.0, 4.5), None);
    handle(json_request("POST", "/api/analyze", r#"{"listing_id": "L1"}"#), &state);

    let resp = handle(request("GET", "/api/listings/L1/history?limit=zero"), &state);
    assert_eq!(resp.status(), 400);
}
