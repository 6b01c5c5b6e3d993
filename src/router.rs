use crate::analysis::{analyze_listing, refresh_listing, AppState};
use crate::db::alerts::{count_unread, get_alert, list_alerts, mark_alert_read, mark_all_read};
use crate::db::history::list_history;
use crate::db::snapshots::{get_current_snapshot, list_snapshot_summaries, list_tracked_listings};
use crate::domain::snapshot::{StoredSnapshot, TrackedListing};
use crate::errors::ServerError;
use crate::responses::{
    html_error_response, html_response, json_body_response, json_error_response, json_response,
    redirect, ResultResp,
};
use crate::spreadsheets::export_history_xlsx;
use crate::templates::components::listing_href;
use crate::templates::pages::{home_page, listing_page, ListingPageVm};
use astra::{Request, Response};
use chrono::Utc;
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::io::Read;
use std::time::Instant;

const MAX_BODY_BYTES: u64 = 64 * 1024;
const DEFAULT_HISTORY_LIMIT: i64 = 30;
const MAX_HISTORY_LIMIT: i64 = 500;
const ALERT_LIMIT: i64 = 100;

/// Entry point for every request. API routes answer errors as JSON, pages as HTML.
pub fn handle(req: Request, state: &AppState) -> Response {
    let started = Instant::now();
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let is_api = path == "/health" || path.starts_with("/api/");

    let resp = match route(req, state) {
        Ok(resp) => resp,
        Err(err) if is_api => json_error_response(err),
        Err(err) => html_error_response(err),
    };

    tracing::info!(
        method = %method,
        path = %path,
        status = resp.status().as_u16(),
        elapsed = ?started.elapsed(),
        "request"
    );
    resp
}

fn route(mut req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let query = parse_query(req.uri().query());
    let decoded = path_segments(&path)?;
    let segments: Vec<&str> = decoded.iter().map(String::as_str).collect();

    match (method.as_str(), segments.as_slice()) {
        ("GET", ["health"]) => health(state),

        // JSON API
        ("POST", ["api", "analyze"]) => {
            let body: AnalyzeRequest = read_json(&mut req)?;
            json_response(&analyze_listing(state, &body.listing_id)?)
        }
        ("GET", ["api", "listings"]) => json_response(&tracked_listings(state)?),
        ("GET", ["api", "listings", id]) => json_response(&current_snapshot(state, id)?),
        ("GET", ["api", "listings", id, "history"]) => {
            let limit = limit_param(&query, DEFAULT_HISTORY_LIMIT)?;
            let (snapshots, competitors) = state.db.with_conn(|conn| {
                let snapshots = list_snapshot_summaries(conn, id, limit)?;
                let competitors = list_history(conn, id, competitor_rows(state, limit))?;
                Ok((snapshots, competitors))
            })?;
            if snapshots.is_empty() {
                return Err(ServerError::NotFound);
            }
            json_response(&json!({ "snapshots": snapshots, "competitors": competitors }))
        }
        ("GET", ["api", "listings", id, "history.xlsx"]) => {
            let (snapshots, competitors) = state.db.with_conn(|conn| {
                let snapshots = list_snapshot_summaries(conn, id, MAX_HISTORY_LIMIT)?;
                let competitors = list_history(conn, id, competitor_rows(state, MAX_HISTORY_LIMIT))?;
                Ok((snapshots, competitors))
            })?;
            if snapshots.is_empty() {
                return Err(ServerError::NotFound);
            }
            export_history_xlsx(id, &snapshots, &competitors)
        }
        ("GET", ["api", "listings", id, "alerts"]) => {
            let unread_only = flag_param(&query, "unread");
            let alerts = state
                .db
                .with_conn(|conn| list_alerts(conn, id, unread_only, ALERT_LIMIT))?;
            json_response(&alerts)
        }
        ("POST", ["api", "listings", id, "alerts", "read"]) => {
            let updated = state.db.with_conn(|conn| mark_all_read(conn, id))?;
            json_response(&json!({ "updated": updated }))
        }
        ("POST", ["api", "alerts", alert_id, "read"]) => {
            let alert_id = parse_id(alert_id)?;
            let alert = state.db.with_conn(|conn| {
                if !mark_alert_read(conn, alert_id)? {
                    return Err(ServerError::NotFound);
                }
                get_alert(conn, alert_id)?.ok_or(ServerError::NotFound)
            })?;
            json_response(&alert)
        }
        ("POST", ["api", "listings", id, "refresh"]) => json_response(&refresh_listing(state, id)?),

        // Dashboard
        ("GET", []) => html_response(home_page(&tracked_listings(state)?)),
        ("GET", ["listings", id]) => {
            let current = current_snapshot(state, id)?;
            let (alerts, unread_alerts, history) = state.db.with_conn(|conn| {
                Ok((
                    list_alerts(conn, id, false, ALERT_LIMIT)?,
                    count_unread(conn, id)?,
                    list_snapshot_summaries(conn, id, DEFAULT_HISTORY_LIMIT)?,
                ))
            })?;
            html_response(listing_page(&ListingPageVm {
                current,
                alerts,
                unread_alerts,
                history,
            }))
        }
        ("POST", ["listings"]) => {
            let form = read_form(&mut req)?;
            let listing_id = form
                .get("listing_id")
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| ServerError::BadRequest("listing_id is required".into()))?;
            let outcome = analyze_listing(state, listing_id)?;
            redirect(&listing_href(&outcome.snapshot.snapshot.listing_id))
        }
        ("POST", ["listings", id, "refresh"]) => {
            refresh_listing(state, id)?;
            redirect(&listing_href(id))
        }
        ("POST", ["listings", id, "alerts", "read"]) => {
            state.db.with_conn(|conn| mark_all_read(conn, id))?;
            redirect(&listing_href(id))
        }
        ("POST", ["alerts", alert_id, "read"]) => {
            let alert_id = parse_id(alert_id)?;
            let form = read_form(&mut req)?;
            let alert = state.db.with_conn(|conn| {
                if !mark_alert_read(conn, alert_id)? {
                    return Err(ServerError::NotFound);
                }
                get_alert(conn, alert_id)?.ok_or(ServerError::NotFound)
            })?;
            let listing_id = form.get("listing_id").cloned().unwrap_or(alert.listing_id);
            redirect(&listing_href(&listing_id))
        }

        _ => Err(ServerError::NotFound),
    }
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    listing_id: String,
}

fn health(state: &AppState) -> ResultResp {
    let (status, database) = match state.db.ping() {
        Ok(()) => (200, "ok"),
        Err(e) => {
            tracing::error!("health check failed: {e}");
            (503, "unavailable")
        }
    };

    json_body_response(
        status,
        &json!({
            "status": if status == 200 { "ok" } else { "degraded" },
            "database": database,
            "timestamp": Utc::now(),
        }),
    )
}

fn tracked_listings(state: &AppState) -> Result<Vec<TrackedListing>, ServerError> {
    state.db.with_conn(|conn| {
        let mut out = Vec::new();
        for summary in list_tracked_listings(conn)? {
            let unread_alerts = count_unread(conn, &summary.listing_id)?;
            out.push(TrackedListing {
                summary,
                unread_alerts,
            });
        }
        Ok(out)
    })
}

fn current_snapshot(state: &AppState, listing_id: &str) -> Result<StoredSnapshot, ServerError> {
    state
        .db
        .with_conn(|conn| get_current_snapshot(conn, listing_id))?
        .ok_or(ServerError::NotFound)
}

/// Non-empty path segments, percent-decoded.
fn path_segments(path: &str) -> Result<Vec<String>, ServerError> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| {
            percent_decode_str(s)
                .decode_utf8()
                .map(|d| d.into_owned())
                .map_err(|_| ServerError::BadRequest(format!("invalid path segment '{s}'")))
        })
        .collect()
}

/// Competitor history rows covering roughly the newest `snapshots` runs.
fn competitor_rows(state: &AppState, snapshots: i64) -> i64 {
    snapshots.saturating_mul(state.analysis.max_competitors.max(1) as i64)
}

fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    query
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

fn limit_param(query: &HashMap<String, String>, default: i64) -> Result<i64, ServerError> {
    match query.get("limit") {
        None => Ok(default),
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) if n > 0 => Ok(n.min(MAX_HISTORY_LIMIT)),
            _ => Err(ServerError::BadRequest(format!("invalid limit '{raw}'"))),
        },
    }
}

fn flag_param(query: &HashMap<String, String>, name: &str) -> bool {
    matches!(query.get(name).map(String::as_str), Some("true" | "1" | "yes"))
}

fn parse_id(raw: &str) -> Result<i64, ServerError> {
    raw.parse()
        .map_err(|_| ServerError::BadRequest(format!("invalid id '{raw}'")))
}

fn read_body(req: &mut Request) -> Result<String, ServerError> {
    let mut body = String::new();
    req.body_mut()
        .reader()
        .take(MAX_BODY_BYTES)
        .read_to_string(&mut body)
        .map_err(|e| ServerError::BadRequest(format!("unreadable request body: {e}")))?;
    Ok(body)
}

fn read_json<T: serde::de::DeserializeOwned>(req: &mut Request) -> Result<T, ServerError> {
    let body = read_body(req)?;
    serde_json::from_str(&body).map_err(|e| ServerError::BadRequest(format!("invalid JSON body: {e}")))
}

fn read_form(req: &mut Request) -> Result<HashMap<String, String>, ServerError> {
    let body = read_body(req)?;
    Ok(url::form_urlencoded::parse(body.as_bytes())
        .into_owned()
        .collect())
}
