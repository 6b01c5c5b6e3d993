use crate::analysis::AppState;
use crate::config::AnalysisConfig;
use crate::db::connection::{init_db, Database};
use crate::fetcher::{FetchSettings, ListingProvider};
use crate::recommender::TextGenerator;
use crate::tests::fixtures::ScriptedGenerator;
use astra::{Body, Request, Response};
use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

static DB_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Fresh temp-file database with the production schema applied.
pub fn init_test_db() -> Database {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let n = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!("listing_radar_test_{nanos}_{n}.sqlite"));

    let db = Database::new(path.to_string_lossy().into_owned());
    init_db(&db).unwrap_or_else(|e| panic!("Database initialization failed: {e}"));
    db
}

/// App state with no pacing delays around the given stubs.
pub fn test_state(
    db: &Database,
    provider: impl ListingProvider + 'static,
    generator: Option<ScriptedGenerator>,
) -> AppState {
    let analysis = AnalysisConfig {
        request_delay: Duration::ZERO,
        listing_delay: Duration::ZERO,
        scheduler_enabled: false,
        ..AnalysisConfig::default()
    };

    AppState {
        db: db.clone(),
        provider: Arc::new(provider),
        generator: generator.map(|g| Arc::new(g) as Arc<dyn TextGenerator>),
        fetch: FetchSettings {
            radius_km: analysis.search_radius_km,
            max_competitors: analysis.max_competitors,
            request_delay: Duration::ZERO,
            retry_backoff: Duration::ZERO,
        },
        analysis,
    }
}

pub fn request(method: &str, uri: &str) -> Request {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &str) -> Request {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn form_request(uri: &str, body: &str) -> Request {
    http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn read_body(resp: Response) -> String {
    let mut body = String::new();
    resp.into_body()
        .reader()
        .read_to_string(&mut body)
        .unwrap();
    body
}

pub fn read_json(resp: Response) -> serde_json::Value {
    serde_json::from_str(&read_body(resp)).unwrap()
}
