use crate::db::alerts::insert_alerts;
use crate::db::connection::Database;
use crate::db::history::append_history;
use crate::domain::alert::Alert;
use crate::domain::diff::diff_snapshots;
use crate::domain::history::history_entries;
use crate::domain::snapshot::{AnalysisSnapshot, SnapshotSummary, StoredSnapshot};
use crate::errors::ServerError;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

const SUMMARY_COLUMNS: &str = "id, listing_id, listing_name, captured_at, is_current, \
     competitor_count, price_avg, rating_avg, target_price, suggested_price";

/// Persists one analysis run: the new snapshot is diffed against the listing's
/// current snapshot, becomes current itself, and the resulting alerts and
/// history rows are appended.
///
/// The write lock is taken before the current snapshot is read, so concurrent
/// runs for one listing each diff against the snapshot they actually replace.
pub fn record_analysis(
    db: &Database,
    snapshot: &AnalysisSnapshot,
) -> Result<(StoredSnapshot, Vec<Alert>), ServerError> {
    db.with_conn(|conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let previous = get_current_snapshot(&tx, &snapshot.listing_id)?;
        let alerts = diff_snapshots(previous.as_ref().map(|p| &p.snapshot), snapshot);

        let id = insert_snapshot(&tx, snapshot)?;
        let stored_alerts = insert_alerts(&tx, &alerts, snapshot.captured_at)?;
        append_history(&tx, &history_entries(snapshot))?;

        tx.commit()?;

        Ok((
            StoredSnapshot {
                id,
                is_current: true,
                snapshot: snapshot.clone(),
            },
            stored_alerts,
        ))
    })
}

/// Inserts a snapshot as the current one for its listing.
pub fn insert_snapshot(tx: &Connection, snapshot: &AnalysisSnapshot) -> Result<i64, ServerError> {
    let document = serde_json::to_string(snapshot)?;

    tx.execute(
        "UPDATE snapshots SET is_current = 0 WHERE listing_id = ?1 AND is_current = 1",
        params![&snapshot.listing_id],
    )?;

    tx.execute(
        r#"
        INSERT INTO snapshots (
            listing_id, listing_name, captured_at, is_current, competitor_count,
            price_avg, rating_avg, target_price, suggested_price, document
        ) VALUES (?1, ?2, ?3, 1, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            &snapshot.listing_id,
            &snapshot.target.name,
            snapshot.captured_at,
            snapshot.competitors.len() as i64,
            snapshot.stats.price_avg,
            snapshot.stats.rating_avg,
            snapshot.target.price,
            snapshot.recommendations.pricing.suggested_price,
            document,
        ],
    )?;

    Ok(tx.last_insert_rowid())
}

fn stored_from_row(row: &Row) -> rusqlite::Result<StoredSnapshot> {
    let document: String = row.get("document")?;
    let snapshot: AnalysisSnapshot = serde_json::from_str(&document)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

    Ok(StoredSnapshot {
        id: row.get("id")?,
        is_current: row.get("is_current")?,
        snapshot,
    })
}

fn summary_from_row(row: &Row) -> rusqlite::Result<SnapshotSummary> {
    Ok(SnapshotSummary {
        id: row.get("id")?,
        listing_id: row.get("listing_id")?,
        listing_name: row.get("listing_name")?,
        captured_at: row.get("captured_at")?,
        is_current: row.get("is_current")?,
        competitor_count: row.get("competitor_count")?,
        price_avg: row.get("price_avg")?,
        rating_avg: row.get("rating_avg")?,
        target_price: row.get("target_price")?,
        suggested_price: row.get("suggested_price")?,
    })
}

pub fn get_current_snapshot(
    conn: &Connection,
    listing_id: &str,
) -> Result<Option<StoredSnapshot>, ServerError> {
    conn.query_row(
        "SELECT id, is_current, document FROM snapshots WHERE listing_id = ?1 AND is_current = 1",
        params![listing_id],
        stored_from_row,
    )
    .optional()
    .map_err(|e| ServerError::DbError(e.to_string()))
}

/// Snapshot history for one listing, newest first.
pub fn list_snapshot_summaries(
    conn: &Connection,
    listing_id: &str,
    limit: i64,
) -> Result<Vec<SnapshotSummary>, ServerError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SUMMARY_COLUMNS} FROM snapshots WHERE listing_id = ?1 ORDER BY captured_at DESC, id DESC LIMIT ?2"
    ))?;
    let rows = stmt.query_map(params![listing_id, limit], summary_from_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Every listing with a current snapshot, most recently analyzed first.
pub fn list_tracked_listings(conn: &Connection) -> Result<Vec<SnapshotSummary>, ServerError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SUMMARY_COLUMNS} FROM snapshots WHERE is_current = 1 ORDER BY captured_at DESC"
    ))?;
    let rows = stmt.query_map([], summary_from_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn tracked_listing_ids(conn: &Connection) -> Result<Vec<String>, ServerError> {
    let mut stmt =
        conn.prepare("SELECT listing_id FROM snapshots WHERE is_current = 1 ORDER BY listing_id")?;
    let rows = stmt.query_map([], |row| row.get(0))?;

    let mut ids = Vec::new();
    for id in rows {
        ids.push(id?);
    }
    Ok(ids)
}
