use crate::domain::alert::{Alert, AlertType, NewAlert, Severity};
use crate::errors::ServerError;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::str::FromStr;

const ALERT_COLUMNS: &str = "id, listing_id, competitor_id, alert_type, severity, title, message, \
     previous_value, current_value, change_percent, is_read, created_at";

fn parse_text<T: FromStr<Err = String>>(idx: usize, raw: String) -> rusqlite::Result<T> {
    T::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())
    })
}

fn alert_from_row(row: &Row) -> rusqlite::Result<Alert> {
    Ok(Alert {
        id: row.get("id")?,
        listing_id: row.get("listing_id")?,
        competitor_id: row.get("competitor_id")?,
        alert_type: parse_text::<AlertType>(3, row.get("alert_type")?)?,
        severity: parse_text::<Severity>(4, row.get("severity")?)?,
        title: row.get("title")?,
        message: row.get("message")?,
        previous_value: row.get("previous_value")?,
        current_value: row.get("current_value")?,
        change_percent: row.get("change_percent")?,
        is_read: row.get("is_read")?,
        created_at: row.get("created_at")?,
    })
}

/// Inserts alerts in order and returns them as stored. Runs inside the caller's transaction.
pub fn insert_alerts(
    conn: &Connection,
    alerts: &[NewAlert],
    created_at: DateTime<Utc>,
) -> Result<Vec<Alert>, ServerError> {
    let mut stmt = conn.prepare(
        r#"
        INSERT INTO alerts (
            listing_id, competitor_id, alert_type, severity, title, message,
            previous_value, current_value, change_percent, is_read, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, ?10)
        "#,
    )?;

    let mut stored = Vec::with_capacity(alerts.len());
    for a in alerts {
        stmt.execute(params![
            &a.listing_id,
            &a.competitor_id,
            a.alert_type.as_str(),
            a.severity.as_str(),
            &a.title,
            &a.message,
            &a.previous_value,
            &a.current_value,
            a.change_percent,
            created_at,
        ])?;

        stored.push(Alert {
            id: conn.last_insert_rowid(),
            listing_id: a.listing_id.clone(),
            competitor_id: a.competitor_id.clone(),
            alert_type: a.alert_type,
            severity: a.severity,
            title: a.title.clone(),
            message: a.message.clone(),
            previous_value: a.previous_value.clone(),
            current_value: a.current_value.clone(),
            change_percent: a.change_percent,
            is_read: false,
            created_at,
        });
    }

    Ok(stored)
}

/// Alerts for a listing, newest first.
pub fn list_alerts(
    conn: &Connection,
    listing_id: &str,
    unread_only: bool,
    limit: i64,
) -> Result<Vec<Alert>, ServerError> {
    let sql = if unread_only {
        format!(
            "SELECT {ALERT_COLUMNS} FROM alerts WHERE listing_id = ?1 AND is_read = 0 \
             ORDER BY created_at DESC, id DESC LIMIT ?2"
        )
    } else {
        format!(
            "SELECT {ALERT_COLUMNS} FROM alerts WHERE listing_id = ?1 \
             ORDER BY created_at DESC, id DESC LIMIT ?2"
        )
    };

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![listing_id, limit], alert_from_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn get_alert(conn: &Connection, alert_id: i64) -> Result<Option<Alert>, ServerError> {
    conn.query_row(
        &format!("SELECT {ALERT_COLUMNS} FROM alerts WHERE id = ?1"),
        params![alert_id],
        alert_from_row,
    )
    .optional()
    .map_err(|e| ServerError::DbError(e.to_string()))
}

/// Returns false when no alert has this id. Marking twice is fine.
pub fn mark_alert_read(conn: &Connection, alert_id: i64) -> Result<bool, ServerError> {
    let n = conn.execute("UPDATE alerts SET is_read = 1 WHERE id = ?1", params![alert_id])?;
    Ok(n > 0)
}

/// Marks every unread alert of a listing; returns how many changed.
pub fn mark_all_read(conn: &Connection, listing_id: &str) -> Result<usize, ServerError> {
    let n = conn.execute(
        "UPDATE alerts SET is_read = 1 WHERE listing_id = ?1 AND is_read = 0",
        params![listing_id],
    )?;
    Ok(n)
}

pub fn count_unread(conn: &Connection, listing_id: &str) -> Result<i64, ServerError> {
    let n = conn.query_row(
        "SELECT COUNT(*) FROM alerts WHERE listing_id = ?1 AND is_read = 0",
        params![listing_id],
        |r| r.get(0),
    )?;
    Ok(n)
}
