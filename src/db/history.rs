use crate::domain::history::CompetitorHistoryEntry;
use crate::errors::ServerError;
use rusqlite::{params, Connection};

pub fn append_history(conn: &Connection, entries: &[CompetitorHistoryEntry]) -> Result<(), ServerError> {
    let mut stmt = conn.prepare(
        r#"
        INSERT INTO competitor_history (
            listing_id, competitor_id, competitor_name, recorded_at, price, rating, review_count
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )?;

    for e in entries {
        stmt.execute(params![
            &e.listing_id,
            &e.competitor_id,
            &e.competitor_name,
            e.recorded_at,
            e.price,
            e.rating,
            e.review_count,
        ])?;
    }
    Ok(())
}

/// The newest `limit` history rows for a listing, ordered by competitor, then time.
pub fn list_history(
    conn: &Connection,
    listing_id: &str,
    limit: i64,
) -> Result<Vec<CompetitorHistoryEntry>, ServerError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT listing_id, competitor_id, competitor_name, recorded_at, price, rating, review_count
        FROM (
            SELECT id, listing_id, competitor_id, competitor_name, recorded_at, price, rating, review_count
            FROM competitor_history
            WHERE listing_id = ?1
            ORDER BY recorded_at DESC, id DESC
            LIMIT ?2
        )
        ORDER BY competitor_id, recorded_at, id
        "#,
    )?;

    let rows = stmt.query_map(params![listing_id, limit], |row| {
        Ok(CompetitorHistoryEntry {
            listing_id: row.get(0)?,
            competitor_id: row.get(1)?,
            competitor_name: row.get(2)?,
            recorded_at: row.get(3)?,
            price: row.get(4)?,
            rating: row.get(5)?,
            review_count: row.get(6)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::utils::init_test_db;
    use chrono::{Duration, TimeZone, Utc};

    fn entry(competitor_id: &str, day: i64, price: f64) -> CompetitorHistoryEntry {
        CompetitorHistoryEntry {
            listing_id: "L1".into(),
            competitor_id: competitor_id.into(),
            competitor_name: format!("Competitor {competitor_id}"),
            recorded_at: Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap() + Duration::days(day),
            price: Some(price),
            rating: Some(4.5),
            review_count: 10,
        }
    }

    #[test]
    fn limit_keeps_newest_rows_for_every_competitor() {
        let db = init_test_db();
        db.with_conn(|conn| {
            for day in 0..3 {
                let bump = day as f64 * 10.0;
                append_history(conn, &[entry("a", day, 100.0 + bump), entry("b", day, 200.0 + bump)])?;
            }

            let rows = list_history(conn, "L1", 3)?;
            let got: Vec<(&str, Option<f64>)> = rows
                .iter()
                .map(|r| (r.competitor_id.as_str(), r.price))
                .collect();
            assert_eq!(
                got,
                vec![("a", Some(120.0)), ("b", Some(210.0)), ("b", Some(220.0))]
            );

            assert_eq!(list_history(conn, "L1", 100)?.len(), 6);
            assert!(list_history(conn, "other", 100)?.is_empty());
            Ok(())
        })
        .unwrap();
    }
}
