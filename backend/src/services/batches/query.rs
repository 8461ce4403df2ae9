use common::model::batch::{BatchSummary, UploadBatch};
use rusqlite::{params, Connection, OptionalExtension, Row};

const SUMMARY_SELECT: &str = "
SELECT b.id, b.name, b.filename, b.created_at,
       (SELECT COUNT(*) FROM audit_records r WHERE r.upload_batch_id = b.id)
FROM upload_batches b";

fn summary_from_row(row: &Row) -> rusqlite::Result<BatchSummary> {
    let record_count: i64 = row.get(4)?;
    Ok(BatchSummary {
        batch: UploadBatch {
            id: row.get(0)?,
            name: row.get(1)?,
            filename: row.get(2)?,
            created_at: row.get(3)?,
        },
        record_count: record_count.max(0) as u64,
    })
}

pub fn list_batches(conn: &Connection) -> rusqlite::Result<Vec<BatchSummary>> {
    let mut stmt = conn.prepare(&format!(
        "{} ORDER BY b.created_at DESC, b.rowid DESC",
        SUMMARY_SELECT
    ))?;
    let batches: rusqlite::Result<Vec<BatchSummary>> =
        stmt.query_map([], summary_from_row)?.collect();
    batches
}

pub fn find_batch(conn: &Connection, id: &str) -> rusqlite::Result<Option<BatchSummary>> {
    conn.query_row(
        &format!("{} WHERE b.id = ?1", SUMMARY_SELECT),
        params![id],
        summary_from_row,
    )
    .optional()
}

pub fn batch_exists(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM upload_batches WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )
}
