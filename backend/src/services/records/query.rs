use common::model::record::{AuditRecord, Payload};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub const RECORD_COLUMNS: &str = "id, upload_batch_id, data, created_at";

pub fn record_from_row(row: &Row) -> rusqlite::Result<AuditRecord> {
    let data: String = row.get(2)?;
    let data: Payload = serde_json::from_str(&data)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    Ok(AuditRecord {
        id: row.get(0)?,
        upload_batch_id: row.get(1)?,
        data,
        created_at: row.get(3)?,
    })
}

/// Filter shared by the page query and its count, so both always agree.
///
/// `search` is a case-sensitive substring match against the serialized payload
/// text. It is a full scan of the matching rows: no index can serve it.
#[derive(Debug, Default, Clone)]
pub struct RecordFilter {
    pub batch_id: Option<String>,
    pub search: Option<String>,
}

impl RecordFilter {
    pub fn new(batch_id: Option<String>, search: Option<String>) -> Self {
        Self {
            batch_id: batch_id.filter(|id| !id.is_empty()),
            search: search.filter(|s| !s.is_empty()),
        }
    }

    /// `WHERE` clause (empty when unfiltered) and its positional parameters.
    pub fn where_clause(&self) -> (String, Vec<String>) {
        let mut conditions = Vec::new();
        let mut values = Vec::new();
        if let Some(batch_id) = &self.batch_id {
            values.push(batch_id.clone());
            conditions.push(format!("upload_batch_id = ?{}", values.len()));
        }
        if let Some(search) = &self.search {
            values.push(search.clone());
            conditions.push(format!("instr(data, ?{}) > 0", values.len()));
        }
        if conditions.is_empty() {
            (String::new(), values)
        } else {
            (format!("WHERE {}", conditions.join(" AND ")), values)
        }
    }
}

pub fn find_record(conn: &Connection, id: &str) -> rusqlite::Result<Option<AuditRecord>> {
    conn.query_row(
        &format!("SELECT {} FROM audit_records WHERE id = ?1", RECORD_COLUMNS),
        params![id],
        record_from_row,
    )
    .optional()
}

/// Every record of a batch in the order it was ingested.
pub fn records_in_ingest_order(
    conn: &Connection,
    batch_id: &str,
) -> rusqlite::Result<Vec<AuditRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM audit_records WHERE upload_batch_id = ?1 ORDER BY seq ASC",
        RECORD_COLUMNS
    ))?;
    let records: rusqlite::Result<Vec<AuditRecord>> =
        stmt.query_map(params![batch_id], record_from_row)?.collect();
    records
}
