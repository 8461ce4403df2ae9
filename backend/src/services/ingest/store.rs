//! Insert statements shared by both save paths. Callers own the transaction.

use crate::error::AppError;
use chrono::Utc;
use common::model::batch::UploadBatch;
use common::model::record::Payload;
use rusqlite::{params, Connection};
use uuid::Uuid;

pub fn insert_batch(
    conn: &Connection,
    filename: &str,
    name: &str,
) -> Result<UploadBatch, AppError> {
    let batch = UploadBatch {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        filename: filename.to_string(),
        created_at: Utc::now(),
    };
    conn.execute(
        "INSERT INTO upload_batches (id, name, filename, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![batch.id, batch.name, batch.filename, batch.created_at],
    )?;
    Ok(batch)
}

/// Inserts `rows` under `batch_id` in slice order.
///
/// Every record of one call shares a `created_at`; the `seq` column keeps them ordered.
pub fn insert_records(
    conn: &Connection,
    batch_id: &str,
    rows: &[Payload],
) -> Result<usize, AppError> {
    let created_at = Utc::now();
    let mut stmt = conn.prepare_cached(
        "INSERT INTO audit_records (id, upload_batch_id, data, created_at) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for row in rows {
        let data = encode_payload(row)?;
        stmt.execute(params![Uuid::new_v4().to_string(), batch_id, data, created_at])?;
    }
    Ok(rows.len())
}

pub fn encode_payload(payload: &Payload) -> Result<String, AppError> {
    serde_json::to_string(payload)
        .map_err(|e| AppError::Internal(format!("failed to encode payload: {}", e)))
}
