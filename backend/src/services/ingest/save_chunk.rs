use crate::config::Config;
use crate::db::Database;
use crate::error::AppError;
use crate::services::batches::query::batch_exists;
use crate::services::ingest::normalize::normalize_rows;
use crate::services::ingest::store::{insert_batch, insert_records};
use actix_web::{web, HttpResponse, Responder};
use common::requests::SaveChunkRequest;
use common::responses::SaveResponse;
use log::{debug, info};
use rusqlite::Connection;

pub async fn process(
    db: web::Data<Database>,
    config: web::Data<Config>,
    payload: web::Json<SaveChunkRequest>,
) -> impl Responder {
    let req = payload.into_inner();
    let max_rows = config.max_chunk_rows;
    match db.run(move |conn| save_chunk(conn, req, max_rows)).await {
        Ok(resp) => HttpResponse::Ok().json(resp),
        Err(e) => e.to_response(config.expose_error_details),
    }
}

/// Stores one chunk of rows, creating the batch when `req.batch_id` is absent.
///
/// Batch creation and the chunk's inserts share one transaction. Concurrent calls for
/// the same batch are not serialized beyond what SQLite does; clients send chunks one
/// after another.
pub fn save_chunk(
    conn: &mut Connection,
    req: SaveChunkRequest,
    max_rows: usize,
) -> Result<SaveResponse, AppError> {
    let rows = match req.rows {
        Some(rows) if !rows.is_empty() => rows,
        _ => return Err(AppError::InvalidPayload("No rows provided".to_string())),
    };
    if rows.len() > max_rows {
        return Err(AppError::InvalidPayload(format!(
            "Chunk has {} rows, the limit is {}",
            rows.len(),
            max_rows
        )));
    }

    let normalized = normalize_rows(&rows);

    let tx = conn.transaction()?;
    let batch_id = match req.batch_id.filter(|id| !id.trim().is_empty()) {
        Some(id) => {
            if !batch_exists(&tx, &id)? {
                return Err(AppError::NotFound(format!("Batch {}", id)));
            }
            id
        }
        None => {
            let filename = req
                .filename
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| "unknown".to_string());
            let name = req
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Untitled".to_string());
            let batch = insert_batch(&tx, &filename, &name)?;
            info!("Created batch {} ('{}' from {})", batch.id, name, filename);
            batch.id
        }
    };
    let inserted = insert_records(&tx, &batch_id, &normalized)?;
    tx.commit()?;

    debug!("Stored chunk of {} records in batch {}", inserted, batch_id);
    Ok(SaveResponse {
        success: true,
        batch_id,
    })
}
