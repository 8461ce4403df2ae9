use crate::config::Config;
use crate::db::Database;
use crate::error::AppError;
use crate::services::ingest::normalize::normalize_rows;
use crate::services::ingest::required;
use crate::services::ingest::store::{insert_batch, insert_records};
use actix_web::{web, HttpResponse, Responder};
use common::requests::SaveRequest;
use common::responses::SaveResponse;
use log::info;
use rusqlite::Connection;

pub async fn process(
    db: web::Data<Database>,
    config: web::Data<Config>,
    payload: web::Json<SaveRequest>,
) -> impl Responder {
    let req = payload.into_inner();
    match db.run(move |conn| save_batch(conn, req)).await {
        Ok(resp) => HttpResponse::Ok().json(resp),
        Err(e) => e.to_response(config.expose_error_details),
    }
}

/// Creates one batch holding every row of `req`, atomically.
pub fn save_batch(conn: &mut Connection, req: SaveRequest) -> Result<SaveResponse, AppError> {
    let filename = required(req.filename, "filename")?;
    let name = required(req.name, "name")?;
    let rows = match req.data {
        Some(rows) if !rows.is_empty() => rows,
        _ => {
            return Err(AppError::InvalidPayload(
                "Invalid payload: data must be a non-empty array".to_string(),
            ))
        }
    };

    let normalized = normalize_rows(&rows);

    let tx = conn.transaction()?;
    let batch = insert_batch(&tx, &filename, &name)?;
    let inserted = insert_records(&tx, &batch.id, &normalized)?;
    tx.commit()?;

    info!(
        "Saved batch {} ('{}' from {}) with {} records",
        batch.id, batch.name, batch.filename, inserted
    );
    Ok(SaveResponse {
        success: true,
        batch_id: batch.id,
    })
}
