use crate::config::Config;
use crate::db::Database;
use crate::error::AppError;
use crate::services::batches::query::batch_exists;
use actix_web::{web, HttpResponse, Responder};
use common::requests::IdQuery;
use common::responses::SuccessResponse;
use log::info;
use rusqlite::{params, Connection};

pub async fn process(
    query: web::Query<IdQuery>,
    db: web::Data<Database>,
    config: web::Data<Config>,
) -> impl Responder {
    let id = match query.into_inner().id.filter(|id| !id.trim().is_empty()) {
        Some(id) => id,
        None => {
            return AppError::InvalidPayload("Missing id".to_string())
                .to_response(config.expose_error_details)
        }
    };
    match db.run(move |conn| delete_batch(conn, &id)).await {
        Ok(_) => HttpResponse::Ok().json(SuccessResponse::ok()),
        Err(e) => e.to_response(config.expose_error_details),
    }
}

/// Deletes the batch's records, then the batch, in one transaction.
///
/// Returns the number of records removed.
pub fn delete_batch(conn: &mut Connection, id: &str) -> Result<usize, AppError> {
    let tx = conn.transaction()?;
    if !batch_exists(&tx, id)? {
        return Err(AppError::NotFound(format!("Batch {}", id)));
    }
    let removed = tx.execute(
        "DELETE FROM audit_records WHERE upload_batch_id = ?1",
        params![id],
    )?;
    tx.execute("DELETE FROM upload_batches WHERE id = ?1", params![id])?;
    tx.commit()?;

    info!("Deleted batch {} and its {} records", id, removed);
    Ok(removed)
}
