use crate::config::Config;
use crate::db::Database;
use crate::error::AppError;
use actix_web::{web, HttpResponse, Responder};
use common::requests::IdQuery;
use common::responses::SuccessResponse;
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
    match db.run(move |conn| delete_record(conn, &id)).await {
        Ok(()) => HttpResponse::Ok().json(SuccessResponse::ok()),
        Err(e) => e.to_response(config.expose_error_details),
    }
}

pub fn delete_record(conn: &Connection, id: &str) -> Result<(), AppError> {
    let removed = conn.execute("DELETE FROM audit_records WHERE id = ?1", params![id])?;
    if removed == 0 {
        return Err(AppError::NotFound(format!("Record {}", id)));
    }
    Ok(())
}
