use crate::config::Config;
use crate::db::Database;
use crate::error::AppError;
use crate::services::ingest::normalize::normalize_row;
use crate::services::ingest::store::encode_payload;
use crate::services::records::query::find_record;
use actix_web::{web, HttpResponse, Responder};
use common::model::record::AuditRecord;
use common::requests::UpdateRecordRequest;
use common::responses::UpdateRecordResponse;
use rusqlite::{params, Connection};
use serde_json::Value;

pub async fn process(
    db: web::Data<Database>,
    config: web::Data<Config>,
    payload: web::Json<UpdateRecordRequest>,
) -> impl Responder {
    let req = payload.into_inner();
    match db.run(move |conn| update_record(conn, req)).await {
        Ok(record) => HttpResponse::Ok().json(UpdateRecordResponse {
            success: true,
            data: record,
        }),
        Err(e) => e.to_response(config.expose_error_details),
    }
}

/// Overwrites a record's payload with `req.data`. Keys absent from `data` are gone
/// afterwards: this is a replacement, not a merge.
pub fn update_record(conn: &Connection, req: UpdateRecordRequest) -> Result<AuditRecord, AppError> {
    let id = req
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::InvalidPayload("Invalid payload: missing id".to_string()))?;
    let data = match req.data {
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(AppError::InvalidPayload(
                "Invalid payload: data must be an object".to_string(),
            ))
        }
        None => {
            return Err(AppError::InvalidPayload(
                "Invalid payload: missing data".to_string(),
            ))
        }
    };

    let payload = normalize_row(&data);
    let changed = conn.execute(
        "UPDATE audit_records SET data = ?1 WHERE id = ?2",
        params![encode_payload(&payload)?, id],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound(format!("Record {}", id)));
    }

    find_record(conn, &id)?.ok_or_else(|| AppError::NotFound(format!("Record {}", id)))
}
