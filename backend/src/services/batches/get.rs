use crate::config::Config;
use crate::db::Database;
use crate::error::AppError;
use crate::services::batches::query::find_batch;
use actix_web::{web, HttpResponse, Responder};

pub async fn process(
    id: web::Path<String>,
    db: web::Data<Database>,
    config: web::Data<Config>,
) -> impl Responder {
    let id = id.into_inner();
    let result = db
        .run(move |conn| {
            find_batch(conn, &id)?.ok_or_else(|| AppError::NotFound(format!("Batch {}", id)))
        })
        .await;
    match result {
        Ok(batch) => HttpResponse::Ok().json(batch),
        Err(e) => e.to_response(config.expose_error_details),
    }
}
