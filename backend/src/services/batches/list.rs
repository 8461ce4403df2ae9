use crate::config::Config;
use crate::db::Database;
use crate::services::batches::query::list_batches;
use actix_web::{web, HttpResponse, Responder};

pub async fn process(db: web::Data<Database>, config: web::Data<Config>) -> impl Responder {
    match db.run(|conn| Ok(list_batches(conn)?)).await {
        Ok(batches) => HttpResponse::Ok().json(batches),
        Err(e) => e.to_response(config.expose_error_details),
    }
}
