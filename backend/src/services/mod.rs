//! HTTP surface of the ingest, query and export pipeline.
//!
//! Each area returns its `Scope` from `configure_routes`, mounted with `.service(...)`:
//!
//! - `upload`: parse an uploaded CSV/spreadsheet into rows (nothing stored).
//! - `ingest`: save parsed rows as a batch, in one request or in chunks.
//! - `records`: page, search, edit and delete stored rows.
//! - `batches`: list, inspect and delete whole batches.
//! - `export`: download a batch as CSV or XLSX.

use crate::error::AppError;
use actix_web::web;

/// Builds an in-memory test application with every route registered.
#[cfg(test)]
macro_rules! test_app {
    () => {
        crate::services::test_app!(crate::config::Config::default())
    };
    ($config:expr) => {{
        let config = actix_web::web::Data::new($config);
        let database = actix_web::web::Data::new(
            crate::db::Database::open_in_memory().expect("in-memory database"),
        );
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(crate::services::json_config(config.json_limit_bytes))
                .app_data(crate::services::query_config())
                .app_data(database)
                .app_data(config)
                .service(crate::services::upload::configure_routes())
                .service(crate::services::ingest::configure_chunk_routes())
                .service(crate::services::ingest::configure_routes())
                .service(crate::services::records::configure_routes())
                .service(crate::services::batches::configure_routes())
                .service(crate::services::export::configure_routes()),
        )
        .await
    }};
}
#[cfg(test)]
pub(crate) use test_app;

pub mod batches;
pub mod export;
pub mod ingest;
pub mod records;
pub mod upload;

/// JSON extractor settings: body size limit and errors in the API's JSON shape.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            AppError::InvalidPayload(format!("Invalid JSON body: {}", err)).into()
        })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::InvalidPayload(format!("Invalid query string: {}", err)).into()
    })
}
