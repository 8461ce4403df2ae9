//! Batch export.
//!
//! - `GET /api/export?batchId=&format=csv|xlsx`: every record of the batch, in ingest
//!   order, rendered as a download. `format` defaults to `csv`.

use actix_web::web::{get, scope};
use actix_web::Scope;

mod download;
pub mod render;

const API_PATH: &str = "/api/export";

/// Configures and returns the Actix scope for batch export.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", get().to(download::process))
}
