//! File upload and parsing.
//!
//! - `POST /api/upload`: multipart/form-data with a `file` field (`.csv`, `.xlsx`,
//!   `.xls`, `.xlsm` or `.ods`). The file is parsed in memory and the response carries
//!   the column names, a five-row preview, the row count and every parsed row. Nothing
//!   is persisted: the client names the batch and sends the rows to the save endpoints.

use actix_web::web::{post, scope};
use actix_web::Scope;

pub mod parser;
mod receive;

const API_PATH: &str = "/api/upload";

/// Configures and returns the Actix scope for file uploads.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        // Route to parse an uploaded file without storing it.
        .route("", post().to(receive::process))
}
