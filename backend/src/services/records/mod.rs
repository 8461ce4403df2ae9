//! Audit record routes.
//!
//! - `GET /api/records?batchId=&page=&limit=&search=`: newest-first page of records,
//!   optionally restricted to one batch and to payloads containing `search`.
//! - `PATCH /api/records`: `{id, data}` replaces the record's whole payload.
//! - `DELETE /api/records?id=`: removes one record.

use actix_web::web::{delete, get, patch, scope};
use actix_web::Scope;

mod delete;
mod list;
pub mod query;
mod update;

const API_PATH: &str = "/api/records";

/// Configures and returns the Actix scope for audit record routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        // Route to page through and search records.
        .route("", get().to(list::process))
        // Route to replace one record's payload.
        .route("", patch().to(update::process))
        // Route to delete one record.
        .route("", delete().to(delete::process))
}
