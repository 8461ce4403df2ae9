//! Upload batch routes.
//!
//! - `GET /api/batches`: every batch, newest first, with its record count.
//! - `GET /api/batches/{id}`: one batch, `404` if it does not exist.
//! - `DELETE /api/batches?id=`: removes the batch's records and then the batch.

use actix_web::web::{delete, get, scope};
use actix_web::Scope;

mod delete;
mod get;
mod list;
pub mod query;

const API_PATH: &str = "/api/batches";

/// Configures and returns the Actix scope for upload batch routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        // Route to list every batch with its record count.
        .route("", get().to(list::process))
        // Route to delete a batch and all of its records.
        .route("", delete().to(delete::process))
        // Route to fetch a single batch.
        .route("/{id}", get().to(get::process))
}
