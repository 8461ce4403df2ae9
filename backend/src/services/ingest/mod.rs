//! Persists parsed rows as an upload batch and its audit records.
//!
//! - `POST /api/save`: the whole file in one request. The batch and every record are
//!   written in a single transaction, so a failure leaves nothing behind.
//! - `POST /api/save-chunk`: one slice of at most `max_chunk_rows` rows. The first
//!   call (no `batchId`) creates the batch; later calls append to it. Each call is its
//!   own transaction, so an interrupted upload keeps the chunks committed so far and
//!   the client decides whether to retry or delete the batch.
//!
//! Both paths run every row through `normalize` before storage.

use crate::error::AppError;
use actix_web::web::{post, scope};
use actix_web::Scope;

pub mod normalize;
mod save;
mod save_chunk;
pub mod store;

const SAVE_PATH: &str = "/api/save";
const SAVE_CHUNK_PATH: &str = "/api/save-chunk";

/// Chunk size clients are expected to use for `/api/save-chunk`.
pub const DEFAULT_CHUNK_ROWS: usize = 500;

/// Scope for the single-shot save.
pub fn configure_routes() -> Scope {
    scope(SAVE_PATH)
        // Route to store a whole parsed file as one batch.
        .route("", post().to(save::process))
}

/// Scope for the chunked save.
pub fn configure_chunk_routes() -> Scope {
    scope(SAVE_CHUNK_PATH)
        // Route to create a batch or append one chunk of rows to it.
        .route("", post().to(save_chunk::process))
}

/// A present, non-blank string field.
fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::InvalidPayload(format!("Invalid payload: missing {}", field)))
}
