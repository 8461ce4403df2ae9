use crate::config::Config;
use crate::error::AppError;
use crate::services::upload::parser::{parse_tabular, SourceFormat};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use common::model::upload::ParsedUpload;
use futures_util::StreamExt;
use log::info;

/// HTTP handler wrapper that converts the parse result to an `HttpResponse`.
///
/// - On success: `200 OK` with the `ParsedUpload` as JSON.
/// - On failure: the `AppError` status with a JSON error body.
pub async fn process(payload: Multipart, config: web::Data<Config>) -> impl Responder {
    match upload_file(payload, config.upload_limit_bytes).await {
        Ok(parsed) => HttpResponse::Ok().json(parsed),
        Err(e) => e.to_response(config.expose_error_details),
    }
}

fn multipart_error(e: impl std::fmt::Display) -> AppError {
    AppError::InvalidPayload(format!("Malformed multipart body: {}", e))
}

/// Reads the `file` field of the multipart body and parses it into rows.
///
/// Other fields are drained and ignored. The extension is checked before the body is
/// buffered, and buffering stops with an error once `limit` bytes are exceeded.
pub async fn upload_file(mut payload: Multipart, limit: usize) -> Result<ParsedUpload, AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(multipart_error)?;
        let field_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        if field_name.as_deref() != Some("file") {
            while let Some(chunk) = field.next().await {
                chunk.map_err(multipart_error)?;
            }
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .unwrap_or_default();
        SourceFormat::from_filename(&filename)?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(multipart_error)?;
            if bytes.len() + chunk.len() > limit {
                return Err(AppError::InvalidPayload(format!(
                    "Uploaded file exceeds the {} byte limit",
                    limit
                )));
            }
            bytes.extend_from_slice(&chunk);
        }
        upload = Some((filename, bytes));
    }

    let (filename, bytes) =
        upload.ok_or_else(|| AppError::InvalidPayload("No file uploaded".to_string()))?;
    let size = bytes.len();

    let name = filename.clone();
    let table = web::block(move || parse_tabular(&bytes, &name)).await??;
    info!(
        "Parsed upload '{}' ({} bytes): {} columns, {} rows",
        filename,
        size,
        table.columns.len(),
        table.rows.len()
    );

    Ok(ParsedUpload::new(table.columns, table.rows))
}
