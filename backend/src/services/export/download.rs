use crate::config::Config;
use crate::db::Database;
use crate::error::AppError;
use crate::services::batches::query::find_batch;
use crate::services::export::render::{render_csv, render_xlsx};
use crate::services::records::query::records_in_ingest_order;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Responder};
use common::model::export::ExportFormat;
use common::model::record::Payload;
use common::requests::ExportQuery;
use log::info;
use rusqlite::Connection;

/// A rendered export, ready to be sent as an attachment.
#[derive(Debug)]
pub struct ExportFile {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

pub async fn process(
    query: web::Query<ExportQuery>,
    db: web::Data<Database>,
    config: web::Data<Config>,
) -> impl Responder {
    let query = query.into_inner();
    match db.run(move |conn| export_batch(conn, query)).await {
        Ok(file) => HttpResponse::Ok()
            .content_type(file.content_type)
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(file.filename)],
            })
            .body(file.bytes),
        Err(e) => e.to_response(config.expose_error_details),
    }
}

/// Loads every record of the batch and renders their payloads in the requested format.
pub fn export_batch(conn: &Connection, query: ExportQuery) -> Result<ExportFile, AppError> {
    let batch_id = query
        .batch_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::InvalidPayload("Batch ID required".to_string()))?;
    let format = match query.format.as_deref().map(str::trim) {
        None | Some("") => ExportFormat::default(),
        Some(format) => format.parse().map_err(AppError::UnsupportedFormat)?,
    };

    let batch = find_batch(conn, &batch_id)?
        .ok_or_else(|| AppError::NotFound(format!("Batch {}", batch_id)))?;
    let rows: Vec<Payload> = records_in_ingest_order(conn, &batch_id)?
        .into_iter()
        .map(|record| record.data)
        .collect();

    let bytes = match format {
        ExportFormat::Csv => render_csv(&rows)?,
        ExportFormat::Xlsx => render_xlsx(&rows)?,
    };
    info!(
        "Exported batch {} as {}: {} rows, {} bytes",
        batch_id,
        format,
        rows.len(),
        bytes.len()
    );

    Ok(ExportFile {
        bytes,
        content_type: format.content_type(),
        filename: download_name(&batch.batch.name, format),
    })
}

/// File name offered to the browser: the batch name reduced to `[A-Za-z0-9_-]`.
fn download_name(batch_name: &str, format: ExportFormat) -> String {
    let stem: String = batch_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_matches('_');
    let stem = if stem.is_empty() { "export" } else { stem };
    format!("{}.{}", stem, format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;
    use crate::services::ingest::store::{insert_batch, insert_records};
    use serde_json::json;

    fn query(batch_id: Option<&str>, format: Option<&str>) -> ExportQuery {
        ExportQuery {
            batch_id: batch_id.map(str::to_string),
            format: format.map(str::to_string),
        }
    }

    #[test]
    fn exports_in_ingest_order_as_csv_by_default() {
        let conn = test_connection();
        let batch = insert_batch(&conn, "q1.csv", "Q1 audit").unwrap();
        let rows: Vec<Payload> = (1..=3)
            .map(|i| {
                json!({"TxnID": format!("TXN00{}", i), "Amount": i * 100})
                    .as_object()
                    .cloned()
                    .unwrap()
            })
            .collect();
        insert_records(&conn, &batch.id, &rows).unwrap();

        let file = export_batch(&conn, query(Some(&batch.id), None)).unwrap();
        assert_eq!(file.content_type, "text/csv; charset=utf-8");
        assert_eq!(file.filename, "Q1_audit.csv");
        let text = String::from_utf8(file.bytes).unwrap();
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec!["TxnID,Amount", "TXN001,100", "TXN002,200", "TXN003,300"]
        );
    }

    #[test]
    fn exports_xlsx() {
        let conn = test_connection();
        let batch = insert_batch(&conn, "q1.csv", "Q1").unwrap();
        insert_records(&conn, &batch.id, &[json!({"a": 1}).as_object().cloned().unwrap()]).unwrap();

        let file = export_batch(&conn, query(Some(&batch.id), Some("xlsx"))).unwrap();
        assert_eq!(file.filename, "Q1.xlsx");
        assert!(file.bytes.starts_with(b"PK"));
    }

    #[test]
    fn validates_batch_and_format() {
        let conn = test_connection();
        let batch = insert_batch(&conn, "q1.csv", "Q1").unwrap();

        assert!(matches!(
            export_batch(&conn, query(None, Some("csv"))),
            Err(AppError::InvalidPayload(_))
        ));
        assert!(matches!(
            export_batch(&conn, query(Some(&batch.id), Some("pdf"))),
            Err(AppError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            export_batch(&conn, query(Some("missing"), Some("csv"))),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn download_names_are_sanitized() {
        assert_eq!(download_name("Q1 / 2024", ExportFormat::Csv), "Q1___2024.csv");
        assert_eq!(download_name("***", ExportFormat::Xlsx), "export.xlsx");
        assert_eq!(download_name("ledger-2024_v2", ExportFormat::Csv), "ledger-2024_v2.csv");
    }
}
