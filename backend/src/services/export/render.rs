//! Serializes payloads back into CSV text or an XLSX workbook.
//!
//! Columns are the union of payload keys in first-seen order, so a batch exports with
//! the column order it was uploaded with.

use crate::error::AppError;
use common::model::record::Payload;
use rust_xlsxwriter::{ColNum, RowNum, Workbook};
use serde_json::Value;
use std::collections::HashSet;

pub const SHEET_NAME: &str = "Data";

pub fn collect_columns(rows: &[Payload]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for key in rows.iter().flat_map(|row| row.keys()) {
        if seen.insert(key.as_str()) {
            columns.push(key.clone());
        }
    }
    columns
}

/// Text of one cell. Nested arrays and objects are written as JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn render_csv(rows: &[Payload]) -> Result<Vec<u8>, AppError> {
    let columns = collect_columns(rows);
    if columns.is_empty() {
        return Ok(Vec::new());
    }

    let csv_error = |e: csv::Error| AppError::Internal(format!("csv writer: {}", e));
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns).map_err(csv_error)?;
    for row in rows {
        writer
            .write_record(
                columns
                    .iter()
                    .map(|column| row.get(column).map(cell_text).unwrap_or_default()),
            )
            .map_err(csv_error)?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("csv writer: {}", e)))
}

pub fn render_xlsx(rows: &[Payload]) -> Result<Vec<u8>, AppError> {
    let columns = collect_columns(rows);
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (c, column) in columns.iter().enumerate() {
        sheet.write_string(0, col_num(c)?, column.as_str())?;
    }

    for (r, row) in rows.iter().enumerate() {
        let r = row_num(r + 1)?;
        for (c, column) in columns.iter().enumerate() {
            let c = col_num(c)?;
            match row.get(column) {
                None | Some(Value::Null) => {}
                Some(Value::Bool(b)) => {
                    sheet.write_boolean(r, c, *b)?;
                }
                Some(Value::Number(n)) => match n.as_f64() {
                    Some(f) => {
                        sheet.write_number(r, c, f)?;
                    }
                    None => {
                        sheet.write_string(r, c, &n.to_string())?;
                    }
                },
                Some(Value::String(s)) => {
                    sheet.write_string(r, c, s.as_str())?;
                }
                Some(other) => {
                    sheet.write_string(r, c, &other.to_string())?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn row_num(index: usize) -> Result<RowNum, AppError> {
    RowNum::try_from(index)
        .map_err(|_| AppError::Internal(format!("row {} is beyond the sheet limit", index)))
}

fn col_num(index: usize) -> Result<ColNum, AppError> {
    ColNum::try_from(index)
        .map_err(|_| AppError::Internal(format!("column {} is beyond the sheet limit", index)))
}
