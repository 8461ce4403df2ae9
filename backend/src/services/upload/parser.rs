//! Turns uploaded bytes into row objects plus the ordered list of column names.
//!
//! The decoder is picked from the file extension only: `.csv` goes through the `csv`
//! crate, workbook extensions through `calamine` (first sheet only). Nothing is stored
//! here.

use crate::error::AppError;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use common::model::record::Payload;
use serde_json::{Number, Value};
use std::collections::HashSet;
use std::fmt::Display;
use std::io::Cursor;
use std::path::Path;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Name given to blank spreadsheet header cells.
const EMPTY_HEADER: &str = "__EMPTY";

/// Largest integer an `f64` holds exactly (2^53).
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Delimited,
    Spreadsheet,
}

impl SourceFormat {
    pub fn from_filename(filename: &str) -> Result<Self, AppError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(SourceFormat::Delimited),
            Some("xlsx") | Some("xls") | Some("xlsm") | Some("ods") => {
                Ok(SourceFormat::Spreadsheet)
            }
            _ => Err(AppError::UnsupportedFormat(format!(
                "Unsupported file format: '{}'",
                filename
            ))),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParsedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Payload>,
}

pub fn parse_tabular(bytes: &[u8], filename: &str) -> Result<ParsedTable, AppError> {
    match SourceFormat::from_filename(filename)? {
        SourceFormat::Delimited => parse_delimited(bytes),
        SourceFormat::Spreadsheet => parse_spreadsheet(bytes),
    }
}

fn malformed(e: impl Display) -> AppError {
    AppError::InvalidPayload(format!("Failed to read file: {}", e))
}

/// Renames repeated header names to `name_1`, `name_2`, ... so every column is distinct.
fn distinct_columns<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for name in names {
        let mut candidate = name.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}_{}", name, suffix);
            suffix += 1;
        }
        seen.insert(candidate.clone());
        columns.push(candidate);
    }
    columns
}

fn parse_delimited(bytes: &[u8]) -> Result<ParsedTable, AppError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers().map_err(malformed)?;
    let columns = distinct_columns(headers.iter().map(str::to_string));

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(malformed)?;
        // Only an empty line is skipped; a row of empty cells such as `,,` is kept.
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        // Short rows simply lack the trailing keys; extra cells have no column to go to.
        let row: Payload = columns
            .iter()
            .zip(record.iter())
            .map(|(column, cell)| (column.clone(), Value::String(cell.to_string())))
            .collect();
        rows.push(row);
    }

    Ok(ParsedTable { columns, rows })
}

fn parse_spreadsheet(bytes: &[u8]) -> Result<ParsedTable, AppError> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(malformed)?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(malformed)?,
        None => return Ok(ParsedTable::default()),
    };

    let mut sheet_rows = range.rows();
    let header = match sheet_rows.next() {
        Some(header) => header,
        None => return Ok(ParsedTable::default()),
    };

    let columns = distinct_columns(header.iter().map(|cell| {
        let name = cell.to_string();
        if name.trim().is_empty() {
            EMPTY_HEADER.to_string()
        } else {
            name
        }
    }));

    let mut rows = Vec::new();
    for cells in sheet_rows {
        let row: Payload = columns
            .iter()
            .zip(cells)
            .filter_map(|(column, cell)| cell_value(cell).map(|v| (column.clone(), v)))
            .collect();
        if !row.is_empty() {
            rows.push(row);
        }
    }

    Ok(ParsedTable { columns, rows })
}

fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(Value::String(s.clone())),
        Data::Int(i) => Some(Value::from(*i)),
        Data::Float(f) => number_value(*f),
        Data::Bool(b) => Some(Value::Bool(*b)),
        // Dates keep their serial number, as the raw cell value.
        Data::DateTime(dt) => number_value(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Value::String(s.clone())),
        other => Some(Value::String(other.to_string())),
    }
}

/// Whole floats become integers so `15000.0` reads back as `15000`.
fn number_value(f: f64) -> Option<Value> {
    if f.fract() == 0.0 && f.abs() < MAX_EXACT_FLOAT_INT {
        Some(Value::from(f as i64))
    } else {
        Number::from_f64(f).map(Value::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use serde_json::json;

    #[test]
    fn picks_decoder_from_extension() {
        assert_eq!(
            SourceFormat::from_filename("q1.csv").unwrap(),
            SourceFormat::Delimited
        );
        assert_eq!(
            SourceFormat::from_filename("Q1.XLSX").unwrap(),
            SourceFormat::Spreadsheet
        );
        assert_eq!(
            SourceFormat::from_filename("legacy.xls").unwrap(),
            SourceFormat::Spreadsheet
        );
        assert!(matches!(
            SourceFormat::from_filename("notes.txt"),
            Err(AppError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            SourceFormat::from_filename("no_extension"),
            Err(AppError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn parses_csv_with_header() {
        let csv = "TxnID,Amount\nTXN001,15000\nTXN002,8500\nTXN003,22000\n";
        let table = parse_tabular(csv.as_bytes(), "q1.csv").unwrap();

        assert_eq!(table.columns, vec!["TxnID", "Amount"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0]["TxnID"], json!("TXN001"));
        assert_eq!(table.rows[2]["Amount"], json!("22000"));
        let keys: Vec<&String> = table.rows[1].keys().collect();
        assert_eq!(keys, vec!["TxnID", "Amount"]);
    }

    #[test]
    fn skips_empty_lines_and_strips_bom() {
        let csv = "\u{feff}Name,Dept\r\nAna,HR\r\n\r\n\r\nLuis,IT\r\n";
        let table = parse_tabular(csv.as_bytes(), "people.csv").unwrap();

        assert_eq!(table.columns, vec!["Name", "Dept"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1]["Name"], json!("Luis"));
    }

    #[test]
    fn rows_of_empty_cells_are_kept() {
        let csv = "Name,Dept\nAna,HR\n,\n , \nLuis,IT\n";
        let table = parse_tabular(csv.as_bytes(), "people.csv").unwrap();

        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.rows[1]["Name"], json!(""));
        assert_eq!(table.rows[1]["Dept"], json!(""));
        assert_eq!(table.rows[2]["Name"], json!(" "));
        assert_eq!(table.rows[3]["Name"], json!("Luis"));
    }

    #[test]
    fn short_rows_omit_missing_keys() {
        let csv = "a,b,c\n1,2\n";
        let table = parse_tabular(csv.as_bytes(), "short.csv").unwrap();
        assert_eq!(table.rows[0].len(), 2);
        assert!(table.rows[0].get("c").is_none());
    }

    #[test]
    fn duplicate_headers_become_distinct() {
        let csv = "Amount,Amount,Amount\n1,2,3\n";
        let table = parse_tabular(csv.as_bytes(), "dup.csv").unwrap();
        assert_eq!(table.columns, vec!["Amount", "Amount_1", "Amount_2"]);
        assert_eq!(table.rows[0]["Amount_2"], json!("3"));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let bytes = b"name\n\xff\xfe\n";
        assert!(matches!(
            parse_tabular(bytes, "bad.csv"),
            Err(AppError::InvalidPayload(_))
        ));
    }

    #[test]
    fn garbage_workbook_is_rejected() {
        assert!(matches!(
            parse_tabular(b"definitely not a zip", "book.xlsx"),
            Err(AppError::InvalidPayload(_))
        ));
    }

    #[test]
    fn parses_first_sheet_of_workbook() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Transaction ID").unwrap();
        sheet.write_string(0, 1, "Amount").unwrap();
        sheet.write_string(0, 2, "Approved").unwrap();
        sheet.write_string(1, 0, "TXN001").unwrap();
        sheet.write_number(1, 1, 15000.0).unwrap();
        sheet.write_boolean(1, 2, true).unwrap();
        // Row 2 left blank on purpose.
        sheet.write_string(3, 0, "TXN002").unwrap();
        sheet.write_number(3, 1, 8500.5).unwrap();

        let other = workbook.add_worksheet();
        other.write_string(0, 0, "ignored").unwrap();

        let bytes = workbook.save_to_buffer().unwrap();
        let table = parse_tabular(&bytes, "audit.xlsx").unwrap();

        assert_eq!(table.columns, vec!["Transaction ID", "Amount", "Approved"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["Amount"], json!(15000));
        assert_eq!(table.rows[0]["Approved"], json!(true));
        assert_eq!(table.rows[1]["Amount"], json!(8500.5));
        assert!(table.rows[1].get("Approved").is_none());
    }

    #[test]
    fn blank_spreadsheet_headers_get_placeholder_names() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Name").unwrap();
        sheet.write_string(0, 2, "Dept").unwrap();
        sheet.write_string(0, 3, " ").unwrap();
        sheet.write_string(1, 0, "Ana").unwrap();
        sheet.write_string(1, 1, "x").unwrap();
        sheet.write_string(1, 3, "y").unwrap();

        let bytes = workbook.save_to_buffer().unwrap();
        let table = parse_tabular(&bytes, "blank.xlsx").unwrap();

        assert_eq!(table.columns, vec!["Name", "__EMPTY", "Dept", "__EMPTY_1"]);
        assert_eq!(table.rows[0]["__EMPTY"], json!("x"));
        assert_eq!(table.rows[0]["__EMPTY_1"], json!("y"));
    }

    #[test]
    fn whole_floats_become_integers() {
        assert_eq!(number_value(3.0), Some(json!(3)));
        assert_eq!(number_value(-2.5), Some(json!(-2.5)));
        assert_eq!(number_value(f64::NAN), None);
    }
}
