use crate::model::record::Payload;
use serde::{Deserialize, Serialize};

/// How many rows the upload step echoes back as a preview.
pub const PREVIEW_ROWS: usize = 5;

/// Result of parsing an uploaded file, before anything is stored.
///
/// The client shows `columns` and `preview`, lets the user pick a batch name and then
/// sends `data` back through the save endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedUpload {
    pub columns: Vec<String>,
    pub preview: Vec<Payload>,
    pub total_rows: usize,
    pub data: Vec<Payload>,
}

impl ParsedUpload {
    pub fn new(columns: Vec<String>, data: Vec<Payload>) -> Self {
        let preview = data.iter().take(PREVIEW_ROWS).cloned().collect();
        Self {
            columns,
            preview,
            total_rows: data.len(),
            data,
        }
    }
}
