use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ingested file. Owns zero or more `AuditRecord`s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadBatch {
    /// UUID of the batch, returned to the client after the first save call.
    pub id: String,
    /// Display name chosen by the user before committing the upload.
    pub name: String,
    /// Name of the file the rows were parsed from.
    pub filename: String,
    pub created_at: DateTime<Utc>,
}

/// A batch together with the number of records it currently owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    #[serde(flatten)]
    pub batch: UploadBatch,
    pub record_count: u64,
}
