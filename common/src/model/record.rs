use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The open-ended column name → value mapping stored for every row.
///
/// `serde_json` is built with `preserve_order`, so keys keep the order in which the
/// columns were first seen in the source file.
pub type Payload = Map<String, Value>;

/// One row of an uploaded table.
///
/// Records never outlive their batch: they are removed individually or together with
/// the batch that owns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// UUID of the record.
    pub id: String,
    /// UUID of the owning `UploadBatch`.
    pub upload_batch_id: String,
    /// The row itself. Edits replace it as a whole.
    pub data: Payload,
    pub created_at: DateTime<Utc>,
}
