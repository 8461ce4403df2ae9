//! Bodies and query strings accepted by the HTTP API.
//!
//! Every field is optional at the type level so that a missing field surfaces as an
//! `InvalidPayload` error from the handler instead of a generic deserialization failure.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// `POST /api/save`: the whole parsed file in one request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveRequest {
    pub filename: Option<String>,
    pub name: Option<String>,
    pub data: Option<Vec<Value>>,
}

/// `POST /api/save-chunk`: one bounded slice of the parsed file.
///
/// `batch_id` is absent on the first call and carries the id returned by that call on
/// every following one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveChunkRequest {
    pub filename: Option<String>,
    pub name: Option<String>,
    pub rows: Option<Vec<Value>>,
    pub batch_id: Option<String>,
}

/// `GET /api/records` query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsQuery {
    pub batch_id: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub limit: Option<u32>,
    pub search: Option<String>,
}

/// `?page=` with nothing after it means "use the default", not a parse error.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(number) => number.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// `PATCH /api/records`: full replacement of one record's payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRecordRequest {
    pub id: Option<String>,
    pub data: Option<Value>,
}

/// `?id=` query string used by the delete endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

/// `GET /api/export` query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuery {
    pub batch_id: Option<String>,
    pub format: Option<String>,
}
