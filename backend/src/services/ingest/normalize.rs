use common::model::record::Payload;
use log::warn;
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;

/// Coerces one row into a plain JSON object.
///
/// The row is serialized into a `serde_json::Value`; whatever JSON cannot express is
/// lost on the way (non-finite floats become `null`). Rows that are not objects, or that
/// fail to serialize at all, become an empty payload instead of failing the ingest.
pub fn normalize_row<T: Serialize + ?Sized>(row: &T) -> Payload {
    match serde_json::to_value(row) {
        Ok(Value::Object(map)) => map,
        Ok(Value::Null) => Payload::new(),
        Ok(other) => {
            warn!("Row is not an object ({}), storing it empty", json_kind(&other));
            Payload::new()
        }
        Err(e) => {
            warn!("Row could not be normalized, storing it empty: {}", e);
            Payload::new()
        }
    }
}

/// Normalizes every row, keeping the input order.
pub fn normalize_rows(rows: &[Value]) -> Vec<Payload> {
    rows.par_iter().map(normalize_row::<Value>).collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
