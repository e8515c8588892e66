//! Flattening of nested API records into dotted-path rows.

use serde_json::{Map, Value};

/// One observation or forecast point as returned by the API: a tree of
/// field name to scalar or nested object.
pub type RawRecord = Map<String, Value>;

/// Flattens a nested record into a single level, joining nested keys with
/// dots (`wind.speed`, `weather.icon`). Non-object values are copied as-is
/// under their own key. Depth-first in the record's own field order, which
/// `serde_json`'s preserve-order map keeps stable, so the same record always
/// yields the same key sequence.
pub fn flatten(record: &RawRecord) -> RawRecord {
    let mut flat = Map::new();
    flatten_into(record, None, &mut flat);
    flat
}

fn flatten_into(record: &RawRecord, prefix: Option<&str>, out: &mut RawRecord) {
    for (key, value) in record {
        let path = match prefix {
            Some(prefix) => format!("{}.{}", prefix, key),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => flatten_into(nested, Some(&path), out),
            other => {
                out.insert(path, other.clone());
            }
        }
    }
}

/// Column headers for a batch, derived from its first record. Uses the same
/// traversal as [`flatten`], so data rows line up with the header by
/// construction.
pub fn fieldnames(record: &RawRecord) -> Vec<String> {
    flatten(record).keys().cloned().collect()
}

// -- Tests -------------------------------------------------------------------
