//! Encoding of the item list to and from its persisted JSON form.

use super::errors::SnapshotError;
use crate::domain::Item;
use serde_json::Value;
use tracing::warn;

/// Storage key under which the item list is kept.
pub const ITEMS_KEY: &str = "items";

pub fn encode_items(items: &[Item]) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(items)?)
}

/// Decodes a stored snapshot.
///
/// A missing entry and a JSON `null` both mean "no items yet".
pub fn decode_items(payload: Option<&str>) -> Result<Vec<Item>, SnapshotError> {
    let Some(payload) = payload else {
        return Ok(Vec::new());
    };

    match serde_json::from_str::<Value>(payload)? {
        Value::Null => Ok(Vec::new()),
        value @ Value::Array(_) => Ok(serde_json::from_value(value)?),
        _ => Err(SnapshotError::NotAnArray),
    }
}

/// Like [`decode_items`], but an unreadable snapshot yields an empty list.
pub fn load_items(payload: Option<&str>) -> Vec<Item> {
    match decode_items(payload) {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "stored items are unreadable, starting with an empty list");
            Vec::new()
        }
    }
}
