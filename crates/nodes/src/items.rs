//! Items — the unit of data flowing between nodes.
//!
//! A node runs its operation once per input item and tags each output item
//! with the index of the input item that produced it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Index of the input item an output item was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedItem {
    pub item: usize,
}

/// One output item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputItem {
    pub json: Value,
    pub paired_item: PairedItem,
}

impl OutputItem {
    pub fn new(json: Value, item: usize) -> Self {
        Self {
            json,
            paired_item: PairedItem { item },
        }
    }

    /// Expand a response payload: arrays yield one item per element, any
    /// other value yields a single item.
    pub fn from_payload(payload: Value, item: usize) -> Vec<Self> {
        match payload {
            Value::Array(values) => values.into_iter().map(|v| Self::new(v, item)).collect(),
            other => vec![Self::new(other, item)],
        }
    }
}

/// Split a node input into items: an array is a list, `null` is empty, and
/// anything else is a single item.
pub fn input_items(input: Value) -> Vec<Value> {
    match input {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn input_shapes() {
        assert!(input_items(Value::Null).is_empty());
        assert_eq!(input_items(json!({ "a": 1 })), vec![json!({ "a": 1 })]);
        assert_eq!(input_items(json!([1, 2])).len(), 2);
    }

    #[test]
    fn payload_array_fans_out() {
        let items = OutputItem::from_payload(json!([{ "id": 1 }, { "id": 2 }]), 3);
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.paired_item.item == 3));
    }

    #[test]
    fn serialises_with_camel_case_pairing() {
        let item = OutputItem::new(json!({ "me": { "id": "1" } }), 0);
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({ "json": { "me": { "id": "1" } }, "pairedItem": { "item": 0 } })
        );
    }
}
