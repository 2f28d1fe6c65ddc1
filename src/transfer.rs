//! Native drag-protocol transfer payloads
//!
//! In native mode the platform carries a key/value store across the drag
//! (the DataTransfer analog). The engine writes a small structured payload
//! under a custom key plus a `text/plain` fallback `"kind:id:index"` for
//! contexts that cannot read custom keys. Extraction tries an ordered list
//! of interpreters and yields `None` on total failure, never an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Custom transfer key for the structured payload
pub const PAYLOAD_KEY: &str = "application/x-dragsort";
/// Interoperability fallback key
pub const TEXT_PLAIN: &str = "text/plain";

/// The payload describing a dragged item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPayload {
    pub kind: String,
    pub id: String,
    pub index: usize,
}

impl TransferPayload {
    /// Encode as the `"kind:id:index"` plain-text form
    pub fn to_plain_text(&self) -> String {
        format!("{}:{}:{}", self.kind, self.id, self.index)
    }

    /// Parse the `"kind:id:index"` form. The id segment may itself contain
    /// colons; kind is the first segment and index the last.
    pub fn from_plain_text(text: &str) -> Option<Self> {
        let (kind, rest) = text.split_once(':')?;
        let (id, index) = rest.rsplit_once(':')?;
        if kind.is_empty() || id.is_empty() {
            return None;
        }
        Some(Self {
            kind: kind.to_string(),
            id: id.to_string(),
            index: index.parse().ok()?,
        })
    }
}

/// Key/value transfer store populated at native drag start
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTransfer {
    entries: BTreeMap<String, String>,
}

impl DataTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_data(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    pub fn get_data(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Write the default payload shape: structured JSON under the custom key,
/// plain-text triplet under `text/plain`.
pub fn write_payload(transfer: &mut DataTransfer, payload: &TransferPayload) {
    match serde_json::to_string(payload) {
        Ok(json) => transfer.set_data(PAYLOAD_KEY, &json),
        Err(e) => tracing::warn!("failed to encode transfer payload: {e}"),
    }
    transfer.set_data(TEXT_PLAIN, &payload.to_plain_text());
}

/// Extract a payload, trying interpreters in order:
/// custom-key JSON, `text/plain` JSON, `text/plain` triplet.
pub fn read_payload(transfer: &DataTransfer) -> Option<TransferPayload> {
    if let Some(json) = transfer.get_data(PAYLOAD_KEY) {
        if let Ok(payload) = serde_json::from_str(json) {
            return Some(payload);
        }
        tracing::debug!("custom-key payload present but unparseable");
    }
    if let Some(text) = transfer.get_data(TEXT_PLAIN) {
        if let Ok(payload) = serde_json::from_str(text) {
            return Some(payload);
        }
        if let Some(payload) = TransferPayload::from_plain_text(text) {
            return Some(payload);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> TransferPayload {
        TransferPayload {
            kind: "card".into(),
            id: "task:42".into(),
            index: 3,
        }
    }

    #[test]
    fn test_write_then_read_custom_key() {
        let mut t = DataTransfer::new();
        write_payload(&mut t, &payload());
        assert_eq!(read_payload(&t), Some(payload()));
    }

    #[test]
    fn test_plain_text_fallback() {
        let mut t = DataTransfer::new();
        t.set_data(TEXT_PLAIN, "card:task:42:3");
        assert_eq!(read_payload(&t), Some(payload()));
    }

    #[test]
    fn test_json_in_text_plain() {
        let mut t = DataTransfer::new();
        t.set_data(TEXT_PLAIN, r#"{"kind":"card","id":"task:42","index":3}"#);
        assert_eq!(read_payload(&t), Some(payload()));
    }

    #[test]
    fn test_total_failure_is_none() {
        let mut t = DataTransfer::new();
        t.set_data(TEXT_PLAIN, "not a payload");
        assert_eq!(read_payload(&t), None);
        assert_eq!(read_payload(&DataTransfer::new()), None);
    }

    #[test]
    fn test_corrupt_custom_key_falls_through() {
        let mut t = DataTransfer::new();
        t.set_data(PAYLOAD_KEY, "{broken json");
        t.set_data(TEXT_PLAIN, "card:task:42:3");
        assert_eq!(read_payload(&t), Some(payload()));
    }

    #[test]
    fn test_plain_text_round_trip_with_colons_in_id() {
        let p = payload();
        assert_eq!(p.to_plain_text(), "card:task:42:3");
        assert_eq!(TransferPayload::from_plain_text("card:task:42:3"), Some(p));
        assert_eq!(TransferPayload::from_plain_text("nope"), None);
        assert_eq!(TransferPayload::from_plain_text("a:b:x"), None);
    }
}
