use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Decode result: either the structured record or the raw stored text.
///
/// Undecodable bytes are data, not an error. Foreign or legacy payloads found
/// while scanning a shared namespace surface as [`RecordValue::Opaque`] so the
/// scan keeps going. The untagged serde shape makes an opaque entry serialize
/// as a plain JSON string next to its structured siblings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RecordValue<T> {
    Structured(T),
    Opaque(String),
}

impl<T> RecordValue<T> {
    pub fn as_structured(&self) -> Option<&T> {
        match self {
            RecordValue::Structured(record) => Some(record),
            RecordValue::Opaque(_) => None,
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, RecordValue::Opaque(_))
    }
}

/// Deterministic JSON encoding of a record.
pub fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(record)
}

/// Strict decode, for paths where malformed bytes are a real failure.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Tolerant decode: a failed structured parse degrades to the stored bytes
/// as lossy UTF-8 text.
pub fn decode_tolerant<T: DeserializeOwned>(bytes: &[u8]) -> RecordValue<T> {
    match serde_json::from_slice(bytes) {
        Ok(record) => RecordValue::Structured(record),
        Err(_) => RecordValue::Opaque(String::from_utf8_lossy(bytes).into_owned()),
    }
}
