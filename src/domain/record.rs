use serde::Serialize;

use super::error::DomainError;

/// Input record: a routing key and an opaque payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub key: String,
    pub payload: String,
}

impl MessageRecord {
    pub fn new(key: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            payload: payload.into(),
        }
    }

    /// Validate the record and reduce it to what the tally sink needs
    pub fn to_keyed(&self) -> Result<KeyedPayload, DomainError> {
        let key = self.key.trim();
        if key.is_empty() {
            return Err(DomainError::EmptyKey);
        }
        Ok(KeyedPayload {
            key: key.to_string(),
            bytes: self.payload.len() as u64,
        })
    }
}

/// Validated record carrying its key and payload size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedPayload {
    pub key: String,
    pub bytes: u64,
}

/// Per-key aggregate kept by the tally store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub messages: u64,
    pub bytes: u64,
}

impl Tally {
    pub fn record(&mut self, bytes: u64) {
        self.messages += 1;
        self.bytes = self.bytes.saturating_add(bytes);
    }
}
