use serde::Deserialize;

use super::error::IoError;
use crate::domain::MessageRecord;

/// Raw CSV row as read from input
#[derive(Debug, Deserialize)]
pub struct RawMessageRecord {
    pub key: Option<String>,
    pub payload: Option<String>,
}

impl RawMessageRecord {
    /// Parse this raw row into a [`MessageRecord`]; the payload may be empty
    pub fn parse(self) -> Result<MessageRecord, IoError> {
        let key = self
            .key
            .ok_or_else(|| IoError::MissingKey)?;
        Ok(MessageRecord::new(key, self.payload.unwrap_or_default()))
    }
}
