use std::io;
use thiserror::Error;

/// Errors reading message rows or writing the tally snapshot
#[derive(Error, Debug)]
pub enum IoError {
    #[error("Failed to read message row: {0}")]
    Read(#[from] csv_async::Error),

    #[error("Failed to encode snapshot: {0}")]
    Write(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Row has no key")]
    MissingKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_display() {
        assert_eq!(IoError::MissingKey.to_string(), "Row has no key");
    }

    #[test]
    fn io_error_keeps_its_message() {
        let err = IoError::from(io::Error::new(io::ErrorKind::NotFound, "messages.csv"));

        assert!(matches!(err, IoError::Io(_)));
        assert_eq!(err.to_string(), "IO error: messages.csv");
    }
}
