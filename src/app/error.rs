use std::io;
use thiserror::Error;

use crate::io::IoError;
use crate::processor::{BuildError, ProcessError};

/// Top-level application errors unifying all layer errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV IO error: {0}")]
    CsvIo(#[from] IoError),

    #[error("Pipeline setup error: {0}")]
    Build(#[from] BuildError),

    #[error("Pipeline error: {0}")]
    Process(#[from] ProcessError),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
