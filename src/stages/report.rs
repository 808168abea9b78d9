use std::time::Duration;

use crate::processor::ProcessError;

/// Outcome of one timed `process` call
#[derive(Debug, Clone)]
pub struct ProcessReport {
    amount: usize,
    duration: Duration,
    error: Option<ProcessError>,
}

impl ProcessReport {
    pub(crate) fn new(amount: usize, duration: Duration, error: Option<ProcessError>) -> Self {
        Self {
            amount,
            duration,
            error,
        }
    }

    /// Number of messages in the processed batch
    pub fn amount(&self) -> usize {
        self.amount
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn error(&self) -> Option<&ProcessError> {
        self.error.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of one timed `flush` call
#[derive(Debug, Clone)]
pub struct FlushReport {
    duration: Duration,
    error: Option<ProcessError>,
}

impl FlushReport {
    pub(crate) fn new(duration: Duration, error: Option<ProcessError>) -> Self {
        Self { duration, error }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn error(&self) -> Option<&ProcessError> {
        self.error.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
