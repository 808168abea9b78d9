use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::BoxError;

/// Shareable error cause, so a failure can be reported and returned at once
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced while processing or flushing a batch
#[derive(Error, Debug, Clone)]
pub enum ProcessError {
    #[error("Shard key provider failed: {0}")]
    ShardKey(#[source] SharedError),

    #[error("Transform failed: {0}")]
    Transform(#[source] SharedError),

    #[error("Processing failed: {0}")]
    Downstream(#[source] SharedError),

    #[error("{0}")]
    Sharding(ShardFailures),

    #[error("Shard task did not complete: {0}")]
    ShardTask(String),
}

impl ProcessError {
    /// Wrap a terminal processor's own failure
    pub fn downstream(error: impl Into<BoxError>) -> Self {
        Self::Downstream(Arc::from(error.into()))
    }

    pub(crate) fn shard_key(error: BoxError) -> Self {
        Self::ShardKey(Arc::from(error))
    }

    pub(crate) fn transform(error: BoxError) -> Self {
        Self::Transform(Arc::from(error))
    }

    /// Per-shard failures when this is an aggregate sharding error
    pub fn shard_failures(&self) -> Option<&ShardFailures> {
        match self {
            Self::Sharding(failures) => Some(failures),
            _ => None,
        }
    }
}

/// One shard's failed dispatch
#[derive(Debug, Clone)]
pub struct ShardFailure {
    pub shard: usize,
    pub error: ProcessError,
}

/// Aggregate of every shard that failed during a single `process` call,
/// ordered by shard index
#[derive(Debug, Clone)]
pub struct ShardFailures {
    failures: Vec<ShardFailure>,
}

impl ShardFailures {
    pub(crate) fn new(failures: Vec<ShardFailure>) -> Self {
        Self { failures }
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Indices of the shards that failed
    pub fn failed_shards(&self) -> Vec<usize> {
        self.failures.iter().map(|f| f.shard).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShardFailure> {
        self.failures.iter()
    }

    pub fn into_inner(self) -> Vec<ShardFailure> {
        self.failures
    }
}

impl fmt::Display for ShardFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sharding failure:")?;
        for (i, failure) in self.failures.iter().enumerate() {
            let sep = if i == 0 { " " } else { "; " };
            write!(f, "{}shard {}: {}", sep, failure.shard, failure.error)?;
        }
        Ok(())
    }
}

/// Errors raised while assembling a pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("Cannot shard across zero processors")]
    NoShards,

    #[error("Flush interval must be greater than zero")]
    ZeroInterval,

    #[error("Buffer capacity must be greater than zero")]
    ZeroCapacity,

    #[error("Report channel bound must be greater than zero")]
    ZeroReportBuffer,
}
