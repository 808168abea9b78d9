//! Prelude module for convenient imports
//!
//! Import everything you need with: `use msgpipe::prelude::*;`

// Domain types
pub use crate::domain::{
    Batch, BoxError, DomainError, Envelope, KeyedPayload, Message, MessageRecord, Msg, Tally,
    batch_of,
};

// Processor contract
pub use crate::processor::{
    BuildError, MsgProcessor, Payload, ProcessError, ShardFailure, ShardFailures,
};

// Stages
pub use crate::stages::{
    AutoFlushed, Buffered, FlushReport, Instrumented, ProcessReport, ShardKeyProvider, Sharded,
    Transformed, Transformer, shard_index,
};

// Storage types
pub use crate::storage::{TallySink, TallyStore};

// IO types
pub use crate::io::{CsvMessageSource, IoError, RawMessageRecord, skip_invalid, write_snapshot};

// Streaming types
pub use crate::streaming::{ChannelSource, MsgStream, SourceSender, StopReason};

// App types
pub use crate::app::{AppError, CliApp, PipelineConfig, init_tracing};

pub use tokio_util::sync::CancellationToken;
