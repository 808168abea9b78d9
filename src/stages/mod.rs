pub mod auto_flush;
pub mod buffer;
pub mod instrument;
pub mod report;
pub mod shard;
pub mod transform;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use auto_flush::AutoFlushed;
pub use buffer::Buffered;
pub use instrument::Instrumented;
pub use report::{FlushReport, ProcessReport};
pub use shard::{ShardKeyProvider, Sharded, shard_index};
pub use transform::{Transformer, Transformed};
