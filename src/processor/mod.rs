pub mod error;
pub mod traits;

// Re-export commonly used types
pub use error::{BuildError, ProcessError, ShardFailure, ShardFailures, SharedError};
pub use traits::{MsgProcessor, Payload};
