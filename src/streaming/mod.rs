pub mod driver;
pub mod source;

// Re-export commonly used types
pub use driver::{MsgStream, StopReason};
pub use source::{ChannelSource, SourceSender};
