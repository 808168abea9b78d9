pub mod error;
pub mod message;
pub mod record;

// Re-export commonly used types
pub use error::DomainError;
pub use message::{Batch, BoxError, Envelope, Message, Msg, batch_of};
pub use record::{KeyedPayload, MessageRecord, Tally};
