pub mod tally;

// Re-export commonly used types
pub use tally::{TallySink, TallyStore};
