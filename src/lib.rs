//! Composable message-processing pipelines.
//!
//! Every stage implements [`MsgProcessor`](processor::MsgProcessor) and owns
//! the processor it wraps, so a pipeline is built by nesting constructors:
//!
//! ```rust,ignore
//! let sinks = (0..4).map(|_| TallySink::new(store.clone()));
//! let sharded = Sharded::with_key_fn(|p: &KeyedPayload| Ok(p.key.as_bytes().to_vec()), sinks)?;
//! let buffered = Buffered::new(sharded, 256);
//! let root = AutoFlushed::new(buffered, token.clone(), Duration::from_millis(500))?;
//!
//! MsgStream::new(root).run(&mut source, &token).await;
//! ```

pub mod app;
pub mod domain;
pub mod io;
pub mod prelude;
pub mod processor;
pub mod stages;
pub mod storage;
pub mod streaming;
