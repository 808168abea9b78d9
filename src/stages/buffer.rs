use std::mem;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::trace;

use crate::domain::{Batch, Msg};
use crate::processor::{MsgProcessor, Payload, ProcessError};

/// Accumulates messages until `capacity` is reached, then forwards them as a
/// single batch and flushes the inner processor
///
/// The capacity is a trigger, not a hard limit: concurrent appends may push
/// the buffer past it before the triggering flush takes the lock.
///
/// A flush empties the buffer before the forward's outcome is known. If the
/// inner `process` fails, the buffered messages are dropped, not retained for
/// a later attempt.
pub struct Buffered<V: Payload, P> {
    inner: P,
    buffer: Mutex<Vec<Msg<V>>>,
    capacity: usize,
}

impl<V, P> Buffered<V, P>
where
    V: Payload,
    P: MsgProcessor<V>,
{
    /// Wrap `inner`. A capacity of zero forwards on every `process` call.
    pub fn new(inner: P, capacity: usize) -> Self {
        Self {
            inner,
            buffer: Mutex::new(Vec::new()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of messages waiting for the next forward
    pub async fn len(&self) -> usize {
        self.buffer.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.buffer.lock().await.is_empty()
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<V, P> MsgProcessor<V> for Buffered<V, P>
where
    V: Payload,
    P: MsgProcessor<V>,
{
    async fn process(&self, batch: Batch<V>) -> Result<(), ProcessError> {
        let size = {
            let mut buffer = self.buffer.lock().await;
            buffer.extend(batch);
            buffer.len()
        };

        if size >= self.capacity {
            trace!(size, capacity = self.capacity, "Buffer reached capacity");
            return self.flush().await;
        }

        Ok(())
    }

    async fn flush(&self) -> Result<(), ProcessError> {
        let mut buffer = self.buffer.lock().await;
        if buffer.is_empty() {
            return Ok(());
        }

        let pending = mem::take(&mut *buffer);
        self.inner.process(pending).await?;
        self.inner.flush().await
    }
}
