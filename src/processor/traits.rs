use std::sync::Arc;

use async_trait::async_trait;

use super::error::ProcessError;
use crate::domain::Batch;

/// Bound shared by every value type that can travel through a pipeline
pub trait Payload: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Payload for T {}

/// Uniform contract implemented by every pipeline stage and terminal sink
///
/// Decorators own one inner processor (or, for sharding, several) and
/// delegate both calls to it, possibly after local bookkeeping. Calls take
/// `&self` so stages can be shared with background tasks.
#[async_trait]
pub trait MsgProcessor<V: Payload>: Send + Sync {
    /// Handle one batch of messages
    async fn process(&self, batch: Batch<V>) -> Result<(), ProcessError>;

    /// Complete any buffered or pending work before returning
    async fn flush(&self) -> Result<(), ProcessError>;
}

#[async_trait]
impl<V, P> MsgProcessor<V> for Arc<P>
where
    V: Payload,
    P: MsgProcessor<V> + ?Sized,
{
    async fn process(&self, batch: Batch<V>) -> Result<(), ProcessError> {
        (**self).process(batch).await
    }

    async fn flush(&self) -> Result<(), ProcessError> {
        (**self).flush().await
    }
}

#[async_trait]
impl<V, P> MsgProcessor<V> for Box<P>
where
    V: Payload,
    P: MsgProcessor<V> + ?Sized,
{
    async fn process(&self, batch: Batch<V>) -> Result<(), ProcessError> {
        (**self).process(batch).await
    }

    async fn flush(&self) -> Result<(), ProcessError> {
        (**self).flush().await
    }
}
