use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::Batch;
use crate::processor::{BuildError, MsgProcessor, Payload, ProcessError};

/// Flushes the inner processor on a fixed interval until cancelled
///
/// `process` and `flush` pass straight through. The background worker
/// discards flush errors, since no caller is waiting on them; compose an
/// [`Instrumented`](super::Instrumented) stage inside this one to observe them.
///
/// The worker lives until `token` is cancelled, even if this stage is
/// dropped first. Once cancelled it never flushes again.
pub struct AutoFlushed<V, P> {
    inner: Arc<P>,
    worker: JoinHandle<()>,
    _marker: PhantomData<fn(V)>,
}

impl<V, P> AutoFlushed<V, P>
where
    V: Payload,
    P: MsgProcessor<V> + 'static,
{
    /// Wrap `inner` and start the flush worker on the current tokio runtime
    ///
    /// The first flush fires one `interval` after construction.
    pub fn new(inner: P, token: CancellationToken, interval: Duration) -> Result<Self, BuildError> {
        if interval.is_zero() {
            return Err(BuildError::ZeroInterval);
        }

        let inner = Arc::new(inner);
        let worker = tokio::spawn(flush_worker::<V, P>(Arc::clone(&inner), token, interval));

        Ok(Self {
            inner,
            worker,
            _marker: PhantomData,
        })
    }

    /// Whether the flush worker has stopped
    pub fn is_stopped(&self) -> bool {
        self.worker.is_finished()
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

async fn flush_worker<V, P>(inner: Arc<P>, token: CancellationToken, interval: Duration)
where
    V: Payload,
    P: MsgProcessor<V>,
{
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                if token.is_cancelled() {
                    break;
                }
                if let Err(err) = MsgProcessor::<V>::flush(&*inner).await {
                    debug!(error = %err, "Periodic flush failed");
                }
            }
        }
    }

    debug!("Auto-flush worker stopped");
}

#[async_trait]
impl<V, P> MsgProcessor<V> for AutoFlushed<V, P>
where
    V: Payload,
    P: MsgProcessor<V>,
{
    async fn process(&self, batch: Batch<V>) -> Result<(), ProcessError> {
        self.inner.process(batch).await
    }

    async fn flush(&self) -> Result<(), ProcessError> {
        MsgProcessor::<V>::flush(&*self.inner).await
    }
}
