use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::Msg;
use crate::processor::{MsgProcessor, Payload};

/// Why [`MsgStream::run`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The cancellation token fired
    Cancelled,
    /// The source yielded its last message
    SourceExhausted,
}

/// Drives messages from a source into the root of a processor chain
///
/// Each message is processed on its own, as a single-message batch, in
/// source order. Failures are discarded: nothing is retried and the loop
/// keeps going. Observe failures by composing an
/// [`Instrumented`](crate::stages::Instrumented) stage into the chain.
///
/// The loop does not flush when it stops. Call `flush` on the root
/// afterwards if pending work must be delivered.
pub struct MsgStream<P> {
    root: P,
}

impl<P> MsgStream<P> {
    pub fn new(root: P) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &P {
        &self.root
    }

    pub fn into_root(self) -> P {
        self.root
    }

    /// Pull messages until `token` is cancelled or `source` ends
    ///
    /// The source is borrowed, never closed.
    pub async fn run<V, S>(&self, source: &mut S, token: &CancellationToken) -> StopReason
    where
        V: Payload,
        P: MsgProcessor<V>,
        S: Stream<Item = Msg<V>> + Unpin,
    {
        let mut processed = 0u64;
        let reason = loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break StopReason::Cancelled,
                next = source.next() => match next {
                    Some(msg) => {
                        processed += 1;
                        if let Err(err) = self.root.process(vec![msg]).await {
                            debug!(error = %err, "Discarding failed message");
                        }
                    }
                    None => break StopReason::SourceExhausted,
                },
            }
        };

        debug!(processed, ?reason, "Message stream stopped");
        reason
    }
}
