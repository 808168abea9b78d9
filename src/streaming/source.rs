use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use crate::domain::{Envelope, Msg};
use crate::processor::Payload;

/// Message source backed by a tokio mpsc receiver
///
/// Ends once every sender has been dropped and the queue is drained.
pub struct ChannelSource<V> {
    rx: mpsc::Receiver<Msg<V>>,
}

impl<V: Payload> ChannelSource<V> {
    pub fn new(rx: mpsc::Receiver<Msg<V>>) -> Self {
        Self { rx }
    }

    /// Create a bounded source and the sender that feeds it
    pub fn channel(capacity: usize) -> (SourceSender<V>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (SourceSender { tx }, Self::new(rx))
    }
}

impl<V: Payload> Stream for ChannelSource<V> {
    type Item = Msg<V>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Producer half of a [`ChannelSource`]
pub struct SourceSender<V> {
    tx: mpsc::Sender<Msg<V>>,
}

impl<V> Clone for SourceSender<V> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<V: Payload> SourceSender<V> {
    /// Queue a message, waiting while the source is full
    ///
    /// Returns the message back if the source has been dropped.
    pub async fn send(&self, msg: Msg<V>) -> Result<(), Msg<V>> {
        self.tx.send(msg).await.map_err(|err| err.0)
    }

    /// Queue a bare value wrapped in an [`Envelope`]
    pub async fn send_value(&self, value: V) -> Result<(), Msg<V>> {
        self.send(Envelope::new(value).boxed()).await
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn yields_messages_then_ends() {
        let (tx, mut source) = ChannelSource::channel(4);
        tx.send_value(1u32).await.unwrap();
        tx.send_value(2u32).await.unwrap();
        drop(tx);

        assert_eq!(*source.next().await.unwrap().value(), 1);
        assert_eq!(*source.next().await.unwrap().value(), 2);
        assert!(source.next().await.is_none());
    }

    #[tokio::test]
    async fn send_fails_after_source_dropped() {
        let (tx, source) = ChannelSource::<u32>::channel(1);
        drop(source);

        let returned = tx.send_value(5).await.unwrap_err();
        assert_eq!(*returned.value(), 5);
    }
}
