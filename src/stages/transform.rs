use std::marker::PhantomData;

use async_trait::async_trait;

use crate::domain::{Batch, BoxError, Message, Msg};
use crate::processor::{MsgProcessor, Payload, ProcessError};

/// Maps a message value to a new value
pub trait Transformer<V, U>: Send + Sync {
    fn transform(&self, value: &V) -> Result<U, BoxError>;
}

impl<V, U, F> Transformer<V, U> for F
where
    F: Fn(&V) -> Result<U, BoxError> + Send + Sync,
{
    fn transform(&self, value: &V) -> Result<U, BoxError> {
        self(value)
    }
}

/// Message carrying a transformed value; acknowledgment goes to the original
struct TransformedMsg<V, U> {
    original: Msg<V>,
    value: U,
}

impl<V: Payload, U: Payload> Message<U> for TransformedMsg<V, U> {
    fn value(&self) -> &U {
        &self.value
    }

    fn ack(&self) {
        self.original.ack();
    }
}

/// Transforms every value of a batch before forwarding it
///
/// All or nothing: if any value fails to transform, the call returns that
/// error and nothing is forwarded.
pub struct Transformed<V, U, T, P> {
    inner: P,
    transformer: T,
    _marker: PhantomData<fn(V) -> U>,
}

impl<V, U, T, P> Transformed<V, U, T, P>
where
    V: Payload,
    U: Payload,
    T: Transformer<V, U>,
    P: MsgProcessor<U>,
{
    pub fn new(inner: P, transformer: T) -> Self {
        Self {
            inner,
            transformer,
            _marker: PhantomData,
        }
    }
}

impl<V, U, F, P> Transformed<V, U, F, P>
where
    V: Payload,
    U: Payload,
    F: Fn(&V) -> Result<U, BoxError> + Send + Sync,
    P: MsgProcessor<U>,
{
    /// Build from a closure, letting the compiler infer its signature
    pub fn with_fn(inner: P, transform: F) -> Self {
        Self::new(inner, transform)
    }
}

#[async_trait]
impl<V, U, T, P> MsgProcessor<V> for Transformed<V, U, T, P>
where
    V: Payload,
    U: Payload,
    T: Transformer<V, U>,
    P: MsgProcessor<U>,
{
    async fn process(&self, batch: Batch<V>) -> Result<(), ProcessError> {
        let mut transformed: Batch<U> = Vec::with_capacity(batch.len());
        for original in batch {
            let value = self
                .transformer
                .transform(original.value())
                .map_err(ProcessError::transform)?;
            transformed.push(Box::new(TransformedMsg { original, value }));
        }
        self.inner.process(transformed).await
    }

    async fn flush(&self) -> Result<(), ProcessError> {
        self.inner.flush().await
    }
}
