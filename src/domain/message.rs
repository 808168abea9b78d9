use std::fmt;

/// Boxed error type accepted from user-supplied callbacks
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A value travelling through the pipeline, plus the means to acknowledge it
///
/// Stages never mutate a message. A stage that needs a different value wraps
/// the message and keeps delegating `ack` to the original.
pub trait Message<V>: Send + Sync {
    /// The carried value
    fn value(&self) -> &V;

    /// Signal that processing of this message is complete
    fn ack(&self);
}

impl<V: fmt::Debug> fmt::Debug for dyn Message<V> + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Message").field(self.value()).finish()
    }
}

/// Owned, type-erased message
pub type Msg<V> = Box<dyn Message<V>>;

/// Ordered group of messages handed to `process` in one call
pub type Batch<V> = Vec<Msg<V>>;

type AckFn = Box<dyn Fn() + Send + Sync>;

/// Stock message: a value with an optional acknowledgment callback
pub struct Envelope<V> {
    value: V,
    on_ack: Option<AckFn>,
}

impl<V> Envelope<V> {
    /// Create a message whose acknowledgment does nothing
    pub fn new(value: V) -> Self {
        Self {
            value,
            on_ack: None,
        }
    }

    /// Create a message that runs `on_ack` every time it is acknowledged
    pub fn with_ack<F>(value: V, on_ack: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            value,
            on_ack: Some(Box::new(on_ack)),
        }
    }

    /// Consume the envelope, returning the carried value
    pub fn into_value(self) -> V {
        self.value
    }
}

impl<V> Envelope<V>
where
    V: Send + Sync + 'static,
{
    /// Box this envelope into a [`Msg`]
    pub fn boxed(self) -> Msg<V> {
        Box::new(self)
    }
}

impl<V: Send + Sync> Message<V> for Envelope<V> {
    fn value(&self) -> &V {
        &self.value
    }

    fn ack(&self) {
        if let Some(on_ack) = &self.on_ack {
            on_ack();
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Envelope<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("value", &self.value)
            .field("has_ack", &self.on_ack.is_some())
            .finish()
    }
}

/// Build a batch of plain envelopes from values
pub fn batch_of<V, I>(values: I) -> Batch<V>
where
    V: Send + Sync + 'static,
    I: IntoIterator<Item = V>,
{
    values
        .into_iter()
        .map(|value| Envelope::new(value).boxed())
        .collect()
}
