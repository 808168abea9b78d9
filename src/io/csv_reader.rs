use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::{Stream, StreamExt, future};
use tokio::fs::File;
use tokio_util::compat::TokioAsyncReadCompatExt;
use tracing::warn;

use super::error::IoError;
use super::parse::RawMessageRecord;
use crate::domain::{Envelope, MessageRecord, Msg};

/// Async stream of messages from `key,payload` CSV input
///
/// Every yielded message bumps a shared counter when acknowledged, so the
/// caller can tell how many rows made it to the end of the pipeline.
pub struct CsvMessageSource {
    inner: Pin<Box<dyn Stream<Item = Result<Msg<MessageRecord>, IoError>> + Send>>,
    acked: Arc<AtomicU64>,
}

impl CsvMessageSource {
    /// Create a new message stream from an async reader
    pub fn new<R>(reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let acked = Arc::new(AtomicU64::new(0));
        let csv_reader = AsyncReaderBuilder::new()
            .trim(csv_async::Trim::All)
            .flexible(true)
            .create_deserializer(reader);

        let counter = Arc::clone(&acked);
        let stream = csv_reader
            .into_deserialize::<RawMessageRecord>()
            .map(move |result| -> Result<Msg<MessageRecord>, IoError> {
                let record = result.map_err(IoError::from).and_then(RawMessageRecord::parse)?;
                let counter = Arc::clone(&counter);
                Ok(Envelope::with_ack(record, move || {
                    counter.fetch_add(1, Ordering::Relaxed);
                })
                .boxed())
            });

        Self {
            inner: Box::pin(stream),
            acked,
        }
    }

    /// Create a new message stream from a file path
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let file = File::open(path.as_ref()).await?;
        Ok(Self::new(file.compat()))
    }

    /// Handle on the number of acknowledged messages
    pub fn acked(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.acked)
    }
}

impl Stream for CsvMessageSource {
    type Item = Result<Msg<MessageRecord>, IoError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

/// Drop rows that failed to read or parse, logging each one
pub fn skip_invalid<S, T>(stream: S) -> impl Stream<Item = T> + Unpin + Send
where
    S: Stream<Item = Result<T, IoError>> + Unpin + Send,
    T: Send,
{
    stream.filter_map(|result| {
        future::ready(match result {
            Ok(item) => Some(item),
            Err(err) => {
                warn!(error = %err, "Skipping invalid input row");
                None
            }
        })
    })
}
