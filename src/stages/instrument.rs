use async_trait::async_trait;
use tokio::sync::mpsc::Sender;
use tokio::time::Instant;
use tracing::trace;

use super::report::{FlushReport, ProcessReport};
use crate::domain::Batch;
use crate::processor::{MsgProcessor, Payload, ProcessError};

/// Times every call on the inner processor and reports the outcome on
/// caller-registered channels
///
/// Each channel is optional; an unregistered kind is simply not reported.
/// A failed call is reported on its kind channel and then, when one is
/// registered, on the error channel as well. The inner result is returned
/// unchanged.
///
/// Reports are delivered with an awaited send. A consumer that stops
/// reading a bounded channel stalls the pipeline until it resumes. If the
/// receiving side has been dropped the report is discarded.
pub struct Instrumented<P> {
    inner: P,
    errors: Option<Sender<ProcessError>>,
    process_reports: Option<Sender<ProcessReport>>,
    flush_reports: Option<Sender<FlushReport>>,
}

impl<P> Instrumented<P> {
    /// Register any combination of the three channels
    pub fn new(
        inner: P,
        errors: Option<Sender<ProcessError>>,
        process_reports: Option<Sender<ProcessReport>>,
        flush_reports: Option<Sender<FlushReport>>,
    ) -> Self {
        Self {
            inner,
            errors,
            process_reports,
            flush_reports,
        }
    }

    pub fn errors_only(inner: P, errors: Sender<ProcessError>) -> Self {
        Self::new(inner, Some(errors), None, None)
    }

    pub fn process_only(inner: P, reports: Sender<ProcessReport>) -> Self {
        Self::new(inner, None, Some(reports), None)
    }

    pub fn flush_only(inner: P, reports: Sender<FlushReport>) -> Self {
        Self::new(inner, None, None, Some(reports))
    }

    pub fn with_errors(mut self, errors: Sender<ProcessError>) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn with_process_reports(mut self, reports: Sender<ProcessReport>) -> Self {
        self.process_reports = Some(reports);
        self
    }

    pub fn with_flush_reports(mut self, reports: Sender<FlushReport>) -> Self {
        self.flush_reports = Some(reports);
        self
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    async fn report_error(&self, result: &Result<(), ProcessError>) {
        if let (Err(err), Some(errors)) = (result, &self.errors) {
            if errors.send(err.clone()).await.is_err() {
                trace!("Error channel closed, dropping error");
            }
        }
    }
}

#[async_trait]
impl<V, P> MsgProcessor<V> for Instrumented<P>
where
    V: Payload,
    P: MsgProcessor<V>,
{
    async fn process(&self, batch: Batch<V>) -> Result<(), ProcessError> {
        let amount = batch.len();
        let started = Instant::now();
        let result = self.inner.process(batch).await;
        let duration = started.elapsed();

        if let Some(reports) = &self.process_reports {
            let report = ProcessReport::new(amount, duration, result.as_ref().err().cloned());
            if reports.send(report).await.is_err() {
                trace!("Process report channel closed, dropping report");
            }
        }
        self.report_error(&result).await;

        result
    }

    async fn flush(&self) -> Result<(), ProcessError> {
        let started = Instant::now();
        let result = self.inner.flush().await;
        let duration = started.elapsed();

        if let Some(reports) = &self.flush_reports {
            let report = FlushReport::new(duration, result.as_ref().err().cloned());
            if reports.send(report).await.is_err() {
                trace!("Flush report channel closed, dropping report");
            }
        }
        self.report_error(&result).await;

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::batch_of;
    use crate::stages::test_support::{Call, RecordingSink};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    /// Sink that takes a fixed amount of (virtual) time per call
    struct SlowSink {
        delay: Duration,
    }

    #[async_trait]
    impl MsgProcessor<u32> for SlowSink {
        async fn process(&self, _batch: Batch<u32>) -> Result<(), ProcessError> {
            tokio::time::sleep(self.delay).await;
            Ok(())
        }

        async fn flush(&self) -> Result<(), ProcessError> {
            tokio::time::sleep(self.delay).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn reports_successful_process_without_error() {
        let (report_tx, mut report_rx) = mpsc::channel(4);
        let (err_tx, mut err_rx) = mpsc::channel(4);
        let sink = Arc::new(RecordingSink::<u32>::new());
        let stage = Instrumented::process_only(Arc::clone(&sink), report_tx).with_errors(err_tx);

        stage.process(batch_of(vec![1, 2, 3])).await.unwrap();

        let report = report_rx.try_recv().unwrap();
        assert_eq!(report.amount(), 3);
        assert!(report.is_success());
        assert!(report_rx.try_recv().is_err());
        assert!(err_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn failed_process_reports_on_both_channels() {
        let (report_tx, mut report_rx) = mpsc::channel(4);
        let (err_tx, mut err_rx) = mpsc::channel(4);
        let sink = Arc::new(RecordingSink::<u32>::new());
        sink.set_fail_process(true);
        let stage = Instrumented::new(Arc::clone(&sink), Some(err_tx), Some(report_tx), None);

        let err = stage.process(batch_of(vec![1])).await.unwrap_err();

        let report = report_rx.try_recv().unwrap();
        assert_eq!(report.amount(), 1);
        assert_eq!(report.error().unwrap().to_string(), err.to_string());
        let notified = err_rx.try_recv().unwrap();
        assert_eq!(notified.to_string(), err.to_string());
        assert!(err_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn flush_reports_go_to_flush_channel() {
        let (flush_tx, mut flush_rx) = mpsc::channel(4);
        let (process_tx, mut process_rx) = mpsc::channel::<ProcessReport>(4);
        let sink = Arc::new(RecordingSink::<u32>::new());
        sink.set_fail_flush(true);
        let stage = Instrumented::flush_only(Arc::clone(&sink), flush_tx)
            .with_process_reports(process_tx);

        let result = stage.flush().await;

        tokio_test::assert_err!(result);
        let report = flush_rx.try_recv().unwrap();
        assert!(!report.is_success());
        assert!(process_rx.try_recv().is_err());
        assert_eq!(sink.calls(), vec![Call::Flush]);
    }

    #[tokio::test]
    async fn unregistered_channels_produce_nothing() {
        let (err_tx, mut err_rx) = mpsc::channel(4);
        let sink = Arc::new(RecordingSink::<u32>::new());
        let stage = Instrumented::errors_only(Arc::clone(&sink), err_tx);

        stage.process(batch_of(vec![4])).await.unwrap();
        stage.flush().await.unwrap();

        assert!(err_rx.try_recv().is_err());
        assert_eq!(sink.processed(), vec![vec![4]]);
    }

    #[tokio::test]
    async fn closed_channel_does_not_fail_the_call() {
        let (report_tx, report_rx) = mpsc::channel(1);
        drop(report_rx);
        let sink = Arc::new(RecordingSink::<u32>::new());
        let stage = Instrumented::process_only(Arc::clone(&sink), report_tx);

        tokio_test::assert_ok!(stage.process(batch_of(vec![1])).await);
    }

    #[tokio::test(start_paused = true)]
    async fn duration_covers_inner_call() {
        let (report_tx, mut report_rx) = mpsc::channel(1);
        let (flush_tx, mut flush_rx) = mpsc::channel(1);
        let stage = Instrumented::new(
            SlowSink {
                delay: Duration::from_millis(250),
            },
            None,
            Some(report_tx),
            Some(flush_tx),
        );

        stage.process(batch_of(vec![1u32])).await.unwrap();
        stage.flush().await.unwrap();

        assert!(report_rx.recv().await.unwrap().duration() >= Duration::from_millis(250));
        assert!(flush_rx.recv().await.unwrap().duration() >= Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn full_channel_applies_backpressure() {
        let (report_tx, mut report_rx) = mpsc::channel(1);
        let sink = Arc::new(RecordingSink::<u32>::new());
        let stage = Arc::new(Instrumented::process_only(Arc::clone(&sink), report_tx));

        stage.process(batch_of(vec![1])).await.unwrap();

        let blocked = {
            let stage = Arc::clone(&stage);
            tokio::spawn(async move { stage.process(batch_of(vec![2])).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!blocked.is_finished());

        assert_eq!(report_rx.recv().await.unwrap().amount(), 1);
        blocked.await.unwrap().unwrap();
        assert_eq!(report_rx.recv().await.unwrap().amount(), 1);
    }
}
