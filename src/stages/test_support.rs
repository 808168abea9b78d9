use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::domain::Batch;
use crate::processor::{MsgProcessor, Payload, ProcessError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call<V> {
    Process(Vec<V>),
    Flush,
}

/// Terminal processor that records every call and can be told to fail
pub(crate) struct RecordingSink<V> {
    calls: Mutex<Vec<Call<V>>>,
    fail_process: AtomicBool,
    fail_flush: AtomicBool,
}

impl<V: Clone> RecordingSink<V> {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_process: AtomicBool::new(false),
            fail_flush: AtomicBool::new(false),
        }
    }

    pub(crate) fn set_fail_process(&self, fail: bool) {
        self.fail_process.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn set_fail_flush(&self, fail: bool) {
        self.fail_flush.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> Vec<Call<V>> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn processed(&self) -> Vec<Vec<V>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Process(values) => Some(values),
                Call::Flush => None,
            })
            .collect()
    }

    pub(crate) fn flushes(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Flush))
            .count()
    }
}

#[async_trait]
impl<V: Payload + Clone> MsgProcessor<V> for RecordingSink<V> {
    async fn process(&self, batch: Batch<V>) -> Result<(), ProcessError> {
        let values = batch.iter().map(|msg| msg.value().clone()).collect();
        self.calls.lock().unwrap().push(Call::Process(values));
        if self.fail_process.load(Ordering::SeqCst) {
            return Err(ProcessError::downstream("sink rejected batch"));
        }
        Ok(())
    }

    async fn flush(&self) -> Result<(), ProcessError> {
        self.calls.lock().unwrap().push(Call::Flush);
        if self.fail_flush.load(Ordering::SeqCst) {
            return Err(ProcessError::downstream("sink flush failed"));
        }
        Ok(())
    }
}
