use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::trace;

use crate::domain::{Batch, KeyedPayload, Tally};
use crate::processor::{MsgProcessor, ProcessError};

/// Concurrent per-key message and byte counts
#[derive(Debug, Default)]
pub struct TallyStore {
    tallies: DashMap<String, Tally>,
    flushes: AtomicU64,
}

impl TallyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, payload: &KeyedPayload) {
        self.tallies
            .entry(payload.key.clone())
            .or_default()
            .record(payload.bytes);
    }

    pub fn get(&self, key: &str) -> Option<Tally> {
        self.tallies.get(key).map(|entry| *entry.value())
    }

    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }

    /// Total messages recorded across all keys
    pub fn total_messages(&self) -> u64 {
        self.tallies.iter().map(|entry| entry.value().messages).sum()
    }

    pub fn flushes(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }

    /// Copy of every tally, sorted by key
    pub fn snapshot(&self) -> Vec<(String, Tally)> {
        let mut rows: Vec<(String, Tally)> = self
            .tallies
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }
}

/// Terminal processor that records each message in a shared [`TallyStore`]
/// and acknowledges it
///
/// Several sinks may share one store, e.g. one per shard.
#[derive(Debug, Clone)]
pub struct TallySink {
    store: Arc<TallyStore>,
}

impl TallySink {
    pub fn new(store: Arc<TallyStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<TallyStore> {
        &self.store
    }
}

#[async_trait]
impl MsgProcessor<KeyedPayload> for TallySink {
    async fn process(&self, batch: Batch<KeyedPayload>) -> Result<(), ProcessError> {
        trace!(messages = batch.len(), "Recording batch");
        for msg in &batch {
            self.store.record(msg.value());
            msg.ack();
        }
        Ok(())
    }

    async fn flush(&self) -> Result<(), ProcessError> {
        self.store.flushes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
