use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use crc::{CRC_64_GO_ISO, Crc};
use tracing::trace;

use crate::domain::{Batch, BoxError};
use crate::processor::{
    BuildError, MsgProcessor, Payload, ProcessError, ShardFailure, ShardFailures,
};

/// CRC-64 with the ISO polynomial, reflected, all-ones init and xorout
const CRC64_ISO: Crc<u64> = Crc::<u64>::new(&CRC_64_GO_ISO);

/// Supplies the bytes a message is routed by
pub trait ShardKeyProvider<V>: Send + Sync {
    fn provide_shard_key(&self, value: &V) -> Result<Vec<u8>, BoxError>;
}

impl<V, F> ShardKeyProvider<V> for F
where
    F: Fn(&V) -> Result<Vec<u8>, BoxError> + Send + Sync,
{
    fn provide_shard_key(&self, value: &V) -> Result<Vec<u8>, BoxError> {
        self(value)
    }
}

/// Partition index for `key` among `shard_count` shards
///
/// `shard_count` must be non-zero.
pub fn shard_index(key: &[u8], shard_count: usize) -> usize {
    debug_assert!(shard_count > 0, "shard_count must be non-zero");
    (CRC64_ISO.checksum(key) % shard_count as u64) as usize
}

/// Fans a batch out across a fixed set of processors by key hash
///
/// Messages with the same key always land on the same shard, and keep their
/// relative order within it. Sub-batches run concurrently, one tokio task per
/// non-empty shard, so `process` must be called from within a tokio runtime.
///
/// Overlapping `process` calls on the same stage are not serialized; the
/// shard processors must tolerate concurrent use if callers overlap.
pub struct Sharded<V: Payload, K> {
    key_provider: K,
    shards: Vec<Arc<dyn MsgProcessor<V>>>,
    _marker: PhantomData<fn(V)>,
}

impl<V: Payload, K> std::fmt::Debug for Sharded<V, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sharded")
            .field("shard_count", &self.shards.len())
            .finish()
    }
}

impl<V, K> Sharded<V, K>
where
    V: Payload,
    K: ShardKeyProvider<V>,
{
    /// Create a shard stage over `processors`, in shard index order
    ///
    /// Returns [`BuildError::NoShards`] when no processor is given.
    pub fn new<P, I>(key_provider: K, processors: I) -> Result<Self, BuildError>
    where
        P: MsgProcessor<V> + 'static,
        I: IntoIterator<Item = P>,
    {
        let shards: Vec<Arc<dyn MsgProcessor<V>>> = processors
            .into_iter()
            .map(|p| Arc::new(p) as Arc<dyn MsgProcessor<V>>)
            .collect();

        if shards.is_empty() {
            return Err(BuildError::NoShards);
        }

        Ok(Self {
            key_provider,
            shards,
            _marker: PhantomData,
        })
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Shard the given value would be routed to
    pub fn shard_for(&self, value: &V) -> Result<usize, ProcessError> {
        let key = self
            .key_provider
            .provide_shard_key(value)
            .map_err(ProcessError::shard_key)?;
        Ok(shard_index(&key, self.shards.len()))
    }

    /// Group messages by shard, preserving order inside each group
    fn split_by_shard(&self, batch: Batch<V>) -> Result<Vec<Batch<V>>, ProcessError> {
        let mut partitions: Vec<Batch<V>> =
            (0..self.shards.len()).map(|_| Vec::new()).collect();
        for msg in batch {
            let shard = self.shard_for(msg.value())?;
            partitions[shard].push(msg);
        }
        Ok(partitions)
    }

    async fn dispatch(&self, partitions: Vec<Batch<V>>) -> Result<(), ProcessError> {
        let handles: Vec<_> = partitions
            .into_iter()
            .enumerate()
            .filter(|(_, partition)| !partition.is_empty())
            .map(|(shard_id, partition)| {
                let shard = Arc::clone(&self.shards[shard_id]);
                trace!(shard_id, messages = partition.len(), "Dispatching shard");
                let handle = tokio::spawn(async move { shard.process(partition).await });
                (shard_id, handle)
            })
            .collect();

        let mut failures = Vec::new();
        for (shard, handle) in handles {
            let outcome = match handle.await {
                Ok(result) => result,
                Err(join_err) => Err(ProcessError::ShardTask(join_err.to_string())),
            };
            if let Err(error) = outcome {
                failures.push(ShardFailure { shard, error });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ProcessError::Sharding(ShardFailures::new(failures)))
        }
    }
}

impl<V, F> Sharded<V, F>
where
    V: Payload,
    F: Fn(&V) -> Result<Vec<u8>, BoxError> + Send + Sync,
{
    /// Build from a key closure, letting the compiler infer its signature
    pub fn with_key_fn<P, I>(key_fn: F, processors: I) -> Result<Self, BuildError>
    where
        P: MsgProcessor<V> + 'static,
        I: IntoIterator<Item = P>,
    {
        Self::new(key_fn, processors)
    }
}

#[async_trait]
impl<V, K> MsgProcessor<V> for Sharded<V, K>
where
    V: Payload,
    K: ShardKeyProvider<V>,
{
    async fn process(&self, batch: Batch<V>) -> Result<(), ProcessError> {
        let partitions = self.split_by_shard(batch)?;
        self.dispatch(partitions).await
    }

    /// Flush shards in index order, stopping at the first failure
    async fn flush(&self) -> Result<(), ProcessError> {
        for shard in &self.shards {
            shard.flush().await?;
        }
        Ok(())
    }
}
