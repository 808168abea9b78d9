use std::str::FromStr;
use std::time::Duration;

use tracing::Level;

use super::error::AppError;
use crate::processor::BuildError;

pub const ENV_CAPACITY: &str = "MSGPIPE_CAPACITY";
pub const ENV_FLUSH_INTERVAL_MS: &str = "MSGPIPE_FLUSH_INTERVAL_MS";
pub const ENV_SHARDS: &str = "MSGPIPE_SHARDS";
pub const ENV_REPORT_BUFFER: &str = "MSGPIPE_REPORT_BUFFER";
pub const ENV_LOG: &str = "MSGPIPE_LOG";

/// Tunables for the bundled pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Buffer size that triggers a forward
    pub capacity: usize,
    /// Period of the background flush
    pub flush_interval: Duration,
    /// Number of shard lanes
    pub shards: usize,
    /// Bound of the error reporting channel
    pub report_buffer: usize,
    pub log_level: Level,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            flush_interval: Duration::from_millis(500),
            shards: 4,
            report_buffer: 64,
            log_level: Level::WARN,
        }
    }
}

impl PipelineConfig {
    /// Read overrides from `MSGPIPE_*` environment variables
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from defaults plus whatever `lookup` returns for each variable
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(capacity) = parse_var(&lookup, ENV_CAPACITY)? {
            config.capacity = capacity;
        }
        if let Some(millis) = parse_var::<u64, _>(&lookup, ENV_FLUSH_INTERVAL_MS)? {
            config.flush_interval = Duration::from_millis(millis);
        }
        if let Some(shards) = parse_var(&lookup, ENV_SHARDS)? {
            config.shards = shards;
        }
        if let Some(report_buffer) = parse_var(&lookup, ENV_REPORT_BUFFER)? {
            config.report_buffer = report_buffer;
        }
        if let Some(level) = parse_var(&lookup, ENV_LOG)? {
            config.log_level = level;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BuildError> {
        if self.capacity == 0 {
            return Err(BuildError::ZeroCapacity);
        }
        if self.shards == 0 {
            return Err(BuildError::NoShards);
        }
        if self.flush_interval.is_zero() {
            return Err(BuildError::ZeroInterval);
        }
        if self.report_buffer == 0 {
            return Err(BuildError::ZeroReportBuffer);
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::InvalidConfig(format!("{}={}", name, raw))),
    }
}
