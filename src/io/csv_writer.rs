use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::error::IoError;
use crate::storage::TallyStore;

/// Write the tally table as CSV (`key,messages,bytes`), sorted by key
pub async fn write_snapshot<W>(store: &TallyStore, mut writer: W) -> Result<(), IoError>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut csv_writer = csv::Writer::from_writer(Vec::new());
    csv_writer.write_record(["key", "messages", "bytes"])?;
    for (key, tally) in store.snapshot() {
        csv_writer.serialize((key, tally.messages, tally.bytes))?;
    }
    let bytes = csv_writer
        .into_inner()
        .map_err(|err| IoError::Io(err.into_error()))?;

    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}
