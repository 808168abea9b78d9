use std::sync::Arc;
use std::sync::atomic::Ordering;

use msgpipe::prelude::*;
use tokio::io::{BufWriter, Stdout};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[tokio::main]
async fn main() {
    let setup = parse_args(std::env::args().collect())
        .and_then(|input| Ok((input, PipelineConfig::from_env()?)));
    let (input, config) = match setup {
        Ok(setup) => setup,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.log_level);

    CliApp::new("msgpipe")
        .run(move |writer, token| run_pipeline(writer, token, input, config))
        .await
}

/// Parse and validate command-line arguments
fn parse_args(args: Vec<String>) -> Result<String, AppError> {
    if args.len() != 2 {
        return Err(AppError::InvalidArguments(
            "Usage: msgpipe <messages.csv>".to_string(),
        ));
    }
    Ok(args[1].clone())
}

/// Main application logic - tallies messages per key and writes a snapshot
///
/// Topology: errors → auto-flush → buffer → transform → shards → tally sinks
async fn run_pipeline(
    mut writer: BufWriter<Stdout>,
    token: CancellationToken,
    input_file: String,
    config: PipelineConfig,
) -> Result<(), AppError> {
    let source = CsvMessageSource::from_file(&input_file).await?;
    let acked = source.acked();
    let mut source = skip_invalid(source);

    let store = Arc::new(TallyStore::new());
    let sinks = (0..config.shards).map(|_| TallySink::new(Arc::clone(&store)));
    let sharded = Sharded::with_key_fn(
        |payload: &KeyedPayload| Ok(payload.key.as_bytes().to_vec()),
        sinks,
    )?;
    let transformed = Transformed::with_fn(sharded, |record: &MessageRecord| {
        record.to_keyed().map_err(BoxError::from)
    });
    let buffered = Buffered::new(transformed, config.capacity);

    let flush_token = token.child_token();
    let auto_flushed = AutoFlushed::new(buffered, flush_token.clone(), config.flush_interval)?;

    let (error_tx, error_rx) = mpsc::channel(config.report_buffer);
    let error_log = tokio::spawn(log_errors(error_rx));
    let root = Instrumented::errors_only(auto_flushed, error_tx);

    let driver = MsgStream::new(root);
    let reason = driver.run(&mut source, &token).await;

    // The driver never flushes on its own
    let root = driver.into_root();
    MsgProcessor::<MessageRecord>::flush(&root).await?;
    flush_token.cancel();
    drop(root);

    let errors = join_error_log(error_log).await;
    info!(
        ?reason,
        acked = acked.load(Ordering::Relaxed),
        ?errors,
        keys = store.len(),
        flushes = store.flushes(),
        "Pipeline finished"
    );

    write_snapshot(&store, &mut writer).await?;
    Ok(())
}

/// Error count from the logging task, or `None` if it did not finish
async fn join_error_log(handle: JoinHandle<u64>) -> Option<u64> {
    match handle.await {
        Ok(count) => Some(count),
        Err(err) => {
            debug!(error = %err, "Error log task failed");
            None
        }
    }
}

/// Drain the error channel until every sender is gone, returning the count
async fn log_errors(mut errors: mpsc::Receiver<ProcessError>) -> u64 {
    let mut count = 0;
    while let Some(err) = errors.recv().await {
        count += 1;
        debug!(error = %err, "Pipeline error");
    }
    count
}
