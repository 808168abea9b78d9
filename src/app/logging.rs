use tracing::Level;

/// Install a stderr `tracing` subscriber; stdout is reserved for the snapshot
pub fn init_tracing(level: Level) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}
