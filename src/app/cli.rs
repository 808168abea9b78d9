use std::future::Future;

use tokio::io::{BufWriter, Stdout};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::error::AppError;

/// Reusable CLI application runner that handles:
/// - Signal handling (SIGINT, SIGTERM, SIGHUP) by cancelling a shared token
/// - Stdout buffering
/// - Exit codes (0 = success, 1 = error, 130 = SIGINT, 143 = SIGTERM)
/// - Graceful shutdown: the main function runs to completion after a signal
pub struct CliApp {
    name: String,
}

impl CliApp {
    /// Create a new CLI application runner
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the CLI application with signal handling and resource cleanup
    ///
    /// `main_fn` receives a buffered stdout writer and a cancellation token.
    /// A signal cancels the token and then waits for `main_fn` to wind down,
    /// so it can flush pending work before the process exits.
    ///
    /// This function never returns - it calls std::process::exit with the appropriate code
    pub async fn run<F, Fut>(self, main_fn: F) -> !
    where
        F: FnOnce(BufWriter<Stdout>, CancellationToken) -> Fut,
        Fut: Future<Output = Result<(), AppError>>,
    {
        let writer = BufWriter::new(tokio::io::stdout());
        let token = CancellationToken::new();

        let app = main_fn(writer, token.clone());
        tokio::pin!(app);

        let (result, signal_code) = tokio::select! {
            result = &mut app => (result, None),
            code = wait_for_signal() => {
                info!(app = %self.name, "Shutting down");
                token.cancel();
                ((&mut app).await, Some(code))
            }
        };

        std::process::exit(exit_code(&result, signal_code))
    }
}

/// Exit code for a finished run, preferring the signal's code when one arrived
fn exit_code(result: &Result<(), AppError>, signal_code: Option<i32>) -> i32 {
    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }
    match (result, signal_code) {
        (_, Some(code)) => code,
        (Ok(()), None) => 0,
        (Err(_), None) => 1,
    }
}

/// Wait for any Unix signal (SIGINT, SIGTERM, SIGHUP) or Ctrl+C
/// Returns the exit code to use (130 for SIGINT, 143 for SIGTERM, etc.)
async fn wait_for_signal() -> i32 {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("Failed to setup SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("Failed to setup SIGINT handler");
        let mut sighup = signal(SignalKind::hangup()).expect("Failed to setup SIGHUP handler");

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
                143 // 128 + 15
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
                130 // 128 + 2
            }
            _ = sighup.recv() => {
                info!("Received SIGHUP");
                129 // 128 + 1
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to setup Ctrl+C handler");
        info!("Received Ctrl+C");
        130
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_app_new() {
        let app = CliApp::new("test-app");
        assert_eq!(app.name(), "test-app");
    }

    #[test]
    fn exit_code_success() {
        assert_eq!(exit_code(&Ok(()), None), 0);
    }

    #[test]
    fn exit_code_error() {
        let result = Err(AppError::InvalidArguments("x".to_string()));
        assert_eq!(exit_code(&result, None), 1);
    }

    #[test]
    fn exit_code_prefers_signal() {
        assert_eq!(exit_code(&Ok(()), Some(130)), 130);
        let result = Err(AppError::InvalidConfig("x".to_string()));
        assert_eq!(exit_code(&result, Some(143)), 143);
    }
}
