//! Ctrl+C handling
//!
//! The first interrupt cancels the running evaluation so every scenario
//! finishes as cancelled and a partial report is still printed. A second
//! interrupt exits immediately.

use futures::stream::StreamExt;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::{Handle, Signals};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Exit code used when a second interrupt forces the process down
const FORCED_EXIT_CODE: i32 = 130;

/// Signal handler that fires a cancellation token on interrupt
pub struct SignalHandler {
    token: CancellationToken,
    handle: Option<Handle>,
    task_handle: Option<JoinHandle<()>>,
}

impl SignalHandler {
    /// Create a handler for the given token
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            handle: None,
            task_handle: None,
        }
    }

    /// Start listening for SIGINT and SIGTERM
    pub fn start(&mut self) -> std::io::Result<()> {
        if self.is_active() {
            return Ok(());
        }

        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        self.handle = Some(signals.handle());
        let token = self.token.clone();

        let task = tokio::spawn(async move {
            while let Some(signal) = signals.next().await {
                if token.is_cancelled() {
                    eprintln!("\nForced exit.");
                    std::process::exit(FORCED_EXIT_CODE);
                }

                tracing::info!(signal, "Interrupt received, cancelling evaluation");
                eprintln!("\n🛑 Cancelling evaluation... (press Ctrl+C again to force exit)");
                token.cancel();
            }
        });

        self.task_handle = Some(task);
        Ok(())
    }

    /// Stop listening
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.close();
        }
        if let Some(task) = self.task_handle.take() {
            task.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.task_handle.is_some()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for SignalHandler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_signal_handler_start_stop() {
        let mut handler = SignalHandler::new(CancellationToken::new());
        assert!(!handler.is_active());

        handler.start().unwrap();
        assert!(handler.is_active());
        // Starting twice is a no-op
        handler.start().unwrap();

        handler.stop();
        assert!(!handler.is_active());
        assert!(!handler.token().is_cancelled());
    }
}
