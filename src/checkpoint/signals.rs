use anyhow::{Context, Result};
use std::sync::Arc;

use super::{CheckpointCoordinator, SaveReason};

/// Process termination hook, `std::process::exit` in production
pub type ExitFn = Box<dyn Fn(i32) + Send + Sync>;

/// Saves a `signal` checkpoint and terminates immediately
///
/// Nothing after the save runs: no exit guard, no final checkpoint, no
/// environment cleanup.
pub struct SignalHandler {
    coordinator: Arc<CheckpointCoordinator>,
    exit: ExitFn,
}

impl SignalHandler {
    pub fn new(coordinator: Arc<CheckpointCoordinator>) -> Self {
        Self::with_exit(coordinator, Box::new(|code| std::process::exit(code)))
    }

    pub fn with_exit(coordinator: Arc<CheckpointCoordinator>, exit: ExitFn) -> Self {
        Self { coordinator, exit }
    }

    pub fn handle(&self, signal: &str) {
        log::warn!("{} received, saving model and exiting immediately", signal);
        self.coordinator.save(SaveReason::Signal);
        (self.exit)(0);
    }

    /// Listen for SIGINT (and SIGTERM on unix) on the current tokio runtime
    pub fn install(self) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .context("signal handlers need a running tokio runtime")?;
        let handler = Arc::new(self);

        let on_int = handler.clone();
        runtime.spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => on_int.handle("SIGINT"),
                Err(e) => log::error!("failed to listen for SIGINT: {}", e),
            }
        });

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            let on_term = handler;
            runtime.spawn(async move {
                match signal(SignalKind::terminate()) {
                    Ok(mut term) => {
                        if term.recv().await.is_some() {
                            on_term.handle("SIGTERM");
                        }
                    }
                    Err(e) => log::error!("failed to listen for SIGTERM: {}", e),
                }
            });
        }

        log::debug!("signal handlers installed");
        Ok(())
    }
}
