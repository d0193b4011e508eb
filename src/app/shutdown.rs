//! Graceful shutdown handling for the host.
//!
//! Provides signal handling and the final save on exit.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::model::provider::AgentProvider;
use crate::model::Recorder;

/// Manages graceful shutdown of the host.
pub struct ShutdownManager {
    shutdown_requested: Arc<AtomicBool>,
    save_on_exit: bool,
    exit_code: i32,
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownManager {
    /// Creates a new shutdown manager.
    pub fn new() -> Self {
        Self {
            shutdown_requested: Arc::new(AtomicBool::new(false)),
            save_on_exit: true,
            exit_code: 0,
        }
    }

    /// Sets whether to save the run on exit.
    pub fn set_save_on_exit(&mut self, save: bool) {
        self.save_on_exit = save;
    }

    /// Requests shutdown.
    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
        tracing::info!("Shutdown requested");
    }

    /// Checks if shutdown has been requested.
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }

    /// Flag shared with signal handlers running on other tasks.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown_requested)
    }

    /// Returns whether to save the run on exit.
    pub fn should_save_on_exit(&self) -> bool {
        self.save_on_exit
    }

    /// Sets the exit code.
    pub fn set_exit_code(&mut self, code: i32) {
        self.exit_code = code;
    }

    /// Gets the exit code.
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Final save before the process ends. Failures are logged by the
    /// recorder and never abort the shutdown.
    pub fn cleanup<P: AgentProvider>(&self, recorder: &mut Recorder<P>) -> Option<PathBuf> {
        tracing::info!("Performing shutdown cleanup...");

        let saved = if self.save_on_exit {
            recorder.finish()
        } else {
            tracing::info!("Skipping final save");
            None
        };

        tracing::info!(
            saves = recorder.stats().saves(),
            failed = recorder.stats().failed_saves(),
            "Cleanup complete"
        );
        saved
    }
}
