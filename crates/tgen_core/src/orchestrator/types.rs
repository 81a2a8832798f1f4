//! Core types for the orchestrator pipeline.

use std::sync::Arc;

use crate::config::Settings;
use crate::logging::RunLogger;
use crate::project::ProjectLayout;

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (stage_name, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(&str, u32, &str) + Send + Sync>;

/// Read-only context passed to pipeline stages.
///
/// Stages exchange data only through the project directory; the context
/// carries configuration and shared services, never mutable state.
pub struct Context {
    /// Run configuration, immutable after load.
    pub settings: Settings,
    /// Resolved project directory layout.
    pub layout: ProjectLayout,
    /// Run name/identifier (usually the project name).
    pub run_name: String,
    /// Per-run logger.
    pub logger: Arc<RunLogger>,
    /// Optional progress callback.
    progress_callback: Option<ProgressCallback>,
}

impl Context {
    /// Create a new context for a run.
    pub fn new(
        settings: Settings,
        layout: ProjectLayout,
        run_name: impl Into<String>,
        logger: Arc<RunLogger>,
    ) -> Self {
        Self {
            settings,
            layout,
            run_name: run_name.into(),
            logger,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Report progress to the callback (if set).
    pub fn report_progress(&self, stage_name: &str, percent: u32, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(stage_name, percent, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogConfig;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn progress_callback_receives_updates() {
        let dir = tempfile::tempdir().unwrap();
        let logger =
            Arc::new(RunLogger::new("ctx", dir.path(), LogConfig::default(), None).unwrap());
        let layout = ProjectLayout::at_root(dir.path(), "in.mp4");

        let last = Arc::new(AtomicU32::new(0));
        let last_cb = Arc::clone(&last);
        let ctx = Context::new(Settings::default(), layout, "ctx", logger)
            .with_progress_callback(Box::new(move |_, percent, _| {
                last_cb.store(percent, Ordering::SeqCst);
            }));

        ctx.report_progress("Clips", 75, "planning");
        assert_eq!(last.load(Ordering::SeqCst), 75);
    }
}
