//! Sequential stage execution with checkpoint resume.
//!
//! The pipeline runs its stages in order. Each completed stage earns a
//! marker file; a later launch skips every stage up to the first missing
//! marker and resumes there. A failed stage loses its marker and halts
//! the run, so the next launch retries it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::checkpoint::{CheckpointStore, LockError, RunLock};
use super::errors::{PipelineError, PipelineResult};
use super::stage::PipelineStage;
use super::types::Context;

/// Handle for cancelling a running pipeline from another thread.
#[derive(Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Outcome of a completed pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRunResult {
    /// Stages executed during this run.
    pub stages_completed: usize,
    /// Stages skipped because their marker already existed.
    pub stages_skipped: usize,
}

/// Ordered sequence of stages sharing one checkpoint store.
pub struct Pipeline {
    stages: Vec<Box<dyn PipelineStage>>,
    cancelled: Arc<AtomicBool>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn PipelineStage>>) -> Self {
        Self {
            stages,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle for cancelling this pipeline between stages.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            flag: Arc::clone(&self.cancelled),
        }
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn stage_slugs(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.slug()).collect()
    }

    /// Run the pipeline from its resume point.
    ///
    /// Cancellation is honoured at stage boundaries; a stage that is
    /// already executing runs to completion.
    pub fn run(&self, ctx: &Context) -> PipelineResult<PipelineRunResult> {
        ctx.layout
            .ensure_directories()
            .map_err(|e| PipelineError::setup_failed(&ctx.run_name, e.to_string()))?;

        let checkpoints = CheckpointStore::new(ctx.layout.checkpoints_dir());
        let _lock = match RunLock::acquire(checkpoints.dir()) {
            Ok(lock) => lock,
            Err(LockError::Held(lock_path)) => {
                return Err(PipelineError::AlreadyRunning { lock_path });
            }
            Err(LockError::Io(e)) => {
                return Err(PipelineError::setup_failed(&ctx.run_name, e.to_string()));
            }
        };

        let slugs = self.stage_slugs();
        let total = self.stages.len();
        let resume = checkpoints.resume_point(&slugs);

        ctx.logger.section(&format!("Run: {}", ctx.run_name));
        if resume > 1 {
            ctx.logger.info(&format!(
                "Resuming at stage {}/{} (earlier stages already complete)",
                resume.min(total),
                total
            ));
        }

        let mut completed = 0usize;
        let mut skipped = 0usize;

        for (i, stage) in self.stages.iter().enumerate() {
            let ordinal = i + 1;

            if ordinal < resume {
                skipped += 1;
                ctx.logger
                    .info(&format!("Skipping {} (already done)", stage.name()));
                if checkpoints.inputs_changed(ordinal, stage.slug(), &stage.inputs(ctx))
                    == Some(true)
                {
                    ctx.logger.warn(&format!(
                        "Inputs of {} changed since its last run; its output may be stale",
                        stage.name()
                    ));
                }
                continue;
            }

            if self.cancelled.load(Ordering::SeqCst) {
                ctx.logger.warn("Run cancelled");
                return Err(PipelineError::cancelled(&ctx.run_name));
            }

            ctx.logger
                .phase(&format!("Stage {}/{}: {}", ordinal, total, stage.name()));
            ctx.report_progress(
                stage.name(),
                (i as u32 * 100) / total.max(1) as u32,
                stage.description(),
            );
            ctx.logger.clear_tail();

            if let Err(e) = stage.validate_input(ctx) {
                // A stale marker from an earlier run must not let the
                // next launch resume past this stage.
                let _ = checkpoints.clear_marker(ordinal, stage.slug());
                ctx.logger
                    .error(&format!("{} validation failed: {}", stage.name(), e));
                return Err(PipelineError::stage_failed(&ctx.run_name, stage.name(), e));
            }

            if let Err(e) = stage.execute(ctx) {
                // Drop the marker so the next launch retries this stage.
                let _ = checkpoints.clear_marker(ordinal, stage.slug());
                ctx.logger
                    .error(&format!("{} failed: {}", stage.name(), e));
                ctx.logger
                    .show_tail(&format!("Last output from {}", stage.name()));
                return Err(PipelineError::stage_failed(&ctx.run_name, stage.name(), e));
            }

            checkpoints
                .write_marker(ordinal, stage.slug(), &stage.inputs(ctx))
                .map_err(|e| {
                    PipelineError::setup_failed(
                        &ctx.run_name,
                        format!("could not record completion of {}: {}", stage.name(), e),
                    )
                })?;

            ctx.logger.success(&format!("{} complete", stage.name()));
            completed += 1;
        }

        ctx.report_progress("Done", 100, "All stages complete");
        ctx.logger.success("All stages complete");

        Ok(PipelineRunResult {
            stages_completed: completed,
            stages_skipped: skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::logging::{LogConfig, RunLogger};
    use crate::orchestrator::errors::{StageError, StageResult};
    use crate::project::ProjectLayout;
    use std::path::Path;
    use std::sync::atomic::AtomicUsize;
    use tempfile::tempdir;

    struct StubStage {
        name: String,
        slug: String,
        fail: bool,
        reject_input: bool,
        runs: Arc<AtomicUsize>,
    }

    impl StubStage {
        fn new(slug: &str, fail: bool, runs: Arc<AtomicUsize>) -> Box<Self> {
            Box::new(Self {
                name: slug.to_uppercase(),
                slug: slug.to_string(),
                fail,
                reject_input: false,
                runs,
            })
        }

        fn rejecting_input(slug: &str, runs: Arc<AtomicUsize>) -> Box<Self> {
            Box::new(Self {
                name: slug.to_uppercase(),
                slug: slug.to_string(),
                fail: false,
                reject_input: true,
                runs,
            })
        }
    }

    impl PipelineStage for StubStage {
        fn name(&self) -> &str {
            &self.name
        }

        fn slug(&self) -> &str {
            &self.slug
        }

        fn validate_input(&self, _ctx: &Context) -> StageResult<()> {
            if self.reject_input {
                Err(StageError::invalid_input("stub precondition missing"))
            } else {
                Ok(())
            }
        }

        fn execute(&self, _ctx: &Context) -> StageResult<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(StageError::Other("stub failure".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn test_context(root: &Path) -> Context {
        let logger = Arc::new(
            RunLogger::new("pipeline_test", root, LogConfig::default(), None).unwrap(),
        );
        let layout = ProjectLayout::at_root(root, "movie.mp4");
        Context::new(Settings::default(), layout, "pipeline_test", logger)
    }

    fn counters(n: usize) -> Vec<Arc<AtomicUsize>> {
        (0..n).map(|_| Arc::new(AtomicUsize::new(0))).collect()
    }

    #[test]
    fn full_run_executes_every_stage_once() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path());
        let runs = counters(3);

        let pipeline = Pipeline::new(vec![
            StubStage::new("one", false, Arc::clone(&runs[0])),
            StubStage::new("two", false, Arc::clone(&runs[1])),
            StubStage::new("three", false, Arc::clone(&runs[2])),
        ]);

        let result = pipeline.run(&ctx).unwrap();
        assert_eq!(result.stages_completed, 3);
        assert_eq!(result.stages_skipped, 0);
        for r in &runs {
            assert_eq!(r.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn second_run_skips_completed_stages() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path());
        let runs = counters(3);

        let build = |runs: &[Arc<AtomicUsize>]| {
            Pipeline::new(vec![
                StubStage::new("one", false, Arc::clone(&runs[0])),
                StubStage::new("two", false, Arc::clone(&runs[1])),
                StubStage::new("three", false, Arc::clone(&runs[2])),
            ])
        };

        build(&runs).run(&ctx).unwrap();
        let result = build(&runs).run(&ctx).unwrap();

        assert_eq!(result.stages_completed, 0);
        assert_eq!(result.stages_skipped, 3);
        for r in &runs {
            assert_eq!(r.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn failed_stage_halts_and_is_retried_next_run() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path());
        let runs = counters(3);

        let first = Pipeline::new(vec![
            StubStage::new("one", false, Arc::clone(&runs[0])),
            StubStage::new("two", true, Arc::clone(&runs[1])),
            StubStage::new("three", false, Arc::clone(&runs[2])),
        ]);
        let err = first.run(&ctx).unwrap_err();
        assert!(matches!(err, PipelineError::StageFailed { .. }));
        assert_eq!(runs[2].load(Ordering::SeqCst), 0);

        // Stage two runs again; stage one keeps its marker.
        let second = Pipeline::new(vec![
            StubStage::new("one", false, Arc::clone(&runs[0])),
            StubStage::new("two", false, Arc::clone(&runs[1])),
            StubStage::new("three", false, Arc::clone(&runs[2])),
        ]);
        let result = second.run(&ctx).unwrap();

        assert_eq!(result.stages_skipped, 1);
        assert_eq!(result.stages_completed, 2);
        assert_eq!(runs[0].load(Ordering::SeqCst), 1);
        assert_eq!(runs[1].load(Ordering::SeqCst), 2);
        assert_eq!(runs[2].load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_middle_marker_reruns_from_the_gap() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path());
        let runs = counters(3);

        let build = |runs: &[Arc<AtomicUsize>]| {
            Pipeline::new(vec![
                StubStage::new("one", false, Arc::clone(&runs[0])),
                StubStage::new("two", false, Arc::clone(&runs[1])),
                StubStage::new("three", false, Arc::clone(&runs[2])),
            ])
        };

        build(&runs).run(&ctx).unwrap();

        let checkpoints = CheckpointStore::new(ctx.layout.checkpoints_dir());
        checkpoints.clear_marker(2, "two").unwrap();

        let result = build(&runs).run(&ctx).unwrap();
        assert_eq!(result.stages_skipped, 1);
        assert_eq!(result.stages_completed, 2);
        assert_eq!(runs[0].load(Ordering::SeqCst), 1);
        assert_eq!(runs[1].load(Ordering::SeqCst), 2);
        // Stage three sits after the gap, so it reruns too.
        assert_eq!(runs[2].load(Ordering::SeqCst), 2);
    }

    #[test]
    fn validation_failure_clears_a_stale_marker() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path());
        let runs = counters(3);

        let build = |runs: &[Arc<AtomicUsize>]| {
            Pipeline::new(vec![
                StubStage::new("one", false, Arc::clone(&runs[0])),
                StubStage::new("two", false, Arc::clone(&runs[1])),
                StubStage::new("three", false, Arc::clone(&runs[2])),
            ])
        };

        build(&runs).run(&ctx).unwrap();

        // Force a rerun of stage two; stage three keeps its old marker
        // but now rejects its input.
        let checkpoints = CheckpointStore::new(ctx.layout.checkpoints_dir());
        checkpoints.clear_marker(2, "two").unwrap();

        let rerun = Pipeline::new(vec![
            StubStage::new("one", false, Arc::clone(&runs[0])),
            StubStage::new("two", false, Arc::clone(&runs[1])),
            StubStage::rejecting_input("three", Arc::clone(&runs[2])),
        ]);
        let err = rerun.run(&ctx).unwrap_err();
        assert!(matches!(err, PipelineError::StageFailed { .. }));

        // The stale marker is gone, so the next launch retries stage
        // three instead of skipping past it.
        assert!(!checkpoints.is_done(3, "three"));
        assert_eq!(checkpoints.resume_point(&["one", "two", "three"]), 3);
        assert_eq!(runs[2].load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancelled_pipeline_stops_before_next_stage() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path());
        let runs = counters(2);

        let pipeline = Pipeline::new(vec![
            StubStage::new("one", false, Arc::clone(&runs[0])),
            StubStage::new("two", false, Arc::clone(&runs[1])),
        ]);
        pipeline.cancel_handle().cancel();

        let err = pipeline.run(&ctx).unwrap_err();
        assert!(matches!(err, PipelineError::Cancelled { .. }));
        assert_eq!(runs[0].load(Ordering::SeqCst), 0);
    }

    #[test]
    fn lock_is_released_after_run() {
        let dir = tempdir().unwrap();
        let ctx = test_context(dir.path());
        let runs = counters(1);

        let build = |runs: &[Arc<AtomicUsize>]| {
            Pipeline::new(vec![StubStage::new("one", false, Arc::clone(&runs[0]))])
        };

        build(&runs).run(&ctx).unwrap();
        // A second run would fail with AlreadyRunning if the lock leaked.
        build(&runs).run(&ctx).unwrap();
    }
}
