//! Pipeline orchestration.
//!
//! This module owns everything between "run the trailer build" and the
//! individual stages: the stage trait, the checkpoint store that makes
//! runs resumable, the subprocess runner that external stages share,
//! and the sequential pipeline itself.
//!
//! A run walks a fixed ordered stage list. Each completed stage leaves
//! a `<ordinal>_<slug>.done` marker under `.checkpoints/`; the next
//! launch resumes at the first missing marker. A failure deletes the
//! failing stage's marker and halts, so a rerun retries exactly there.

mod checkpoint;
mod errors;
mod pipeline;
mod runner;
mod stage;
pub mod steps;
mod types;

pub use checkpoint::{input_signature, CheckpointStore, LockError, RunLock, StageMarker};
pub use errors::{PipelineError, PipelineResult, StageError, StageResult};
pub use pipeline::{CancelHandle, Pipeline, PipelineRunResult};
pub use runner::{run_stage_command, CommandOutput};
pub use stage::PipelineStage;
pub use types::{Context, ProgressCallback};

use steps::{
    AssembleStage, AudioStage, ClipsStage, FramesStage, PlotStage, RankingStage, SubplotsStage,
    VoiceStage,
};

/// The production stage sequence, in execution order.
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new(vec![
        Box::new(PlotStage),
        Box::new(SubplotsStage),
        Box::new(FramesStage),
        Box::new(RankingStage),
        Box::new(VoiceStage),
        Box::new(ClipsStage),
        Box::new(AudioStage),
        Box::new(AssembleStage),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_pipeline_order_is_stable() {
        let pipeline = create_standard_pipeline();
        assert_eq!(
            pipeline.stage_slugs(),
            vec![
                "plot", "subplots", "frames", "ranking", "voice", "clips", "audio", "assemble"
            ]
        );
    }

    #[test]
    fn slugs_are_marker_safe() {
        let pipeline = create_standard_pipeline();
        for slug in pipeline.stage_slugs() {
            assert!(slug.chars().all(|c| c.is_ascii_lowercase()));
        }
    }
}
