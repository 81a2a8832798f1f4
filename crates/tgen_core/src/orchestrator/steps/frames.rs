//! Frame extraction stage.

use std::path::PathBuf;

use crate::orchestrator::errors::{StageError, StageResult};
use crate::orchestrator::runner::run_stage_command;
use crate::orchestrator::stage::PipelineStage;
use crate::orchestrator::types::Context;

/// Extracts candidate keyframes from the source video.
///
/// External; writes `frames/scene_<i>/` directories. The marker records
/// the scene boundaries rather than the source video, which is too large
/// to digest on every resume.
pub struct FramesStage;

impl PipelineStage for FramesStage {
    fn name(&self) -> &str {
        "Frame extraction"
    }

    fn slug(&self) -> &str {
        "frames"
    }

    fn description(&self) -> &str {
        "Extract candidate keyframes per scene"
    }

    fn validate_input(&self, ctx: &Context) -> StageResult<()> {
        let video = ctx.layout.video_path();
        if !video.exists() {
            return Err(StageError::FileNotFound {
                path: video.display().to_string(),
            });
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context) -> StageResult<()> {
        let argv = ctx.settings.stages.command_for(self.slug());
        run_stage_command(ctx, self.slug(), &argv)?;
        Ok(())
    }

    fn inputs(&self, ctx: &Context) -> Vec<PathBuf> {
        vec![ctx.layout.scenes_json()]
    }
}
