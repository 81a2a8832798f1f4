//! Frame ranking stage.

use std::path::PathBuf;

use crate::orchestrator::errors::{StageError, StageResult};
use crate::orchestrator::runner::run_stage_command;
use crate::orchestrator::stage::PipelineStage;
use crate::orchestrator::types::Context;

/// Ranks extracted frames against their subplot text.
///
/// External; writes `frames_ranking/scene_<i>/<score>_frame_<id>.jpg`
/// files whose names carry the score and frame number.
pub struct RankingStage;

impl PipelineStage for RankingStage {
    fn name(&self) -> &str {
        "Frame ranking"
    }

    fn slug(&self) -> &str {
        "ranking"
    }

    fn description(&self) -> &str {
        "Rank extracted frames against subplot texts"
    }

    fn validate_input(&self, ctx: &Context) -> StageResult<()> {
        let frames = ctx.layout.frames_dir();
        if !frames.is_dir() {
            return Err(StageError::FileNotFound {
                path: frames.display().to_string(),
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
