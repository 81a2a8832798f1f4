//! Final assembly stage.

use std::path::PathBuf;

use crate::orchestrator::errors::{StageError, StageResult};
use crate::orchestrator::runner::run_stage_command;
use crate::orchestrator::stage::PipelineStage;
use crate::orchestrator::types::Context;

/// Concatenates the mixed clips into the finished trailer.
///
/// External; writes the result into `trailers/`.
pub struct AssembleStage;

impl PipelineStage for AssembleStage {
    fn name(&self) -> &str {
        "Final assembly"
    }

    fn slug(&self) -> &str {
        "assemble"
    }

    fn description(&self) -> &str {
        "Concatenate mixed clips into the final trailer"
    }

    fn validate_input(&self, ctx: &Context) -> StageResult<()> {
        let mixed = ctx.layout.audio_clips_dir();
        if !mixed.is_dir() {
            return Err(StageError::FileNotFound {
                path: mixed.display().to_string(),
            });
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context) -> StageResult<()> {
        let argv = ctx.settings.stages.command_for(self.slug());
        run_stage_command(ctx, self.slug(), &argv)?;
        Ok(())
    }

    fn inputs(&self, _ctx: &Context) -> Vec<PathBuf> {
        Vec::new()
    }
}
