//! Audio mixing stage.

use std::path::PathBuf;

use crate::orchestrator::errors::{StageError, StageResult};
use crate::orchestrator::runner::run_stage_command;
use crate::orchestrator::stage::PipelineStage;
use crate::orchestrator::types::Context;

/// Mixes each clip with its narration track.
///
/// External; reads `clips/clip_plan.json` and the rendered clips,
/// writes mixed clips into `audio_clips/`.
pub struct AudioStage;

impl PipelineStage for AudioStage {
    fn name(&self) -> &str {
        "Audio mixing"
    }

    fn slug(&self) -> &str {
        "audio"
    }

    fn description(&self) -> &str {
        "Mix narration audio over the cut clips"
    }

    fn validate_input(&self, ctx: &Context) -> StageResult<()> {
        let plan = ctx.layout.clip_plan_json();
        if !plan.exists() {
            return Err(StageError::FileNotFound {
                path: plan.display().to_string(),
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
        vec![ctx.layout.clip_plan_json()]
    }
}
