//! Voice synthesis stage.

use std::path::PathBuf;

use crate::orchestrator::errors::{StageError, StageResult};
use crate::orchestrator::runner::run_stage_command;
use crate::orchestrator::stage::PipelineStage;
use crate::orchestrator::types::Context;

/// Synthesizes the narration for each subplot.
///
/// External; writes `voices/scene_<i>/audio_1.wav` plus
/// `voices/durations.json` mapping subplot index to spoken length.
/// Allocation cannot size segments without the measured durations, so
/// their absence after a zero exit is still a failure.
pub struct VoiceStage;

impl PipelineStage for VoiceStage {
    fn name(&self) -> &str {
        "Voice synthesis"
    }

    fn slug(&self) -> &str {
        "voice"
    }

    fn description(&self) -> &str {
        "Synthesize narration audio and measure spoken durations"
    }

    fn validate_input(&self, ctx: &Context) -> StageResult<()> {
        let first = ctx.layout.subplot_text_path(1);
        if !first.exists() {
            return Err(StageError::invalid_input(format!(
                "no subplot texts found (expected {})",
                first.display()
            )));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context) -> StageResult<()> {
        let argv = ctx.settings.stages.command_for(self.slug());
        run_stage_command(ctx, self.slug(), &argv)?;

        let durations = ctx.layout.durations_json();
        if !durations.exists() {
            return Err(StageError::FileNotFound {
                path: durations.display().to_string(),
            });
        }
        Ok(())
    }

    fn inputs(&self, _ctx: &Context) -> Vec<PathBuf> {
        Vec::new()
    }
}
