//! Plot retrieval stage.

use std::path::PathBuf;

use crate::orchestrator::errors::{StageError, StageResult};
use crate::orchestrator::runner::run_stage_command;
use crate::orchestrator::stage::PipelineStage;
use crate::orchestrator::types::Context;

/// Retrieves the plot text for the source recording.
///
/// External; writes `plot.txt` and `scenes.json` into the project root.
pub struct PlotStage;

impl PipelineStage for PlotStage {
    fn name(&self) -> &str {
        "Plot retrieval"
    }

    fn slug(&self) -> &str {
        "plot"
    }

    fn description(&self) -> &str {
        "Retrieve plot text and scene boundaries for the source video"
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

    fn inputs(&self, _ctx: &Context) -> Vec<PathBuf> {
        Vec::new()
    }
}
