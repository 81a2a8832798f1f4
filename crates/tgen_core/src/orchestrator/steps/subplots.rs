//! Subplot generation stage.

use std::path::PathBuf;

use crate::orchestrator::errors::{StageError, StageResult};
use crate::orchestrator::runner::run_stage_command;
use crate::orchestrator::stage::PipelineStage;
use crate::orchestrator::types::Context;

/// Splits the plot into per-scene subplot texts.
///
/// External; writes `subplots/scene_<i>/subplot.txt` for each subplot.
pub struct SubplotsStage;

impl PipelineStage for SubplotsStage {
    fn name(&self) -> &str {
        "Subplot generation"
    }

    fn slug(&self) -> &str {
        "subplots"
    }

    fn description(&self) -> &str {
        "Split the plot into narrated subplot texts"
    }

    fn validate_input(&self, ctx: &Context) -> StageResult<()> {
        let plot = ctx.layout.plot_path();
        if !plot.exists() {
            return Err(StageError::FileNotFound {
                path: plot.display().to_string(),
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
        vec![ctx.layout.plot_path()]
    }
}
