//! Pipeline stage trait definition.
//!
//! All production stages implement this trait, providing a consistent
//! interface for validation and execution. A stage is atomic from the
//! pipeline's point of view: it either completes and earns a marker, or
//! it fails and leaves none.

use std::path::PathBuf;

use super::errors::StageResult;
use super::types::Context;

/// Trait for pipeline stages.
///
/// The pipeline runner calls these methods in order:
///
/// 1. `validate_input` - check preconditions before execution
/// 2. `execute` - perform the stage's work (usually one subprocess)
///
/// On success the runner persists the stage's completion marker; a
/// stage never writes its own marker.
pub trait PipelineStage: Send + Sync {
    /// Display name (for logging and error context).
    fn name(&self) -> &str;

    /// Stable short identifier, used in marker filenames and command
    /// configuration. Lowercase, no spaces.
    fn slug(&self) -> &str;

    /// Human-readable description of what this stage does.
    fn description(&self) -> &str {
        self.name()
    }

    /// Validate inputs before execution.
    ///
    /// Should check that required upstream artifacts exist. Missing data
    /// a stage can degrade around is not a validation failure.
    fn validate_input(&self, ctx: &Context) -> StageResult<()>;

    /// Execute the stage's work.
    fn execute(&self, ctx: &Context) -> StageResult<()>;

    /// Input files whose digest is recorded in the completion marker.
    ///
    /// Used only for staleness diagnostics at resume; an empty list is
    /// fine.
    fn inputs(&self, _ctx: &Context) -> Vec<PathBuf> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockStage;

    impl PipelineStage for MockStage {
        fn name(&self) -> &str {
            "Mock"
        }

        fn slug(&self) -> &str {
            "mock"
        }

        fn validate_input(&self, _ctx: &Context) -> StageResult<()> {
            Ok(())
        }

        fn execute(&self, _ctx: &Context) -> StageResult<()> {
            Ok(())
        }
    }

    #[test]
    fn stage_trait_object_works() {
        let stage: Box<dyn PipelineStage> = Box::new(MockStage);
        assert_eq!(stage.name(), "Mock");
        assert_eq!(stage.description(), "Mock");
        assert!(stage.slug().chars().all(|c| c.is_ascii_lowercase()));
    }
}
