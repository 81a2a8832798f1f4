//! Production pipeline stages.
//!
//! Most stages delegate their heavy lifting to an external command
//! configured per slug in `[stages]`; the clips stage additionally runs
//! the segment allocator in-process before cutting.

mod assemble;
mod audio;
mod clips;
mod frames;
mod plot;
mod ranking;
mod subplots;
mod voice;

pub use assemble::AssembleStage;
pub use audio::AudioStage;
pub use clips::{ClipPlan, ClipsStage, RejectedSubplot};
pub use frames::FramesStage;
pub use plot::PlotStage;
pub use ranking::RankingStage;
pub use subplots::SubplotsStage;
pub use voice::VoiceStage;
