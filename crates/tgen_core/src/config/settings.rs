//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! The structure is loaded once per run and passed into the pipeline as
//! an immutable value; nothing mutates it after load.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::allocation::{
    AllocatorConfig, DEFAULT_BUFFER_SECS, DEFAULT_MAX_PROBE_ATTEMPTS, DEFAULT_PROBE_STEP_SECS,
};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Narrative (subplot generation) settings.
    #[serde(default)]
    pub narrative: NarrativeSettings,

    /// Frame ranking settings.
    #[serde(default)]
    pub ranking: RankingSettings,

    /// Voice synthesis settings.
    #[serde(default)]
    pub voice: VoiceSettings,

    /// Segment allocation settings.
    #[serde(default)]
    pub allocation: AllocationSettings,

    /// External stage command overrides.
    #[serde(default)]
    pub stages: StageSettings,
}

/// Project and output directory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Root folder holding all projects.
    #[serde(default = "default_projects_root")]
    pub projects_root: String,

    /// Active project name (one directory under the root).
    #[serde(default = "default_project_name")]
    pub project_name: String,

    /// Source video filename inside the project directory.
    #[serde(default = "default_video_file")]
    pub video_file: String,

    /// Folder for run log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_projects_root() -> String {
    "projects".to_string()
}

fn default_project_name() -> String {
    "default".to_string()
}

fn default_video_file() -> String {
    "video_input.mp4".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            projects_root: default_projects_root(),
            project_name: default_project_name(),
            video_file: default_video_file(),
            logs_folder: default_logs_folder(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Use compact log format.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of recent lines kept for error diagnosis.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            error_tail: default_error_tail(),
        }
    }
}

/// Subplot generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeSettings {
    /// Number of subplots the trailer is split into.
    #[serde(default = "default_n_subplots")]
    pub n_subplots: usize,

    /// Text model used by the external generator.
    #[serde(default = "default_narrative_model")]
    pub model_id: String,
}

fn default_n_subplots() -> usize {
    6
}

fn default_narrative_model() -> String {
    "models/gemini-2.5-flash".to_string()
}

impl Default for NarrativeSettings {
    fn default() -> Self {
        Self {
            n_subplots: default_n_subplots(),
            model_id: default_narrative_model(),
        }
    }
}

/// Frame ranking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingSettings {
    /// Embedding model used by the external ranker.
    #[serde(default = "default_ranking_model")]
    pub model_id: String,

    /// Ranked frames retained per subplot.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_ranking_model() -> String {
    "clip-ViT-L-14".to_string()
}

fn default_top_k() -> usize {
    10
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            model_id: default_ranking_model(),
            top_k: default_top_k(),
        }
    }
}

/// Voice synthesis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// TTS model used by the external synthesizer.
    #[serde(default = "default_voice_model")]
    pub model_id: String,

    /// Spoken language code.
    #[serde(default = "default_language")]
    pub language: String,

    /// Takes generated per subplot.
    #[serde(default = "default_n_audios")]
    pub n_audios: u32,

    /// Reference voice sample for cloning.
    #[serde(default = "default_reference_voice")]
    pub reference_voice: String,
}

fn default_voice_model() -> String {
    "tts_models/multilingual/multi-dataset/xtts_v2".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_n_audios() -> u32 {
    1
}

fn default_reference_voice() -> String {
    "voices/sample_voice.wav".to_string()
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            model_id: default_voice_model(),
            language: default_language(),
            n_audios: default_n_audios(),
            reference_voice: default_reference_voice(),
        }
    }
}

/// Segment allocation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationSettings {
    /// Minimum gap between committed segments, seconds.
    #[serde(default = "default_buffer_secs")]
    pub buffer_secs: f64,

    /// Distance between fallback probes, seconds.
    #[serde(default = "default_probe_step_secs")]
    pub probe_step_secs: f64,

    /// Fallback probes before accepting overlap.
    #[serde(default = "default_max_probe_attempts")]
    pub max_probe_attempts: u32,

    /// Use this frame rate instead of probing the source.
    #[serde(default)]
    pub fps_override: Option<f64>,

    /// Use this duration (seconds) instead of probing the source.
    #[serde(default)]
    pub duration_override: Option<f64>,
}

fn default_buffer_secs() -> f64 {
    DEFAULT_BUFFER_SECS
}

fn default_probe_step_secs() -> f64 {
    DEFAULT_PROBE_STEP_SECS
}

fn default_max_probe_attempts() -> u32 {
    DEFAULT_MAX_PROBE_ATTEMPTS
}

impl Default for AllocationSettings {
    fn default() -> Self {
        Self {
            buffer_secs: default_buffer_secs(),
            probe_step_secs: default_probe_step_secs(),
            max_probe_attempts: default_max_probe_attempts(),
            fps_override: None,
            duration_override: None,
        }
    }
}

impl AllocationSettings {
    /// Allocator view of these settings.
    pub fn allocator_config(&self) -> AllocatorConfig {
        AllocatorConfig {
            buffer_secs: self.buffer_secs,
            probe_step_secs: self.probe_step_secs,
            max_probe_attempts: self.max_probe_attempts,
        }
    }
}

/// External stage command configuration.
///
/// Each stage is an isolated subprocess; the orchestrator only knows its
/// argv and exit code. Overrides are keyed by stage slug.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageSettings {
    /// Map of stage slug to replacement argv.
    #[serde(default)]
    pub commands: HashMap<String, Vec<String>>,
}

impl StageSettings {
    /// Argv for a stage: the configured override, or the stock
    /// `python3 scripts/<slug>.py` collaborator.
    pub fn command_for(&self, slug: &str) -> Vec<String> {
        if let Some(argv) = self.commands.get(slug) {
            argv.clone()
        } else {
            vec!["python3".to_string(), format!("scripts/{}.py", slug)]
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Logging,
    Narrative,
    Ranking,
    Voice,
    Allocation,
    Stages,
}

impl ConfigSection {
    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Narrative => "narrative",
            ConfigSection::Ranking => "ranking",
            ConfigSection::Voice => "voice",
            ConfigSection::Allocation => "allocation",
            ConfigSection::Stages => "stages",
        }
    }

    /// All sections in file order.
    pub fn all() -> &'static [ConfigSection] {
        &[
            ConfigSection::Paths,
            ConfigSection::Logging,
            ConfigSection::Narrative,
            ConfigSection::Ranking,
            ConfigSection::Voice,
            ConfigSection::Allocation,
            ConfigSection::Stages,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_allocation_engine() {
        let settings = Settings::default();
        assert_eq!(settings.allocation.buffer_secs, 2.0);
        assert_eq!(settings.allocation.probe_step_secs, 5.0);
        assert_eq!(settings.allocation.max_probe_attempts, 20);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [narrative]
            n_subplots = 3

            [allocation]
            buffer_secs = 1.5
            "#,
        )
        .unwrap();

        assert_eq!(settings.narrative.n_subplots, 3);
        assert_eq!(settings.allocation.buffer_secs, 1.5);
        assert_eq!(settings.allocation.probe_step_secs, 5.0);
        assert_eq!(settings.paths.video_file, "video_input.mp4");
    }

    #[test]
    fn stage_command_override_and_default() {
        let mut stages = StageSettings::default();
        assert_eq!(
            stages.command_for("frames"),
            vec!["python3".to_string(), "scripts/frames.py".to_string()]
        );

        stages.commands.insert(
            "frames".to_string(),
            vec!["./bin/extract-frames".to_string(), "--fast".to_string()],
        );
        assert_eq!(stages.command_for("frames")[0], "./bin/extract-frames");
    }
}
