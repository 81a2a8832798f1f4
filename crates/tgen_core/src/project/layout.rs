//! Project directory layout.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::PathSettings;

/// Resolved paths inside one project directory.
///
/// All stage artifacts live under the project root:
///
/// ```text
/// <projects_root>/<project_name>/
///     video_input.mp4       source recording
///     plot.txt              retrieved plot text
///     scenes.json           detected scene boundaries
///     subplots/scene_<i>/   subplot.txt
///     frames/scene_<i>/     extracted keyframes
///     frames_ranking/scene_<i>/   <score>_frame_<id>.jpg
///     voices/scene_<i>/     audio_1.wav  (+ voices/durations.json)
///     clips/                clip_plan.json, rendered clips
///     audio_clips/          mixed per-subplot clips
///     trailers/             final output
///     .checkpoints/         stage markers + run lock
/// ```
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
    video_file: String,
}

impl ProjectLayout {
    /// Resolve the layout from path settings.
    pub fn from_settings(paths: &PathSettings) -> Self {
        Self {
            root: PathBuf::from(&paths.projects_root).join(&paths.project_name),
            video_file: paths.video_file.clone(),
        }
    }

    /// Layout rooted at an explicit directory (tests, one-off runs).
    pub fn at_root(root: impl Into<PathBuf>, video_file: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            video_file: video_file.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn video_path(&self) -> PathBuf {
        self.root.join(&self.video_file)
    }

    pub fn plot_path(&self) -> PathBuf {
        self.root.join("plot.txt")
    }

    pub fn scenes_json(&self) -> PathBuf {
        self.root.join("scenes.json")
    }

    pub fn subplots_dir(&self) -> PathBuf {
        self.root.join("subplots")
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.root.join("frames")
    }

    pub fn frames_ranking_dir(&self) -> PathBuf {
        self.root.join("frames_ranking")
    }

    pub fn voices_dir(&self) -> PathBuf {
        self.root.join("voices")
    }

    pub fn durations_json(&self) -> PathBuf {
        self.voices_dir().join("durations.json")
    }

    pub fn clips_dir(&self) -> PathBuf {
        self.root.join("clips")
    }

    pub fn clip_plan_json(&self) -> PathBuf {
        self.clips_dir().join("clip_plan.json")
    }

    pub fn audio_clips_dir(&self) -> PathBuf {
        self.root.join("audio_clips")
    }

    pub fn trailers_dir(&self) -> PathBuf {
        self.root.join("trailers")
    }

    pub fn checkpoints_dir(&self) -> PathBuf {
        self.root.join(".checkpoints")
    }

    /// Artifact directory of one subplot under `base`.
    ///
    /// This is the only place the `scene_<i>` convention is spelled out.
    pub fn scene_dir(base: &Path, index: usize) -> PathBuf {
        base.join(format!("scene_{}", index))
    }

    /// Subplot text file for one subplot.
    pub fn subplot_text_path(&self, index: usize) -> PathBuf {
        Self::scene_dir(&self.subplots_dir(), index).join("subplot.txt")
    }

    /// Ranked candidate directory for one subplot.
    pub fn candidate_dir(&self, index: usize) -> PathBuf {
        Self::scene_dir(&self.frames_ranking_dir(), index)
    }

    /// Voice-over file for one subplot.
    pub fn voice_path(&self, index: usize) -> PathBuf {
        Self::scene_dir(&self.voices_dir(), index).join("audio_1.wav")
    }

    /// Create the output directories a run writes into.
    pub fn ensure_directories(&self) -> io::Result<()> {
        for dir in [
            self.root.clone(),
            self.clips_dir(),
            self.audio_clips_dir(),
            self.trailers_dir(),
            self.checkpoints_dir(),
        ] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathSettings;

    #[test]
    fn resolves_paths_from_settings() {
        let layout = ProjectLayout::from_settings(&PathSettings {
            projects_root: "projects".to_string(),
            project_name: "LOL".to_string(),
            video_file: "video_input.mp4".to_string(),
            logs_folder: ".logs".to_string(),
        });

        assert_eq!(layout.video_path(), PathBuf::from("projects/LOL/video_input.mp4"));
        assert_eq!(
            layout.subplot_text_path(3),
            PathBuf::from("projects/LOL/subplots/scene_3/subplot.txt")
        );
        assert_eq!(
            layout.candidate_dir(1),
            PathBuf::from("projects/LOL/frames_ranking/scene_1")
        );
    }

    #[test]
    fn ensure_directories_creates_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::at_root(dir.path().join("proj"), "in.mp4");
        layout.ensure_directories().unwrap();

        assert!(layout.clips_dir().is_dir());
        assert!(layout.checkpoints_dir().is_dir());
    }
}
