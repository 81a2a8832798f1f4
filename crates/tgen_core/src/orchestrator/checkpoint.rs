//! Durable per-stage completion markers and the run lock.
//!
//! A marker file `<ordinal>_<slug>.done` in the checkpoint directory is
//! the sole signal that a stage finished. The marker body records when
//! the stage completed and a digest of its declared inputs; the body is
//! diagnostic only - presence is the contract.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Contents of one marker file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageMarker {
    /// 1-based position of the stage in the pipeline.
    pub ordinal: usize,
    /// Stage slug.
    pub slug: String,
    /// RFC 3339 completion time.
    pub completed_at: String,
    /// Digest over the stage's declared input files at completion time.
    #[serde(default)]
    pub input_signature: Option<String>,
}

/// Store of stage completion markers for one project.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Marker path for a stage.
    pub fn marker_path(&self, ordinal: usize, slug: &str) -> PathBuf {
        self.dir.join(format!("{}_{}.done", ordinal, slug))
    }

    /// Whether a stage has a completion marker.
    pub fn is_done(&self, ordinal: usize, slug: &str) -> bool {
        self.marker_path(ordinal, slug).exists()
    }

    /// Persist a completion marker for a stage.
    pub fn write_marker(
        &self,
        ordinal: usize,
        slug: &str,
        inputs: &[PathBuf],
    ) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let marker = StageMarker {
            ordinal,
            slug: slug.to_string(),
            completed_at: chrono::Local::now().to_rfc3339(),
            input_signature: if inputs.is_empty() {
                None
            } else {
                Some(input_signature(inputs))
            },
        };

        let body = serde_json::to_string_pretty(&marker)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        fs::write(self.marker_path(ordinal, slug), body)
    }

    /// Read a stage's marker, if present and parseable.
    pub fn read_marker(&self, ordinal: usize, slug: &str) -> Option<StageMarker> {
        let content = fs::read_to_string(self.marker_path(ordinal, slug)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Remove a stage's marker (after that stage fails on retry).
    pub fn clear_marker(&self, ordinal: usize, slug: &str) -> io::Result<()> {
        let path = self.marker_path(ordinal, slug);
        match fs::remove_file(&path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    /// Remove every marker, forcing a full re-run.
    pub fn clear_all(&self) -> io::Result<usize> {
        let mut removed = 0;
        if !self.dir.exists() {
            return Ok(0);
        }
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".done") {
                fs::remove_file(entry.path())?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// 1-based ordinal of the first stage without a marker.
    ///
    /// Stages before the resume point are trusted unconditionally; their
    /// actual output is not re-verified. Returns `slugs.len() + 1` when
    /// every stage is already done.
    pub fn resume_point(&self, slugs: &[&str]) -> usize {
        for (i, slug) in slugs.iter().enumerate() {
            let ordinal = i + 1;
            if !self.is_done(ordinal, slug) {
                return ordinal;
            }
        }
        slugs.len() + 1
    }

    /// Compare a completed stage's recorded input digest against the
    /// current files. `None` when no comparison is possible.
    pub fn inputs_changed(&self, ordinal: usize, slug: &str, inputs: &[PathBuf]) -> Option<bool> {
        if inputs.is_empty() {
            return None;
        }
        let recorded = self.read_marker(ordinal, slug)?.input_signature?;
        Some(recorded != input_signature(inputs))
    }
}

/// Digest over a set of input files: path names plus contents.
///
/// Missing files contribute their name only, so the signature is always
/// computable.
pub fn input_signature(inputs: &[PathBuf]) -> String {
    let mut hasher = Sha256::new();
    for path in inputs {
        hasher.update(path.display().to_string().as_bytes());
        hasher.update([0u8]);
        if let Ok(content) = fs::read(path) {
            hasher.update(&content);
        }
        hasher.update([0xff]);
    }
    format!("{:x}", hasher.finalize())
}

/// Exclusive lock held for the duration of one pipeline run.
///
/// A second run against the same checkpoint directory is rejected while
/// the lock file exists; stale locks from killed runs are surfaced to
/// the operator instead of being stolen.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

/// Why a run lock could not be taken.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("lock already held at {0}")]
    Held(PathBuf),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl RunLock {
    /// Try to take the lock. Fails if another run already holds it.
    pub fn acquire(dir: &Path) -> Result<Self, LockError> {
        fs::create_dir_all(dir)?;
        let path = dir.join("run.lock");

        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                use io::Write;
                let _ = writeln!(file, "pid {}", std::process::id());
                Ok(Self { path })
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(LockError::Held(path)),
            Err(e) => Err(LockError::Io(e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!("Failed to release run lock {}: {}", self.path.display(), e);
            }
        }
    }
}
