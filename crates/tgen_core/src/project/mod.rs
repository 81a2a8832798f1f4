//! On-disk project layout and artifact loaders.
//!
//! A project is one directory holding the source video and every stage
//! artifact. The `scene_<i>` directory convention exists only at this
//! storage boundary; in memory subplots are keyed by their integer index.

mod layout;
mod loaders;

pub use layout::ProjectLayout;
pub use loaders::{load_scene_boundaries, load_subplots, load_voice_durations};

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur reading project artifacts.
#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl ProjectError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for project operations.
pub type ProjectResult<T> = Result<T, ProjectError>;
