//! Typed loaders for stage artifacts.
//!
//! Everything upstream stages write is parsed here, once, into the
//! in-memory model; downstream code never touches filenames or JSON.

use std::collections::BTreeMap;
use std::fs;

use crate::models::{SceneBoundary, Subplot};

use super::layout::ProjectLayout;
use super::{ProjectError, ProjectResult};

/// Load detected scene boundaries from `scenes.json`.
///
/// A missing file yields an empty list: boundary data is advisory for
/// allocation and its absence is never fatal.
pub fn load_scene_boundaries(layout: &ProjectLayout) -> ProjectResult<Vec<SceneBoundary>> {
    let path = layout.scenes_json();
    if !path.exists() {
        tracing::debug!("No scene boundary file at {}", path.display());
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(&path).map_err(|e| ProjectError::io(&path, e))?;
    let boundaries: Vec<SceneBoundary> =
        serde_json::from_str(&content).map_err(|e| ProjectError::parse(&path, e.to_string()))?;
    Ok(boundaries)
}

/// Load measured voice-over durations from `voices/durations.json`.
///
/// The file maps subplot index (as a JSON string key) to seconds. A
/// missing file yields an empty map.
pub fn load_voice_durations(layout: &ProjectLayout) -> ProjectResult<BTreeMap<usize, f64>> {
    let path = layout.durations_json();
    if !path.exists() {
        tracing::debug!("No voice duration file at {}", path.display());
        return Ok(BTreeMap::new());
    }

    let content = fs::read_to_string(&path).map_err(|e| ProjectError::io(&path, e))?;
    let raw: BTreeMap<String, f64> =
        serde_json::from_str(&content).map_err(|e| ProjectError::parse(&path, e.to_string()))?;

    let mut durations = BTreeMap::new();
    for (key, secs) in raw {
        let index: usize = key
            .parse()
            .map_err(|_| ProjectError::parse(&path, format!("bad subplot index key '{}'", key)))?;
        durations.insert(index, secs);
    }
    Ok(durations)
}

/// Load all subplots, pairing each text with its measured voice duration.
///
/// Subplots are read in index order starting at 1 until the first index
/// with no text file. A subplot whose duration was never measured is
/// skipped with a warning (its allocation cannot be sized); downstream
/// validation of `duration <= 0` stays with the allocator.
pub fn load_subplots(layout: &ProjectLayout) -> ProjectResult<Vec<Subplot>> {
    let durations = load_voice_durations(layout)?;
    let mut subplots = Vec::new();

    let mut index = 1;
    loop {
        let text_path = layout.subplot_text_path(index);
        if !text_path.exists() {
            break;
        }

        let text = fs::read_to_string(&text_path)
            .map_err(|e| ProjectError::io(&text_path, e))?
            .trim()
            .to_string();

        match durations.get(&index) {
            Some(&voice_duration) => subplots.push(Subplot {
                index,
                text,
                voice_duration,
            }),
            None => {
                tracing::warn!("Subplot {}: no measured voice duration, skipping", index);
            }
        }

        index += 1;
    }

    Ok(subplots)
}
