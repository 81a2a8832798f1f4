//! Ranked-candidate loading from the frame-ranking artifact directory.
//!
//! The ranking stage encodes score and frame id in the artifact filename
//! (`0.8521_frame_1500.jpg`). That convention is treated purely as a
//! serialization format: filenames are parsed here, once, into typed
//! [`Candidate`] values and never re-parsed downstream.

use std::fs;
use std::path::Path;

use crate::models::Candidate;

/// Parse one ranking artifact filename into `(score, frame_id)`.
///
/// Expected form: `<score>_frame_<id>` with an optional extension,
/// e.g. `0.8521_frame_1500.jpg`. Returns `None` for anything else.
pub fn parse_candidate_filename(name: &str) -> Option<(f64, u64)> {
    // Strip only a trailing image extension; the score itself contains
    // a dot, so a plain prefix split would truncate it.
    let stem = match name.rsplit_once('.') {
        Some((stem, ext))
            if !ext.is_empty() && !ext.contains('_') && ext.chars().all(char::is_alphanumeric) =>
        {
            stem
        }
        _ => name,
    };

    let (score_part, rest) = stem.split_once('_')?;
    let id_part = rest.strip_prefix("frame_")?;

    let score: f64 = score_part.parse().ok()?;
    let frame_id: u64 = id_part.parse().ok()?;
    Some((score, frame_id))
}

/// Load the ranked candidate list for one subplot from its artifact
/// directory.
///
/// Unparseable entries are skipped. A missing directory yields an empty
/// list: missing upstream data degrades to the zone fallback and is never
/// fatal. The result is sorted descending by score; ties keep the
/// directory listing order (stable sort, no secondary tie-break).
pub fn load_candidates(dir: &Path, fps: f64) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return candidates,
    };

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    // read_dir order is arbitrary; fix it so tie-breaking is stable.
    names.sort();

    for name in names {
        if let Some((score, frame_id)) = parse_candidate_filename(&name) {
            candidates.push(Candidate {
                score,
                timestamp: frame_id as f64 / fps,
                frame_id,
            });
        } else {
            tracing::debug!("Skipping unrecognized ranking artifact: {}", name);
        }
    }

    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    candidates
}
