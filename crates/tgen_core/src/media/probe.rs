//! Video probing using ffprobe.
//!
//! Runs `ffprobe -print_format json` and extracts the container duration
//! and the first video stream's frame rate.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;
use thiserror::Error;

use crate::models::VideoInfo;

/// Errors that can occur while probing a source video.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Source video not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to run ffprobe: {0}")]
    ProbeFailed(String),

    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    #[error("Failed to parse ffprobe output: {0}")]
    ParseFailed(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Probe a source video for duration and frame rate.
pub fn probe_video(path: &Path) -> ProbeResult<VideoInfo> {
    if !path.exists() {
        return Err(ProbeError::FileNotFound(path.to_path_buf()));
    }

    tracing::debug!("Probing source video: {}", path.display());

    let output = Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_format", "-show_streams"])
        .arg(path)
        .output()
        .map_err(|e| ProbeError::ProbeFailed(format!("Failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProbeError::CommandFailed {
            tool: "ffprobe".to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            message: stderr.to_string(),
        });
    }

    let json: Value = serde_json::from_slice(&output.stdout)?;
    parse_probe_json(&json)
}

/// Parse the JSON output from ffprobe into a [`VideoInfo`].
pub fn parse_probe_json(json: &Value) -> ProbeResult<VideoInfo> {
    let duration = json
        .get("format")
        .and_then(|f| f.get("duration"))
        .and_then(|d| d.as_str())
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| ProbeError::ParseFailed("no container duration".to_string()))?;

    let streams = json
        .get("streams")
        .and_then(|s| s.as_array())
        .ok_or_else(|| ProbeError::ParseFailed("no streams array".to_string()))?;

    let video_stream = streams
        .iter()
        .find(|s| s.get("codec_type").and_then(|t| t.as_str()) == Some("video"))
        .ok_or_else(|| ProbeError::ParseFailed("no video stream".to_string()))?;

    // avg_frame_rate can be "0/0" for some containers; fall through to
    // r_frame_rate in that case.
    let rate = ["avg_frame_rate", "r_frame_rate"]
        .iter()
        .filter_map(|key| {
            video_stream
                .get(*key)
                .and_then(|r| r.as_str())
                .and_then(parse_frame_rate)
        })
        .next()
        .ok_or_else(|| ProbeError::ParseFailed("no usable frame rate".to_string()))?;

    Ok(VideoInfo {
        duration,
        fps: rate,
    })
}

/// Parse an ffprobe rational frame rate like `24000/1001` or `25/1`.
fn parse_frame_rate(raw: &str) -> Option<f64> {
    let (num, den) = raw.split_once('/')?;
    let num: f64 = num.parse().ok()?;
    let den: f64 = den.parse().ok()?;
    if den == 0.0 || num <= 0.0 {
        return None;
    }
    Some(num / den)
}
