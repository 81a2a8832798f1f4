//! Shared data model for Trailer Gen.
//!
//! Plain serde-derived types that flow between the project layout,
//! the allocation engine, and the orchestrator. Nothing here touches
//! the filesystem.

use serde::{Deserialize, Serialize};

/// One detected cut on the source timeline, in seconds.
///
/// Boundaries are produced once by the frame-extraction stage
/// (`scenes.json`), ordered by `start`, non-overlapping, and read-only
/// afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneBoundary {
    pub start: f64,
    pub end: f64,
}

/// A ranked visual frame judged relevant to one subplot's text.
///
/// Identity is `frame_id`; lists are ordered descending by `score`.
/// Uniqueness of `frame_id` across subplot lists is not guaranteed by
/// the ranking stage, so consumers must track consumed ids themselves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub score: f64,
    /// Position on the source timeline, `frame_id / fps`.
    pub timestamp: f64,
    pub frame_id: u64,
}

/// One narrative beat of the trailer, with its measured voice-over length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subplot {
    /// 1-based position in the trailer.
    pub index: usize,
    pub text: String,
    /// Seconds of synthesized voice-over; fixed once measured.
    pub voice_duration: f64,
}

/// A committed `[start, end)` time range on the source video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub subplot_index: usize,
    pub start: f64,
    pub end: f64,
}

impl Segment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// How a segment's start time was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentSource {
    /// Taken from a ranked candidate frame.
    Candidate { frame_id: u64, score: f64 },
    /// Deterministic zone probe (no usable candidate).
    Zone { probe_attempts: u32 },
}

/// One planned clip, as written to `clip_plan.json` for the cutter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannedClip {
    pub segment: Segment,
    pub source: SegmentSource,
    /// Placement still overlaps a committed segment (fallback exhausted).
    pub overlap: bool,
    /// Segment is shorter than the voice-over (source shorter than needed).
    pub shortened: bool,
}

/// Duration and frame rate of the source video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Total duration in seconds.
    pub duration: f64,
    /// Frames per second.
    pub fps: f64,
}
