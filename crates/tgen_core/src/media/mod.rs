//! Source video probing.
//!
//! Duration and frame rate of the source recording come from `ffprobe`;
//! configuration overrides win over probing for sources ffprobe cannot
//! read.

mod probe;

pub use probe::{parse_probe_json, probe_video, ProbeError, ProbeResult};
