//! Segment allocation engine.
//!
//! Chooses, for each subplot in order, a `[start, end)` range of the
//! source video whose length matches the subplot's voice-over, keeping
//! committed segments apart by a safety buffer. Ranked candidate frames
//! are preferred; a deterministic zone search covers subplots with no
//! usable candidate.
//!
//! ```text
//! SegmentAllocator
//!     ├── candidate phase  (ranked frames, consumed-id tracking)
//!     ├── zone fallback    (equal zones, linear probing, wrap)
//!     └── IntervalSet      (committed segments + buffered overlap test)
//! ```

mod allocator;
mod candidates;
mod interval_set;
mod zone;

pub use allocator::{AllocationReport, AllocatorConfig, RejectedAllocation, SegmentAllocator};
pub use candidates::{load_candidates, parse_candidate_filename};
pub use interval_set::{IntervalSet, DEFAULT_BUFFER_SECS};
pub use zone::{probe_zone, zone_start, ZoneProbe, DEFAULT_MAX_PROBE_ATTEMPTS, DEFAULT_PROBE_STEP_SECS};
