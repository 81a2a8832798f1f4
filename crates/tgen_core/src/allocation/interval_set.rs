//! Committed-segment bookkeeping with a buffered overlap test.
//!
//! The buffer keeps new segments from landing immediately adjacent to
//! material already used, which reads as repetition in the final cut.

use crate::models::Segment;

/// Default minimum gap enforced between two committed segments, in seconds.
pub const DEFAULT_BUFFER_SECS: f64 = 2.0;

/// Append-only set of committed `[start, end)` segments.
///
/// Only the allocator writes to this, one subplot at a time, so no
/// interior locking is needed.
#[derive(Debug, Clone)]
pub struct IntervalSet {
    committed: Vec<Segment>,
    buffer: f64,
}

impl IntervalSet {
    pub fn new(buffer: f64) -> Self {
        Self {
            committed: Vec::new(),
            buffer,
        }
    }

    /// The safety buffer in seconds.
    pub fn buffer(&self) -> f64 {
        self.buffer
    }

    /// Whether `[start, end)` overlaps any committed segment by more than
    /// the buffer.
    ///
    /// Two intervals `[s1, e1)` and `[s2, e2)` conflict when
    /// `s1 < e2 - buffer && e1 > s2 + buffer`.
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        self.committed
            .iter()
            .any(|seg| start < seg.end - self.buffer && end > seg.start + self.buffer)
    }

    /// Commit a segment. Committed segments are never revised.
    pub fn commit(&mut self, segment: Segment) {
        self.committed.push(segment);
    }

    pub fn len(&self) -> usize {
        self.committed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.committed
    }
}

impl Default for IntervalSet {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SECS)
    }
}
