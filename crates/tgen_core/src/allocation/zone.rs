//! Deterministic zone fallback for subplots with no usable candidate.
//!
//! The timeline is partitioned into one equal-width zone per subplot;
//! probing starts at the subplot's own zone and walks forward in fixed
//! steps, wrapping to the start of the video when a probe would run past
//! the end.

use super::interval_set::IntervalSet;

/// Default distance between successive probes, in seconds.
pub const DEFAULT_PROBE_STEP_SECS: f64 = 5.0;

/// Default number of probes before giving up and accepting overlap.
pub const DEFAULT_MAX_PROBE_ATTEMPTS: u32 = 20;

/// Nominal start of the zone reserved for `index` (1-based) out of `n`
/// subplots on a timeline of `duration` seconds.
///
/// An out-of-range index is pulled into `[1, n]` so the origin always
/// lies on the timeline.
pub fn zone_start(index: usize, n: usize, duration: f64) -> f64 {
    let n = n.max(1);
    let index = index.clamp(1, n);
    (index - 1) as f64 * duration / n as f64
}

/// Outcome of a fallback probe search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneProbe {
    /// Selected start time.
    pub start: f64,
    /// Probes spent, including the selected one.
    pub attempts: u32,
    /// All attempts were exhausted; `start` may still overlap committed
    /// segments (best-effort placement).
    pub exhausted: bool,
}

/// Linearly probe for a clear `[t, t + voice_duration)` slot starting at
/// the subplot's zone.
///
/// A probe that would exceed `duration - voice_duration` wraps back to 0
/// and keeps stepping from there, so the bounded search covers positions
/// before the zone as well. If every attempt conflicts, the last probed
/// position is returned with `exhausted = true`; the caller reports the
/// overlap but proceeds.
pub fn probe_zone(
    index: usize,
    n: usize,
    duration: f64,
    voice_duration: f64,
    intervals: &IntervalSet,
    step: f64,
    max_attempts: u32,
) -> ZoneProbe {
    let origin = zone_start(index, n, duration);
    let limit = (duration - voice_duration).max(0.0);

    let mut t = origin.min(limit);
    let mut attempts = 0;
    let mut last_probed = t;

    while attempts < max_attempts {
        attempts += 1;
        last_probed = t;

        if !intervals.overlaps(t, t + voice_duration) {
            return ZoneProbe {
                start: t,
                attempts,
                exhausted: false,
            };
        }

        let next = t + step;
        t = if next > limit { 0.0 } else { next };
    }

    // Search exhausted; hand back the last position probed and let the
    // caller report the overlap.
    ZoneProbe {
        start: last_probed,
        attempts,
        exhausted: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Segment;

    fn committed(ranges: &[(f64, f64)]) -> IntervalSet {
        let mut set = IntervalSet::new(2.0);
        for (i, &(start, end)) in ranges.iter().enumerate() {
            set.commit(Segment {
                subplot_index: i + 1,
                start,
                end,
            });
        }
        set
    }

    #[test]
    fn zone_starts_partition_evenly() {
        assert_eq!(zone_start(1, 3, 30.0), 0.0);
        assert_eq!(zone_start(2, 3, 30.0), 10.0);
        assert_eq!(zone_start(3, 3, 30.0), 20.0);
    }

    #[test]
    fn clear_zone_takes_first_probe() {
        let set = committed(&[]);
        let probe = probe_zone(2, 3, 30.0, 8.0, &set, 5.0, 20);
        assert_eq!(probe.start, 10.0);
        assert_eq!(probe.attempts, 1);
        assert!(!probe.exhausted);
    }

    #[test]
    fn occupied_zone_steps_forward() {
        // [10, 18) committed; probe for subplot 2 must move past it.
        let set = committed(&[(10.0, 18.0)]);
        let probe = probe_zone(2, 3, 60.0, 8.0, &set, 5.0, 20);
        // 10 conflicts, 15 conflicts (intrudes more than the buffer), 20 is clear.
        assert_eq!(probe.start, 20.0);
        assert!(!probe.exhausted);
    }

    #[test]
    fn probe_wraps_at_timeline_end() {
        // Zone 3 of 3 on a 30s video starts at 20; an 8s slot there is
        // blocked, and the next probe (25) would exceed 30 - 8 = 22, so
        // the search wraps to 0.
        let set = committed(&[(19.0, 29.0)]);
        let probe = probe_zone(3, 3, 30.0, 8.0, &set, 5.0, 20);
        assert_eq!(probe.start, 0.0);
        assert!(!probe.exhausted);
    }

    #[test]
    fn wrapped_search_keeps_stepping() {
        // Zone 3 of 3 on a 30s video is blocked and so is position 0;
        // after wrapping, the walk must continue to 5 rather than
        // re-probing 0 until the attempts run out.
        let set = committed(&[(19.0, 29.0), (0.0, 4.0)]);
        let probe = probe_zone(3, 3, 30.0, 8.0, &set, 5.0, 20);
        assert_eq!(probe.start, 5.0);
        assert_eq!(probe.attempts, 3);
        assert!(!probe.exhausted);
    }

    #[test]
    fn out_of_range_index_stays_on_the_timeline() {
        let set = committed(&[]);
        // Index beyond n is clamped into the last zone.
        assert_eq!(zone_start(5, 3, 30.0), 20.0);
        let probe = probe_zone(5, 1, 60.0, 8.0, &set, 5.0, 20);
        assert_eq!(probe.start, 0.0);
        assert!(!probe.exhausted);
    }

    #[test]
    fn exhausted_search_returns_best_effort() {
        // The whole 20s timeline is committed; no probe can succeed.
        let set = committed(&[(0.0, 20.0)]);
        let probe = probe_zone(1, 2, 20.0, 8.0, &set, 5.0, 4);
        assert_eq!(probe.attempts, 4);
        assert!(probe.exhausted);
        assert!(probe.start >= 0.0);
    }

    #[test]
    fn zone_origin_clamped_for_long_voice() {
        // voice longer than the remaining tail: origin beyond the limit
        // must be pulled back so the slot stays in range.
        let set = committed(&[]);
        let probe = probe_zone(3, 3, 30.0, 12.0, &set, 5.0, 20);
        assert!(probe.start <= 30.0 - 12.0);
        assert!(!probe.exhausted);
    }
}
