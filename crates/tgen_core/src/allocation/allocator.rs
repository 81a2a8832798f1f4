//! Greedy segment allocator.
//!
//! Processes subplots strictly in index order; earlier subplots have
//! first claim on the timeline and committed segments are never revised.
//! Ranked candidates are tried first, the deterministic zone fallback
//! second.

use std::collections::{BTreeMap, HashSet};

use crate::models::{Candidate, PlannedClip, Segment, SegmentSource, Subplot};

use super::interval_set::{IntervalSet, DEFAULT_BUFFER_SECS};
use super::zone::{probe_zone, DEFAULT_MAX_PROBE_ATTEMPTS, DEFAULT_PROBE_STEP_SECS};

/// Tuning knobs for the allocator, fixed for the whole run.
#[derive(Debug, Clone, Copy)]
pub struct AllocatorConfig {
    /// Minimum gap between committed segments, seconds.
    pub buffer_secs: f64,
    /// Distance between fallback probes, seconds.
    pub probe_step_secs: f64,
    /// Fallback probes before accepting overlap.
    pub max_probe_attempts: u32,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            buffer_secs: DEFAULT_BUFFER_SECS,
            probe_step_secs: DEFAULT_PROBE_STEP_SECS,
            max_probe_attempts: DEFAULT_MAX_PROBE_ATTEMPTS,
        }
    }
}

/// An allocation the allocator refused to make.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedAllocation {
    pub subplot_index: usize,
    pub reason: String,
}

/// Full outcome of one allocation pass.
#[derive(Debug, Clone, Default)]
pub struct AllocationReport {
    /// One planned clip per successfully allocated subplot, in subplot order.
    pub clips: Vec<PlannedClip>,
    /// Subplots whose allocation was rejected (invalid voice duration).
    pub rejected: Vec<RejectedAllocation>,
}

impl AllocationReport {
    /// Placements that still overlap committed segments after the
    /// fallback search was exhausted.
    pub fn overlapping(&self) -> impl Iterator<Item = &PlannedClip> {
        self.clips.iter().filter(|c| c.overlap)
    }
}

/// Assigns each subplot a timeline segment the length of its voice-over.
#[derive(Debug, Clone, Default)]
pub struct SegmentAllocator {
    config: AllocatorConfig,
}

impl SegmentAllocator {
    pub fn new(config: AllocatorConfig) -> Self {
        Self { config }
    }

    /// Allocate segments for all subplots against a source of `duration`
    /// seconds.
    ///
    /// `candidates` maps subplot index to its ranked list (descending by
    /// score); subplots with no entry fall straight through to the zone
    /// fallback. An empty subplot list yields an empty report.
    pub fn allocate(
        &self,
        subplots: &[Subplot],
        candidates: &BTreeMap<usize, Vec<Candidate>>,
        duration: f64,
    ) -> AllocationReport {
        let mut report = AllocationReport::default();
        let n = subplots.len();
        if n == 0 {
            return report;
        }

        let mut intervals = IntervalSet::new(self.config.buffer_secs);
        let mut consumed_frames: HashSet<u64> = HashSet::new();

        for (position, subplot) in subplots.iter().enumerate() {
            if subplot.voice_duration <= 0.0 {
                tracing::warn!(
                    "Subplot {}: invalid voice duration {:.3}s, allocation rejected",
                    subplot.index,
                    subplot.voice_duration
                );
                report.rejected.push(RejectedAllocation {
                    subplot_index: subplot.index,
                    reason: format!("voice duration {:.3}s is not positive", subplot.voice_duration),
                });
                continue;
            }

            let ranked = candidates.get(&subplot.index).map(Vec::as_slice).unwrap_or(&[]);
            let clip = self.allocate_one(
                subplot,
                position + 1,
                ranked,
                &mut intervals,
                &mut consumed_frames,
                duration,
                n,
            );

            intervals.commit(clip.segment);
            report.clips.push(clip);
        }

        report
    }

    /// `zone_position` is the subplot's 1-based position in the run's
    /// slice, not its raw index: indices can be sparse when upstream data
    /// is missing, and the zone partition must still cover the timeline.
    #[allow(clippy::too_many_arguments)]
    fn allocate_one(
        &self,
        subplot: &Subplot,
        zone_position: usize,
        ranked: &[Candidate],
        intervals: &IntervalSet,
        consumed_frames: &mut HashSet<u64>,
        duration: f64,
        n: usize,
    ) -> PlannedClip {
        let voice_duration = subplot.voice_duration;

        // Candidate phase: best-scored frame whose speculative segment is
        // clear and whose frame id has not been claimed by an earlier
        // subplot.
        for candidate in ranked {
            if consumed_frames.contains(&candidate.frame_id) {
                continue;
            }
            let start = candidate.timestamp;
            if intervals.overlaps(start, start + voice_duration) {
                continue;
            }

            consumed_frames.insert(candidate.frame_id);
            tracing::debug!(
                "Subplot {}: candidate frame {} (score {:.4}) at {:.2}s",
                subplot.index,
                candidate.frame_id,
                candidate.score,
                start
            );
            return self.clamp(
                subplot.index,
                start,
                voice_duration,
                duration,
                SegmentSource::Candidate {
                    frame_id: candidate.frame_id,
                    score: candidate.score,
                },
                false,
            );
        }

        // Fallback phase: deterministic zone probing.
        let probe = probe_zone(
            zone_position,
            n,
            duration,
            voice_duration,
            intervals,
            self.config.probe_step_secs,
            self.config.max_probe_attempts,
        );

        if probe.exhausted {
            tracing::warn!(
                "Subplot {}: fallback exhausted after {} probes, accepting overlap at {:.2}s",
                subplot.index,
                probe.attempts,
                probe.start
            );
        } else {
            tracing::debug!(
                "Subplot {}: zone fallback at {:.2}s ({} probes)",
                subplot.index,
                probe.start,
                probe.attempts
            );
        }

        self.clamp(
            subplot.index,
            probe.start,
            voice_duration,
            duration,
            SegmentSource::Zone {
                probe_attempts: probe.attempts,
            },
            probe.exhausted,
        )
    }

    /// Pin the segment inside `[0, duration)`, preserving length unless
    /// the source itself is shorter than the voice-over.
    fn clamp(
        &self,
        subplot_index: usize,
        start: f64,
        voice_duration: f64,
        duration: f64,
        source: SegmentSource,
        overlap: bool,
    ) -> PlannedClip {
        let mut start = start;
        let mut end = start + voice_duration;
        let mut shortened = false;

        if end > duration {
            end = duration;
            start = (end - voice_duration).max(0.0);
            if duration < voice_duration {
                // Accepted degradation: the clip runs the whole source
                // and is shorter than requested.
                shortened = true;
                tracing::warn!(
                    "Subplot {}: source ({:.2}s) shorter than voice-over ({:.2}s), clip truncated",
                    subplot_index,
                    duration,
                    voice_duration
                );
            }
        }

        PlannedClip {
            segment: Segment {
                subplot_index,
                start,
                end,
            },
            source,
            overlap,
            shortened,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subplots(durations: &[f64]) -> Vec<Subplot> {
        durations
            .iter()
            .enumerate()
            .map(|(i, &voice_duration)| Subplot {
                index: i + 1,
                text: format!("beat {}", i + 1),
                voice_duration,
            })
            .collect()
    }

    fn candidate(score: f64, timestamp: f64, frame_id: u64) -> Candidate {
        Candidate {
            score,
            timestamp,
            frame_id,
        }
    }

    fn allocator() -> SegmentAllocator {
        SegmentAllocator::new(AllocatorConfig::default())
    }

    /// Pairwise buffered-overlap check over all committed clips.
    fn assert_no_excess_overlap(report: &AllocationReport, buffer: f64) {
        for (i, a) in report.clips.iter().enumerate() {
            for b in report.clips.iter().skip(i + 1) {
                if a.overlap || b.overlap {
                    continue;
                }
                let (a, b) = (a.segment, b.segment);
                assert!(
                    a.end <= b.start + buffer || b.end <= a.start + buffer,
                    "segments {:?} and {:?} overlap beyond buffer",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn empty_subplot_list_allocates_nothing() {
        let report = allocator().allocate(&[], &BTreeMap::new(), 60.0);
        assert!(report.clips.is_empty());
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn zoning_distributes_without_candidates() {
        // 3 subplots, 30s source, 8s voice each, no candidates:
        // zone starts at 0, 10, 20.
        let report = allocator().allocate(&subplots(&[8.0, 8.0, 8.0]), &BTreeMap::new(), 30.0);

        assert_eq!(report.clips.len(), 3);
        let starts: Vec<f64> = report.clips.iter().map(|c| c.segment.start).collect();
        assert_eq!(starts, vec![0.0, 10.0, 20.0]);
        for clip in &report.clips {
            assert!((clip.segment.duration() - 8.0).abs() < 1e-9);
            assert!(!clip.overlap);
        }
        assert_no_excess_overlap(&report, 2.0);
    }

    #[test]
    fn sparse_subplot_indices_zone_by_position() {
        // Subplot 1 lost its voice measurement upstream, so the run
        // carries only subplots 2 and 4. Zoning must partition by slice
        // position, keeping both segments on the timeline.
        let sparse = vec![
            Subplot {
                index: 2,
                text: "beat 2".to_string(),
                voice_duration: 8.0,
            },
            Subplot {
                index: 4,
                text: "beat 4".to_string(),
                voice_duration: 8.0,
            },
        ];

        let report = allocator().allocate(&sparse, &BTreeMap::new(), 60.0);

        assert_eq!(report.clips.len(), 2);
        assert_eq!(report.clips[0].segment.subplot_index, 2);
        assert_eq!(report.clips[0].segment.start, 0.0);
        assert_eq!(report.clips[1].segment.subplot_index, 4);
        assert_eq!(report.clips[1].segment.start, 30.0);
        for clip in &report.clips {
            assert!(clip.segment.end <= 60.0);
            assert!(!clip.overlap);
        }
    }

    #[test]
    fn top_candidate_wins_when_clear() {
        let mut candidates = BTreeMap::new();
        candidates.insert(1, vec![candidate(0.9, 40.0, 960), candidate(0.5, 10.0, 240)]);

        let report = allocator().allocate(&subplots(&[8.0]), &candidates, 60.0);
        let clip = &report.clips[0];
        assert_eq!(clip.segment.start, 40.0);
        assert_eq!(
            clip.source,
            SegmentSource::Candidate {
                frame_id: 960,
                score: 0.9
            }
        );
    }

    #[test]
    fn conflicting_top_candidate_yields_to_second_rank() {
        // Subplot 1 commits [10, 18). Subplot 2's top candidate starts at
        // 12 (conflict); its second-ranked starts at 40 (clear) and must win.
        let mut candidates = BTreeMap::new();
        candidates.insert(1, vec![candidate(0.95, 10.0, 240)]);
        candidates.insert(2, vec![candidate(0.9, 12.0, 288), candidate(0.8, 40.0, 960)]);

        let report = allocator().allocate(&subplots(&[8.0, 8.0]), &candidates, 60.0);

        assert_eq!(report.clips[0].segment.start, 10.0);
        let second = &report.clips[1];
        assert_eq!(second.segment.start, 40.0);
        assert_eq!(
            second.source,
            SegmentSource::Candidate {
                frame_id: 960,
                score: 0.8
            }
        );
    }

    #[test]
    fn consumed_frame_id_is_never_reused() {
        // Both subplots rank the same frame first; the second must skip it
        // even though the duplicated entry sits far from subplot 1's pick.
        let mut candidates = BTreeMap::new();
        candidates.insert(1, vec![candidate(0.9, 5.0, 120)]);
        candidates.insert(2, vec![candidate(0.9, 5.0, 120), candidate(0.7, 30.0, 720)]);

        let report = allocator().allocate(&subplots(&[6.0, 6.0]), &candidates, 60.0);

        let picked: Vec<_> = report
            .clips
            .iter()
            .filter_map(|c| match c.source {
                SegmentSource::Candidate { frame_id, .. } => Some(frame_id),
                SegmentSource::Zone { .. } => None,
            })
            .collect();
        assert_eq!(picked, vec![120, 720]);
    }

    #[test]
    fn segments_stay_inside_timeline() {
        let mut candidates = BTreeMap::new();
        // Candidate so late the segment must be pulled back.
        candidates.insert(1, vec![candidate(0.9, 57.0, 1368)]);

        let report = allocator().allocate(&subplots(&[8.0]), &candidates, 60.0);
        let seg = report.clips[0].segment;
        assert_eq!(seg.end, 60.0);
        assert_eq!(seg.start, 52.0);
        assert!((seg.duration() - 8.0).abs() < 1e-9);
        assert!(!report.clips[0].shortened);
    }

    #[test]
    fn source_shorter_than_voice_truncates_and_reports() {
        let report = allocator().allocate(&subplots(&[12.0]), &BTreeMap::new(), 10.0);
        let clip = &report.clips[0];
        assert_eq!(clip.segment.start, 0.0);
        assert_eq!(clip.segment.end, 10.0);
        assert!(clip.shortened);
    }

    #[test]
    fn invalid_voice_duration_rejects_only_that_subplot() {
        let report = allocator().allocate(&subplots(&[8.0, 0.0, 8.0]), &BTreeMap::new(), 60.0);

        assert_eq!(report.clips.len(), 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].subplot_index, 2);
        // Remaining subplots keep their own zones.
        assert_eq!(report.clips[0].segment.subplot_index, 1);
        assert_eq!(report.clips[1].segment.subplot_index, 3);
    }

    #[test]
    fn exhausted_fallback_is_observable_not_fatal() {
        // Voice-overs so long the 30s timeline cannot hold three of them:
        // later subplots end in best-effort overlapping placements.
        let report = allocator().allocate(&subplots(&[14.0, 14.0, 14.0]), &BTreeMap::new(), 30.0);

        assert_eq!(report.clips.len(), 3);
        assert!(report.overlapping().count() >= 1);
        for clip in &report.clips {
            assert!(clip.segment.start >= 0.0);
            assert!(clip.segment.end <= 30.0);
        }
    }

    #[test]
    fn full_pass_properties_hold() {
        let mut candidates = BTreeMap::new();
        candidates.insert(1, vec![candidate(0.9, 100.0, 2400)]);
        candidates.insert(3, vec![candidate(0.8, 101.0, 2424), candidate(0.6, 30.0, 720)]);

        let report = allocator().allocate(&subplots(&[10.0, 7.5, 9.0, 6.0]), &candidates, 240.0);

        assert_eq!(report.clips.len(), 4);
        assert_no_excess_overlap(&report, 2.0);
        for clip in &report.clips {
            assert!(clip.segment.start >= 0.0);
            assert!(clip.segment.end <= 240.0);
            assert!(!clip.shortened);
        }
        // Duration preserved exactly when the source is long enough.
        assert!((report.clips[1].segment.duration() - 7.5).abs() < 1e-9);
    }
}
