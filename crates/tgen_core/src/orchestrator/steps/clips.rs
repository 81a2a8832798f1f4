//! Clip planning and cutting stage.
//!
//! The only stage with in-process logic: it runs the segment allocator
//! over the measured voice durations and ranked frames, writes the plan
//! to `clips/clip_plan.json`, then hands the actual cutting to the
//! external tool.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::allocation::{load_candidates, AllocationReport, SegmentAllocator};
use crate::models::{Candidate, PlannedClip, VideoInfo};
use crate::orchestrator::errors::{StageError, StageResult};
use crate::orchestrator::runner::run_stage_command;
use crate::orchestrator::stage::PipelineStage;
use crate::orchestrator::types::Context;
use crate::project::{load_scene_boundaries, load_subplots};

/// Persisted allocation outcome, consumed by the cutter and the audio
/// and assembly stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipPlan {
    pub video: VideoInfo,
    pub clips: Vec<PlannedClip>,
    pub rejected: Vec<RejectedSubplot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedSubplot {
    pub subplot_index: usize,
    pub reason: String,
}

/// Plans one timeline segment per subplot and cuts the clips.
pub struct ClipsStage;

impl PipelineStage for ClipsStage {
    fn name(&self) -> &str {
        "Clip creation"
    }

    fn slug(&self) -> &str {
        "clips"
    }

    fn description(&self) -> &str {
        "Allocate timeline segments and cut the source into clips"
    }

    fn validate_input(&self, ctx: &Context) -> StageResult<()> {
        let durations = ctx.layout.durations_json();
        if !durations.exists() {
            return Err(StageError::FileNotFound {
                path: durations.display().to_string(),
            });
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context) -> StageResult<()> {
        let video = resolve_video_info(ctx)?;
        ctx.logger.info(&format!(
            "Source: {:.1}s at {:.3} fps",
            video.duration, video.fps
        ));

        let subplots = load_subplots(&ctx.layout)?;
        if subplots.is_empty() {
            return Err(StageError::invalid_input(
                "no subplots with measured voice durations; nothing to allocate",
            ));
        }

        let scenes = load_scene_boundaries(&ctx.layout)?;
        if !scenes.is_empty() {
            ctx.logger
                .info(&format!("{} detected scene boundaries", scenes.len()));
        }

        let mut candidates: BTreeMap<usize, Vec<Candidate>> = BTreeMap::new();
        for subplot in &subplots {
            let dir = ctx.layout.candidate_dir(subplot.index);
            let ranked = load_candidates(&dir, video.fps);
            if ranked.is_empty() {
                ctx.logger.warn(&format!(
                    "Subplot {}: no ranked frames, will use zone fallback",
                    subplot.index
                ));
            }
            candidates.insert(subplot.index, ranked);
        }

        let allocator = SegmentAllocator::new(ctx.settings.allocation.allocator_config());
        let report = allocator.allocate(&subplots, &candidates, video.duration);
        log_report(ctx, &report);

        write_clip_plan(ctx, &video, &report)?;

        let argv = ctx.settings.stages.command_for(self.slug());
        run_stage_command(ctx, self.slug(), &argv)?;
        Ok(())
    }

    fn inputs(&self, ctx: &Context) -> Vec<PathBuf> {
        vec![ctx.layout.durations_json(), ctx.layout.scenes_json()]
    }
}

/// Source duration and frame rate, from overrides or ffprobe.
fn resolve_video_info(ctx: &Context) -> StageResult<VideoInfo> {
    let alloc = &ctx.settings.allocation;
    if let (Some(duration), Some(fps)) = (alloc.duration_override, alloc.fps_override) {
        return Ok(VideoInfo { duration, fps });
    }

    let probed = crate::media::probe_video(&ctx.layout.video_path())?;
    Ok(VideoInfo {
        duration: alloc.duration_override.unwrap_or(probed.duration),
        fps: alloc.fps_override.unwrap_or(probed.fps),
    })
}

fn log_report(ctx: &Context, report: &AllocationReport) {
    for clip in &report.clips {
        ctx.logger.info(&format!(
            "Subplot {}: {:.2}s - {:.2}s",
            clip.segment.subplot_index, clip.segment.start, clip.segment.end
        ));
        if clip.shortened {
            ctx.logger.warn(&format!(
                "Subplot {}: segment shortened to fit the source",
                clip.segment.subplot_index
            ));
        }
    }
    for clip in report.overlapping() {
        ctx.logger.warn(&format!(
            "Subplot {}: placement overlaps an earlier segment (fallback exhausted)",
            clip.segment.subplot_index
        ));
    }
    for rejected in &report.rejected {
        ctx.logger.warn(&format!(
            "Subplot {}: allocation rejected: {}",
            rejected.subplot_index, rejected.reason
        ));
    }
}

fn write_clip_plan(ctx: &Context, video: &VideoInfo, report: &AllocationReport) -> StageResult<()> {
    let plan = ClipPlan {
        video: *video,
        clips: report.clips.clone(),
        rejected: report
            .rejected
            .iter()
            .map(|r| RejectedSubplot {
                subplot_index: r.subplot_index,
                reason: r.reason.clone(),
            })
            .collect(),
    };

    let path = ctx.layout.clip_plan_json();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StageError::io("create clips dir", e))?;
    }
    let body = serde_json::to_string_pretty(&plan).map_err(|e| StageError::Parse {
        what: "clip plan".to_string(),
        message: e.to_string(),
    })?;
    fs::write(&path, body).map_err(|e| StageError::io("write clip plan", e))?;

    ctx.logger.info(&format!(
        "Wrote plan for {} clips to {}",
        plan.clips.len(),
        path.display()
    ));
    Ok(())
}
