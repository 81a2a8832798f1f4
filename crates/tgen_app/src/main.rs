use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};

use tgen_core::allocation::{load_candidates, SegmentAllocator};
use tgen_core::config::{ConfigManager, Settings};
use tgen_core::logging::{init_tracing, LogConfig, LogLevel, RunLogger};
use tgen_core::media::probe_video;
use tgen_core::models::{Candidate, SegmentSource, VideoInfo};
use tgen_core::orchestrator::{create_standard_pipeline, CheckpointStore, Context};
use tgen_core::project::{load_subplots, ProjectLayout};

/// Trailer Gen command line front end.
#[derive(Parser, Debug)]
#[command(name = "trailer-gen", author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "trailer-gen.toml")]
    config: String,

    /// Verbose logging (stage subprocess output passed through)
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the pipeline, resuming from the last completed stage
    Run {
        /// Clear all completion markers and start from the beginning
        #[arg(long)]
        fresh: bool,
    },

    /// Show which stages are complete
    Status,

    /// Clear all completion markers
    Reset,

    /// Run segment allocation only and print the planned clips
    Plan,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(if cli.debug {
        LogLevel::Debug
    } else {
        LogLevel::Info
    });

    let mut config = ConfigManager::new(&cli.config);
    config
        .load_or_create()
        .with_context(|| format!("loading configuration from {}", cli.config))?;
    let settings = config.settings().clone();
    let layout = ProjectLayout::from_settings(&settings.paths);

    match cli.command {
        Commands::Run { fresh } => cmd_run(settings, layout, fresh, cli.debug),
        Commands::Status => cmd_status(layout),
        Commands::Reset => cmd_reset(layout),
        Commands::Plan => cmd_plan(settings, layout),
    }
}

fn cmd_run(
    settings: Settings,
    layout: ProjectLayout,
    fresh: bool,
    debug: bool,
) -> anyhow::Result<()> {
    let pipeline = create_standard_pipeline();

    if fresh {
        let store = CheckpointStore::new(layout.checkpoints_dir());
        let removed = store.clear_all().context("clearing completion markers")?;
        if removed > 0 {
            println!("Cleared {} completion markers", removed);
        }
    }

    let run_name = settings.paths.project_name.clone();
    let log_config = if debug {
        LogConfig::debug()
    } else {
        LogConfig {
            compact: settings.logging.compact,
            error_tail: settings.logging.error_tail as usize,
            ..LogConfig::default()
        }
    };
    let log_dir = layout.root().join(&settings.paths.logs_folder);
    let logger = Arc::new(
        RunLogger::new(
            &run_name,
            &log_dir,
            log_config,
            Some(Box::new(|line: &str| println!("{}", line))),
        )
        .context("creating run logger")?,
    );

    let ctx = Context::new(settings, layout, run_name, logger);
    let result = pipeline.run(&ctx)?;

    println!(
        "Done: {} stages run, {} already complete",
        result.stages_completed, result.stages_skipped
    );
    Ok(())
}

fn cmd_status(layout: ProjectLayout) -> anyhow::Result<()> {
    let pipeline = create_standard_pipeline();
    let store = CheckpointStore::new(layout.checkpoints_dir());

    let slugs = pipeline.stage_slugs();
    let names = pipeline.stage_names();
    let resume = store.resume_point(&slugs);

    println!("Project: {}", layout.root().display());
    for (i, (slug, name)) in slugs.iter().zip(&names).enumerate() {
        let ordinal = i + 1;
        let state = match store.read_marker(ordinal, slug) {
            Some(marker) => format!("done  ({})", marker.completed_at),
            None if ordinal < resume => "done".to_string(),
            None => "pending".to_string(),
        };
        println!("  {}. {:<18} {}", ordinal, name, state);
    }

    if resume > slugs.len() {
        println!("All stages complete.");
    } else {
        println!("Next run resumes at stage {} ({}).", resume, names[resume - 1]);
    }
    Ok(())
}

fn cmd_reset(layout: ProjectLayout) -> anyhow::Result<()> {
    let store = CheckpointStore::new(layout.checkpoints_dir());
    let removed = store.clear_all().context("clearing completion markers")?;
    println!("Cleared {} completion markers", removed);
    Ok(())
}

fn cmd_plan(settings: Settings, layout: ProjectLayout) -> anyhow::Result<()> {
    let video = resolve_video_info(&settings, &layout)?;

    let subplots = load_subplots(&layout).context("loading subplots")?;
    if subplots.is_empty() {
        bail!("no subplots with measured voice durations; run the pipeline first");
    }

    let mut candidates: BTreeMap<usize, Vec<Candidate>> = BTreeMap::new();
    for subplot in &subplots {
        let ranked = load_candidates(&layout.candidate_dir(subplot.index), video.fps);
        candidates.insert(subplot.index, ranked);
    }

    let allocator = SegmentAllocator::new(settings.allocation.allocator_config());
    let report = allocator.allocate(&subplots, &candidates, video.duration);

    println!(
        "Source: {:.1}s at {:.3} fps, {} subplots",
        video.duration,
        video.fps,
        subplots.len()
    );
    for clip in &report.clips {
        let origin = match clip.source {
            SegmentSource::Candidate { frame_id, score } => {
                format!("frame {} (score {:.4})", frame_id, score)
            }
            SegmentSource::Zone { probe_attempts } => {
                format!("zone fallback ({} probes)", probe_attempts)
            }
        };
        let mut flags = String::new();
        if clip.overlap {
            flags.push_str("  [overlap]");
        }
        if clip.shortened {
            flags.push_str("  [shortened]");
        }
        println!(
            "  subplot {}: {:8.2}s - {:8.2}s  via {}{}",
            clip.segment.subplot_index, clip.segment.start, clip.segment.end, origin, flags
        );
    }
    for rejected in &report.rejected {
        println!(
            "  subplot {}: rejected: {}",
            rejected.subplot_index, rejected.reason
        );
    }
    Ok(())
}

fn resolve_video_info(settings: &Settings, layout: &ProjectLayout) -> anyhow::Result<VideoInfo> {
    let alloc = &settings.allocation;
    if let (Some(duration), Some(fps)) = (alloc.duration_override, alloc.fps_override) {
        return Ok(VideoInfo { duration, fps });
    }

    let probed = probe_video(&layout.video_path())
        .with_context(|| format!("probing {}", layout.video_path().display()))?;
    Ok(VideoInfo {
        duration: alloc.duration_override.unwrap_or(probed.duration),
        fps: alloc.fps_override.unwrap_or(probed.fps),
    })
}
