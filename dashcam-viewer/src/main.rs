mod config;
mod errors;
mod player;
mod prober;
mod scanner;

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use common::ClipCategory;
use dashcam_core::event::event_marker;
use dashcam_core::format::{
    format_absolute_time, format_clip_timestamp, format_duration, format_time, format_time_range,
};
use dashcam_core::library::group_clips_by_day;
use dashcam_core::{Clip, ClipAssembler, ClipSegmenter, TimelineBuilder};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::ViewerConfig;
use crate::player::HeadlessPlayer;
use crate::scanner::{detect_layout, LibraryLayout, LibraryScanner};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志 - 使用环境变量 RUST_LOG 控制级别
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let matches = cli().get_matches();

    let config_path = matches.get_one::<PathBuf>("config");
    let config = ViewerConfig::load(config_path.map(PathBuf::as_path)).await?;
    if let Some(path) = config_path {
        info!("✓ Configuration loaded from {:?}", path);
    }

    let scanner = LibraryScanner::new(
        prober::from_config(&config.probe),
        ClipSegmenter::new(config.segmenter.clone()),
        config.probe.fallback_duration_secs,
    );

    match matches.subcommand() {
        Some(("scan", sub)) => scan(&scanner, &config, required_dir(sub)?, sub.get_flag("json")).await,
        Some(("inspect", sub)) => {
            let clip = load_clip(&scanner, &config, required_dir(sub)?, clip_number(sub)).await?;
            inspect(&clip);
            Ok(())
        }
        Some(("play", sub)) => {
            let clip = load_clip(&scanner, &config, required_dir(sub)?, clip_number(sub)).await?;
            play(
                &config,
                &clip,
                sub.get_one::<f64>("rate").copied(),
                sub.get_one::<f64>("seek").copied(),
            )
            .await
        }
        _ => bail!("No sub-command given, see --help"),
    }
}

fn cli() -> Command {
    let dir_arg = Arg::new("dir")
        .value_name("DIR")
        .help("TeslaCam root or clip folder")
        .value_parser(value_parser!(PathBuf))
        .required(true);

    let clip_arg = Arg::new("clip")
        .long("clip")
        .value_name("N")
        .help("Clip to open when the folder holds several sessions (1-based)")
        .value_parser(value_parser!(usize))
        .default_value("1");

    Command::new("dashcam-viewer")
        .version("1.0")
        .about("Multi-camera dashcam clip viewer")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML configuration file")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .subcommand(
            Command::new("scan")
                .about("List the clips in a TeslaCam root or clip folder")
                .arg(dir_arg.clone())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the library index as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Show the footages and timeline of one clip")
                .arg(dir_arg.clone())
                .arg(clip_arg.clone()),
        )
        .subcommand(
            Command::new("play")
                .about("Play a clip headlessly against simulated cameras")
                .arg(dir_arg)
                .arg(clip_arg)
                .arg(
                    Arg::new("rate")
                        .short('r')
                        .long("rate")
                        .value_name("RATE")
                        .help("Playback rate")
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("seek")
                        .short('s')
                        .long("seek")
                        .value_name("SECONDS")
                        .help("Start position on the clip timeline")
                        .value_parser(value_parser!(f64)),
                ),
        )
}

fn required_dir(matches: &ArgMatches) -> Result<&Path> {
    matches
        .get_one::<PathBuf>("dir")
        .map(PathBuf::as_path)
        .context("Missing directory argument")
}

fn clip_number(matches: &ArgMatches) -> usize {
    matches.get_one::<usize>("clip").copied().unwrap_or(1)
}

async fn scan(scanner: &LibraryScanner, config: &ViewerConfig, dir: &Path, json: bool) -> Result<()> {
    match detect_layout(dir)? {
        LibraryLayout::Root { .. } => {
            let index = scanner.scan_library(dir).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&index)?);
                return Ok(());
            }
            info!("✓ Found {} clip(s) in {:?}", index.total_clips(), dir);

            for category in ClipCategory::ALL {
                let clips = index.category(category);
                if clips.is_empty() {
                    continue;
                }
                info!("{} ({})", category.directory_name(), clips.len());
                for day in group_clips_by_day(clips) {
                    info!("  {}", day.date_label);
                    for clip in &day.clips {
                        info!(
                            "    {}  {}  {} camera(s){}",
                            format_clip_timestamp(clip.timestamp),
                            format_duration(clip.duration),
                            clip.cameras.len(),
                            if clip.has_event { "  [event]" } else { "" }
                        );
                    }
                }
            }
        }
        LibraryLayout::SingleClip { clip_dir } => {
            let files = scanner.scan_directory(&clip_dir, false).await?;
            let analysis = ClipSegmenter::new(config.segmenter.clone()).analyze(&files);
            info!("✓ Clip folder {:?} holds {} session(s)", clip_dir, analysis.clips.len());
            for (i, clip) in analysis.clips.iter().enumerate() {
                info!(
                    "  {}. {}  {} footage(s), ~{}",
                    i + 1,
                    format_time_range(clip.start_time, clip.end_time),
                    clip.footage_count,
                    format_duration(clip.total_duration)
                );
            }
        }
        LibraryLayout::Invalid => bail!("No valid Tesla dashcam folders or video files found."),
    }
    Ok(())
}

/// Resolve `dir` to a clip folder and assemble session `clip_number`
async fn load_clip(
    scanner: &LibraryScanner,
    config: &ViewerConfig,
    dir: &Path,
    clip_number: usize,
) -> Result<Clip> {
    let clip_dir = match detect_layout(dir)? {
        LibraryLayout::SingleClip { clip_dir } => clip_dir,
        LibraryLayout::Root { .. } => {
            bail!("{:?} is a TeslaCam root, pass one of its clip folders instead", dir)
        }
        LibraryLayout::Invalid => bail!("No valid Tesla dashcam folders or video files found."),
    };

    let loaded = scanner.load_clip(&clip_dir).await?;
    let analysis = ClipSegmenter::new(config.segmenter.clone()).analyze(&loaded.files);

    let (files, event) = match analysis.single_clip_files {
        Some(files) => (files, loaded.event),
        None => {
            let count = analysis.clips.len();
            let detected = clip_number
                .checked_sub(1)
                .and_then(|i| analysis.clips.into_iter().nth(i))
                .with_context(|| format!("Clip {} does not exist, folder holds {}", clip_number, count))?;
            info!("Opening session {}/{} of {:?}", clip_number, count, clip_dir);
            (detected.files, None)
        }
    };

    let result = ClipAssembler::new(config.grouping.clone()).process(&files, &loaded.directory_name, event);
    for warning in &result.warnings {
        warn!("⚠️  {}", warning);
    }
    if let Some(error) = result.errors.first() {
        bail!("{}", error);
    }
    result.clip.context("Clip assembly produced no clip")
}

fn inspect(clip: &Clip) {
    let timeline = TimelineBuilder::build_from_clip(clip);

    info!("Clip {} ({})", clip.id, clip.directory_name);
    info!("  {}", format_time_range(clip.start_time, clip.end_time));
    info!(
        "  {} footage(s), {}, {} bytes",
        clip.total_footages,
        format_duration(clip.total_duration),
        clip.total_size
    );

    for boundary in &timeline.boundaries {
        let Some(footage) = timeline.footage(boundary.footage_index) else {
            continue;
        };
        let cameras: Vec<&str> = footage
            .available_cameras
            .iter()
            .map(|camera| camera.display_name())
            .collect();
        info!(
            "  {:>3}. {}  {} - {}  [{}]",
            boundary.footage_index + 1,
            footage.timestamp_key,
            format_time(boundary.start_time),
            format_time(boundary.end_time),
            cameras.join(" ")
        );
    }

    if let Some(event) = &clip.event {
        info!("  Event: {} {}", event.reason_text(), event.city);
        match event_marker(&timeline) {
            Some(marker) => info!(
                "  Event marker at {} ({:.1}%), recorded {}",
                format_time(marker.seconds),
                marker.percentage,
                timeline
                    .start_date()
                    .map(|start| format_absolute_time(start, marker.seconds))
                    .unwrap_or_default()
            ),
            None => info!("  Event falls outside the recorded footage"),
        }
    }
}

async fn play(config: &ViewerConfig, clip: &Clip, rate: Option<f64>, seek: Option<f64>) -> Result<()> {
    let timeline = TimelineBuilder::build_from_clip(clip);
    let mut player = HeadlessPlayer::new(config);
    player.load(timeline, rate, seek)?;

    info!("🎥 Playing {} ({})", clip.id, format_duration(clip.total_duration));
    let report = player.run().await?;
    info!(
        "✅ Finished in state {:?} at {} after {} footage change(s)",
        report.final_state,
        format_time(report.final_time),
        report.footage_transitions
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        cli().debug_assert();
    }

    #[test]
    fn test_play_arguments() {
        let matches = cli()
            .try_get_matches_from([
                "dashcam-viewer",
                "play",
                "/media/TeslaCam/SavedClips/2024-06-19_14-31-00",
                "--rate",
                "2",
                "--seek",
                "42.5",
                "--config",
                "viewer.toml",
            ])
            .unwrap();

        assert_eq!(
            matches.get_one::<PathBuf>("config"),
            Some(&PathBuf::from("viewer.toml"))
        );
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "play");
        assert_eq!(sub.get_one::<f64>("rate"), Some(&2.0));
        assert_eq!(sub.get_one::<f64>("seek"), Some(&42.5));
        assert_eq!(clip_number(sub), 1);
    }
}
