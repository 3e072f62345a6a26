//! anchorplace - single-anchor object placement for tracked spatial scenes
//!
//! Headless driver: plays an event script against the simulated tracking
//! session and scene graph, one tracking update per tick.

mod config;
mod event_script;
mod headless;

use anyhow::Result;
use config::PlacementConfig;
use headless::HeadlessConfig;
use std::{env, path::PathBuf};
use tracing::info;

const DEFAULT_MAX_TICKS: u64 = 300;

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting anchorplace v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOptions::parse(env::args().skip(1));
    let config = match cli.config.as_deref() {
        Some(path) => PlacementConfig::load_from_path(path),
        None => PlacementConfig::load(),
    };
    if let Some(path) = cli.save_config.as_deref() {
        config.save_to_path(path)?;
        info!(path = %path.display(), "wrote effective placement config");
    }

    let summary = headless::run(HeadlessConfig {
        config,
        event_script: cli.event_script,
        max_ticks: cli.max_ticks,
        seed: cli.seed,
        event_log: cli.event_log,
        metrics_out: cli.metrics_out,
    })?;

    let placement = summary.placement_metrics();
    if !placement.is_clean() {
        anyhow::bail!(
            "session leaked resources: {} anchors, {} nodes, {} double detaches",
            placement.leaked_anchors,
            placement.leaked_nodes,
            placement.double_detaches
        );
    }

    Ok(())
}

struct CliOptions {
    config: Option<PathBuf>,
    save_config: Option<PathBuf>,
    event_script: Option<PathBuf>,
    max_ticks: u64,
    seed: u64,
    event_log: Option<PathBuf>,
    metrics_out: Option<PathBuf>,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut opts = CliOptions {
            config: None,
            save_config: None,
            event_script: None,
            max_ticks: DEFAULT_MAX_TICKS,
            seed: 0,
            event_log: None,
            metrics_out: None,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    if let Some(path) = args.next() {
                        opts.config = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--config requires a file path");
                    }
                }
                "--save-config" => {
                    if let Some(path) = args.next() {
                        opts.save_config = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--save-config requires a file path");
                    }
                }
                "--event-script" => {
                    if let Some(path) = args.next() {
                        opts.event_script = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--event-script requires a file path");
                    }
                }
                "--max-ticks" => {
                    if let Some(raw) = args.next() {
                        match raw.parse::<u64>() {
                            Ok(value) => opts.max_ticks = value,
                            Err(err) => {
                                tracing::error!(%err, value = %raw, "--max-ticks must be an integer");
                            }
                        }
                    } else {
                        tracing::error!("--max-ticks requires an integer");
                    }
                }
                "--seed" => {
                    if let Some(raw) = args.next() {
                        match raw.parse::<u64>() {
                            Ok(value) => opts.seed = value,
                            Err(err) => {
                                tracing::error!(%err, value = %raw, "--seed must be an integer");
                            }
                        }
                    } else {
                        tracing::error!("--seed requires an integer");
                    }
                }
                "--event-log" => {
                    if let Some(path) = args.next() {
                        opts.event_log = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--event-log requires a file path");
                    }
                }
                "--metrics-out" => {
                    if let Some(path) = args.next() {
                        opts.metrics_out = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--metrics-out requires a file path");
                    }
                }
                other => {
                    tracing::warn!(arg = %other, "ignoring unknown argument");
                }
            }
        }

        opts
    }
}
