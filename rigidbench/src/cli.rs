use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rigidbench_core::{BenchConfig, MotionQuality};

/// Every flag is optional; without any the standard sweep runs.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "rigidbench")]
#[command(about = "Rapier throughput benchmark: thread count x motion quality sweep", long_about = None)]
pub struct Cli {
    /// Config file (.toml, otherwise YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Steps per run
    #[arg(short, long)]
    pub iterations: Option<usize>,

    /// Lowest thread count of the sweep
    #[arg(long)]
    pub min_threads: Option<usize>,

    /// Highest thread count of the sweep (defaults to the logical CPU count)
    #[arg(long)]
    pub max_threads: Option<usize>,

    /// Motion qualities to sweep, in order (discrete, ccd)
    #[arg(short, long, value_delimiter = ',')]
    pub motion_quality: Vec<MotionQuality>,

    /// Directory for the per-frame timing CSVs
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Skip per-frame timing CSVs
    #[arg(long, default_value_t = false)]
    pub no_per_frame: bool,

    /// Write a JSON summary of the sweep
    #[arg(long)]
    pub summary_json: Option<PathBuf>,

    /// Small scene and few steps, for smoke testing
    #[arg(long, default_value_t = false, conflicts_with = "config")]
    pub quick: bool,

    /// Skip the sweep (only useful with --visualize)
    #[arg(long, default_value_t = false)]
    pub no_sweep: bool,

    /// Open the interactive viewer after the sweep
    #[arg(long, default_value_t = false)]
    pub visualize: bool,
}

impl Cli {
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Base config (file, `--quick` preset or defaults) with flags applied on top
    pub fn resolve_config(&self) -> Result<BenchConfig> {
        let mut config = match &self.config {
            Some(path) => BenchConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None if self.quick => BenchConfig::quick(),
            None => BenchConfig::default(),
        };

        if let Some(iterations) = self.iterations {
            config.iterations = iterations;
        }
        if let Some(min) = self.min_threads {
            config.min_threads = min;
        }
        if let Some(max) = self.max_threads {
            config.max_threads = Some(max);
        }
        if !self.motion_quality.is_empty() {
            config.motion_qualities = self.motion_quality.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if self.no_per_frame {
            config.record_per_frame = false;
        }
        if let Some(path) = &self.summary_json {
            config.summary_json = Some(path.clone());
        }

        config.validate().context("Invalid benchmark configuration")?;
        Ok(config)
    }
}
