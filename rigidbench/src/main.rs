//! rigidbench - Rapier throughput benchmark
//!
//! Runs the motion quality x thread count sweep, prints a steps/second table
//! and optionally opens the interactive viewer.

use anyhow::Result;
use rigidbench::{init_logging, run_sweep, Cli};
use rigidbench_core::BenchConfig;
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = cli.resolve_config()?;
    info!(
        "rigidbench: {} iterations per run, threads {:?}, motion qualities {:?}",
        config.iterations,
        config.thread_counts(),
        config.motion_qualities
    );

    if !cli.no_sweep {
        run_sweep(&config)?;
    }

    if cli.visualize {
        run_viewer(&config)?;
    }

    Ok(())
}

#[cfg(feature = "visual")]
fn run_viewer(config: &BenchConfig) -> Result<()> {
    rigidbench::viewer::run(config)
}

#[cfg(not(feature = "visual"))]
fn run_viewer(_config: &BenchConfig) -> Result<()> {
    anyhow::bail!("built without the `visual` feature; rebuild with --features visual")
}
