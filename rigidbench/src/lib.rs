//! rigidbench - Rapier throughput benchmark driver
//!
//! Command line handling, logging setup and the sweep entry point. The
//! interactive viewer is compiled in with the `visual` feature.

pub mod cli;

#[cfg(feature = "visual")]
pub mod viewer;

use std::io;

use anyhow::{Context, Result};
use rigidbench_core::{BenchConfig, NullSink, RunSink, Sweep, SweepReport, TableSink};
use tracing::info;

pub use cli::Cli;

/// Install the fmt subscriber on stderr, keeping stdout for the results table
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}

/// Run the sweep described by `config`, printing the table to stdout
pub fn run_sweep(config: &BenchConfig) -> Result<SweepReport> {
    let stdout = io::stdout();
    let mut table = TableSink::new(stdout.lock());
    if config.record_per_frame {
        table = table.with_per_frame(&config.output_dir, &config.file_prefix);
    }

    run_sweep_into(config, &mut table)
}

/// Run the sweep into an arbitrary sink, then write the JSON summary if requested
pub fn run_sweep_into(config: &BenchConfig, sink: &mut dyn RunSink) -> Result<SweepReport> {
    if !rigidbench_core::parallel_enabled() {
        tracing::warn!("Built without the `parallel` feature: every run steps on a single thread");
    }

    let report = Sweep::new(config)?
        .run(sink)
        .context("Benchmark sweep failed")?;

    for best in report.best_runs() {
        info!(
            "Best {}: {:.1} steps/s with {} thread(s)",
            best.motion_quality,
            best.steps_per_second(),
            best.threads
        );
    }
    info!("Sweep finished in {:.2}s", report.total_time.as_secs_f64());

    if let Some(path) = &config.summary_json {
        report
            .export_json(path, config.scene.bodies.body_count())
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        info!("Wrote sweep summary to {}", path.display());
    }

    Ok(report)
}

/// Sweep without any console output; used by tests and embedding callers
pub fn run_sweep_quiet(config: &BenchConfig) -> Result<SweepReport> {
    run_sweep_into(config, &mut NullSink)
}
