//! Timed stepping and the parameter sweep
//!
//! Each run gets a fresh rayon pool and a fresh world, so runs never share
//! warmed-up caches or worker threads.

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info};

use crate::config::BenchConfig;
use crate::error::{BenchError, BenchResult};
use crate::motion::MotionQuality;
use crate::report::{RunResult, SweepReport, TABLE_HEADER};
use crate::world::BenchWorld;

/// Receives runs as the sweep produces them
pub trait RunSink {
    /// Called once before the first run
    fn begin(&mut self) -> BenchResult<()> {
        Ok(())
    }

    fn run_finished(&mut self, run: &RunResult) -> BenchResult<()>;
}

/// Ignores every run; handy when only the returned report matters
pub struct NullSink;

impl RunSink for NullSink {
    fn run_finished(&mut self, _run: &RunResult) -> BenchResult<()> {
        Ok(())
    }
}

/// Prints the results table and optionally writes per-frame CSVs
pub struct TableSink<W: Write> {
    out: W,
    per_frame: Option<(PathBuf, String)>,
    written: Vec<PathBuf>,
}

impl<W: Write> TableSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            per_frame: None,
            written: Vec::new(),
        }
    }

    pub fn with_per_frame(mut self, dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        self.per_frame = Some((dir.into(), prefix.into()));
        self
    }

    /// Per-frame files written so far
    pub fn written_files(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) -> BenchResult<()> {
        writeln!(self.out, "{}", line)
            .and_then(|_| self.out.flush())
            .map_err(|e| BenchError::io("<results output>", e))
    }
}

impl<W: Write> RunSink for TableSink<W> {
    fn begin(&mut self) -> BenchResult<()> {
        self.write_line(TABLE_HEADER)
    }

    fn run_finished(&mut self, run: &RunResult) -> BenchResult<()> {
        if let Some((dir, prefix)) = &self.per_frame {
            let path = run.export_per_frame(dir, prefix)?;
            debug!("Wrote per-frame timings to {}", path.display());
            self.written.push(path);
        }
        self.write_line(&run.table_line())
    }
}

/// Build the worker pool the engine schedules onto
pub fn build_pool(threads: usize) -> BenchResult<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("rigidbench-worker-{}", i))
        .build()
        .map_err(|source| BenchError::ThreadPool { threads, source })
}

/// Build a world, step it `config.iterations` times on a `threads`-worker pool
/// and time every step.
///
/// Only `step` is timed; world construction and teardown are not.
pub fn run_single(
    config: &BenchConfig,
    motion_quality: MotionQuality,
    threads: usize,
) -> BenchResult<RunResult> {
    let pool = build_pool(threads)?;
    let mut world = BenchWorld::new(config, motion_quality)?;

    let mut frame_times = Vec::with_capacity(config.iterations);
    for _ in 0..config.iterations {
        let start = Instant::now();
        pool.install(|| world.step());
        frame_times.push(start.elapsed());
    }

    Ok(RunResult::new(motion_quality, threads, frame_times))
}

/// Motion quality x thread count sweep
pub struct Sweep<'a> {
    config: &'a BenchConfig,
}

impl<'a> Sweep<'a> {
    pub fn new(config: &'a BenchConfig) -> BenchResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Runs in execution order: every thread count for the first mode, then the next mode
    pub fn plan(&self) -> Vec<(MotionQuality, usize)> {
        self.config
            .motion_qualities
            .iter()
            .flat_map(|mode| self.config.thread_counts().map(move |t| (*mode, t)))
            .collect()
    }

    pub fn run(&self, sink: &mut dyn RunSink) -> BenchResult<SweepReport> {
        let plan = self.plan();
        info!(
            "Sweeping {} runs of {} steps ({} dynamic bodies each)",
            plan.len(),
            self.config.iterations,
            self.config.scene.bodies.body_count()
        );

        let start = Instant::now();
        sink.begin()?;

        let mut runs = Vec::with_capacity(plan.len());
        for (motion_quality, threads) in plan {
            let run = run_single(self.config, motion_quality, threads)?;
            let stats = run.stats();
            info!(
                motion_quality = %motion_quality,
                threads,
                steps_per_second = run.steps_per_second(),
                "Run complete: mean {:.3} ms, p95 {:.3} ms, max {:.3} ms",
                stats.mean_ms,
                stats.p95_ms,
                stats.max_ms
            );
            sink.run_finished(&run)?;
            runs.push(run);
        }

        Ok(SweepReport {
            runs,
            total_time: start.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_order() {
        let config = BenchConfig {
            min_threads: 1,
            max_threads: Some(3),
            ..BenchConfig::quick()
        };
        let sweep = Sweep::new(&config).unwrap();
        assert_eq!(
            sweep.plan(),
            vec![
                (MotionQuality::Discrete, 1),
                (MotionQuality::Discrete, 2),
                (MotionQuality::Discrete, 3),
                (MotionQuality::Ccd, 1),
                (MotionQuality::Ccd, 2),
                (MotionQuality::Ccd, 3),
            ]
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = BenchConfig {
            iterations: 0,
            ..BenchConfig::quick()
        };
        assert!(Sweep::new(&config).is_err());
    }

    #[test]
    fn test_run_single_times_every_step() {
        let config = BenchConfig::quick();
        let run = run_single(&config, MotionQuality::Discrete, 2).unwrap();
        assert_eq!(run.iterations(), config.iterations);
        assert_eq!(run.threads, 2);
        assert!(run.steps_per_second() > 0.0);
    }

    #[test]
    fn test_build_pool_zero_threads_uses_default() {
        // rayon treats 0 as "pick automatically"; the config layer forbids it
        assert!(build_pool(0).is_ok());
        assert_eq!(build_pool(3).unwrap().current_num_threads(), 3);
    }

    #[test]
    fn test_table_sink_output() {
        let run = RunResult::new(
            MotionQuality::Discrete,
            1,
            vec![std::time::Duration::from_millis(4); 2],
        );
        let mut sink = TableSink::new(Vec::new());
        sink.begin().unwrap();
        sink.run_finished(&run).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            text,
            "Motion Quality, Thread Count, Steps / Second\nDiscrete, 1, 250.000\n"
        );
    }
}
