//! Run results and their console / file renderings

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, BenchResult};
use crate::motion::MotionQuality;

pub const TABLE_HEADER: &str = "Motion Quality, Thread Count, Steps / Second";
pub const PER_FRAME_HEADER: &str = "Frame, Time (ms)";

/// Timing of a single (motion quality, thread count) run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunResult {
    pub motion_quality: MotionQuality,
    pub threads: usize,
    /// Wall time of each step, in step order
    pub frame_times: Vec<Duration>,
}

impl RunResult {
    pub fn new(motion_quality: MotionQuality, threads: usize, frame_times: Vec<Duration>) -> Self {
        Self {
            motion_quality,
            threads,
            frame_times,
        }
    }

    pub fn iterations(&self) -> usize {
        self.frame_times.len()
    }

    /// Time spent inside `step`, excluding setup and file output
    pub fn total_step_time(&self) -> Duration {
        self.frame_times.iter().sum()
    }

    pub fn steps_per_second(&self) -> f64 {
        let secs = self.total_step_time().as_secs_f64();
        if secs > 0.0 {
            self.iterations() as f64 / secs
        } else {
            0.0
        }
    }

    pub fn stats(&self) -> FrameStats {
        FrameStats::from_durations(&self.frame_times)
    }

    /// Results table line: `<condition>, <thread count>, <steps/second>`
    pub fn table_line(&self) -> String {
        format!(
            "{}, {}, {:.3}",
            self.motion_quality,
            self.threads,
            self.steps_per_second()
        )
    }

    pub fn per_frame_file_name(&self, prefix: &str) -> String {
        format!(
            "{}_per_frame_{}_th{}.csv",
            prefix, self.motion_quality, self.threads
        )
    }

    /// Write `Frame, Time (ms)` rows, one per step
    pub fn write_per_frame<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "{}", PER_FRAME_HEADER)?;
        for (frame, duration) in self.frame_times.iter().enumerate() {
            writeln!(out, "{}, {:.6}", frame, duration_ms(*duration))?;
        }
        Ok(())
    }

    /// Write the per-frame CSV into `dir`, creating it if needed
    pub fn export_per_frame(&self, dir: &Path, prefix: &str) -> BenchResult<PathBuf> {
        std::fs::create_dir_all(dir).map_err(|e| BenchError::io(dir, e))?;
        let path = dir.join(self.per_frame_file_name(prefix));

        let file = File::create(&path).map_err(|e| BenchError::io(&path, e))?;
        let mut writer = BufWriter::new(file);
        self.write_per_frame(&mut writer)
            .and_then(|_| writer.flush())
            .map_err(|e| BenchError::io(&path, e))?;
        Ok(path)
    }
}

fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1.0e3
}

/// Per-frame timing distribution, in milliseconds
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameStats {
    pub min_ms: f64,
    pub max_ms: f64,
    pub mean_ms: f64,
    pub p95_ms: f64,
}

impl FrameStats {
    pub fn from_durations(durations: &[Duration]) -> Self {
        if durations.is_empty() {
            return Self::default();
        }

        let mut samples: Vec<f64> = durations.iter().map(|d| duration_ms(*d)).collect();
        samples.sort_by(f64::total_cmp);

        let mean_ms = samples.iter().sum::<f64>() / samples.len() as f64;
        let p95_index = ((samples.len() - 1) as f64 * 0.95).round() as usize;

        Self {
            min_ms: samples[0],
            max_ms: samples[samples.len() - 1],
            mean_ms,
            p95_ms: samples[p95_index],
        }
    }
}

/// Summary row of the JSON export
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub motion_quality: MotionQuality,
    pub threads: usize,
    pub iterations: usize,
    pub steps_per_second: f64,
    pub frame_stats: FrameStats,
}

impl From<&RunResult> for RunSummary {
    fn from(run: &RunResult) -> Self {
        Self {
            motion_quality: run.motion_quality,
            threads: run.threads,
            iterations: run.iterations(),
            steps_per_second: run.steps_per_second(),
            frame_stats: run.stats(),
        }
    }
}

/// Aggregated sweep report
#[derive(Clone, Debug, Default)]
pub struct SweepReport {
    pub runs: Vec<RunResult>,
    /// Wall time of the whole sweep including world setup
    pub total_time: Duration,
}

#[derive(Serialize)]
struct SweepSummary<'a> {
    total_time_secs: f64,
    dynamic_bodies: usize,
    runs: Vec<RunSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
}

impl SweepReport {
    /// Best throughput per motion quality, in sweep order
    pub fn best_runs(&self) -> Vec<&RunResult> {
        let mut best: Vec<&RunResult> = Vec::new();
        for run in &self.runs {
            match best
                .iter()
                .position(|b| b.motion_quality == run.motion_quality)
            {
                Some(i) if run.steps_per_second() > best[i].steps_per_second() => best[i] = run,
                Some(_) => {}
                None => best.push(run),
            }
        }
        best
    }

    pub fn to_json(&self, dynamic_bodies: usize) -> Result<String, serde_json::Error> {
        let note = (!crate::parallel_enabled())
            .then_some("engine built without the parallel feature; thread count has no effect");
        serde_json::to_string_pretty(&SweepSummary {
            total_time_secs: self.total_time.as_secs_f64(),
            dynamic_bodies,
            runs: self.runs.iter().map(RunSummary::from).collect(),
            note,
        })
    }

    pub fn export_json(&self, path: &Path, dynamic_bodies: usize) -> BenchResult<()> {
        let json = self.to_json(dynamic_bodies)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| BenchError::io(parent, e))?;
        }
        std::fs::write(path, json).map_err(|e| BenchError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn run(mode: MotionQuality, threads: usize, ms: &[u64]) -> RunResult {
        RunResult::new(
            mode,
            threads,
            ms.iter().map(|m| Duration::from_millis(*m)).collect(),
        )
    }

    #[test]
    fn test_steps_per_second() {
        let result = run(MotionQuality::Discrete, 1, &[10, 20, 10, 10]);
        assert_eq!(result.iterations(), 4);
        assert_relative_eq!(result.steps_per_second(), 4.0 / 0.05, max_relative = 1e-9);
    }

    #[test]
    fn test_zero_time_gives_zero_throughput() {
        let result = RunResult::new(MotionQuality::Ccd, 2, vec![Duration::ZERO; 3]);
        assert_eq!(result.steps_per_second(), 0.0);
    }

    #[test]
    fn test_table_line() {
        let result = run(MotionQuality::Ccd, 8, &[2, 2]);
        assert_eq!(result.table_line(), "CCD, 8, 500.000");
    }

    #[test]
    fn test_per_frame_file_name() {
        let result = run(MotionQuality::Discrete, 3, &[1]);
        assert_eq!(
            result.per_frame_file_name("rapier"),
            "rapier_per_frame_Discrete_th3.csv"
        );
    }

    #[test]
    fn test_per_frame_rows() {
        let result = RunResult::new(
            MotionQuality::Discrete,
            1,
            vec![Duration::from_micros(1500), Duration::from_micros(250)],
        );
        let mut out = Vec::new();
        result.write_per_frame(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Frame, Time (ms)", "0, 1.500000", "1, 0.250000"]);
    }

    #[test]
    fn test_frame_stats() {
        let ms: Vec<u64> = (1..=100).collect();
        let stats = run(MotionQuality::Discrete, 1, &ms).stats();
        assert_relative_eq!(stats.min_ms, 1.0);
        assert_relative_eq!(stats.max_ms, 100.0);
        assert_relative_eq!(stats.mean_ms, 50.5);
        assert_relative_eq!(stats.p95_ms, 95.0);
    }

    #[test]
    fn test_frame_stats_empty() {
        assert_eq!(FrameStats::from_durations(&[]), FrameStats::default());
    }

    #[test]
    fn test_best_runs_per_mode() {
        let report = SweepReport {
            runs: vec![
                run(MotionQuality::Discrete, 1, &[10]),
                run(MotionQuality::Discrete, 2, &[5]),
                run(MotionQuality::Ccd, 1, &[20]),
                run(MotionQuality::Ccd, 2, &[25]),
            ],
            total_time: Duration::from_secs(1),
        };

        let best = report.best_runs();
        assert_eq!(best.len(), 2);
        assert_eq!((best[0].motion_quality, best[0].threads), (MotionQuality::Discrete, 2));
        assert_eq!((best[1].motion_quality, best[1].threads), (MotionQuality::Ccd, 1));
    }

    #[test]
    fn test_json_export() {
        let report = SweepReport {
            runs: vec![run(MotionQuality::Ccd, 4, &[4, 4])],
            total_time: Duration::from_millis(30),
        };
        let json = report.to_json(1764).unwrap();
        assert!(json.contains("\"motion_quality\": \"ccd\""));
        assert!(json.contains("\"dynamic_bodies\": 1764"));
        assert!(json.contains("steps_per_second"));
    }
}
