//! # rigidbench core
//!
//! Throughput harness around the Rapier rigid-body engine.
//!
//! - **Scene**: a wavy terrain trimesh plus a grid of boxes, spheres,
//!   capsules and convex pyramids dropped onto it
//! - **Runner**: steps a fresh world a fixed number of times on a rayon pool
//!   of a chosen size, timing each step
//! - **Sweep**: repeats runs across motion qualities (discrete / CCD) and
//!   thread counts
//! - **Report**: results table, per-frame CSVs and a JSON summary
//!
//! ```no_run
//! use rigidbench_core::{BenchConfig, Sweep, TableSink};
//!
//! let config = BenchConfig::default();
//! let mut sink = TableSink::new(std::io::stdout()).with_per_frame(".", "rapier");
//! let report = Sweep::new(&config)?.run(&mut sink)?;
//! println!("{} runs", report.runs.len());
//! # Ok::<(), rigidbench_core::BenchError>(())
//! ```

pub mod config;
pub mod error;
pub mod material;
pub mod motion;
pub mod report;
pub mod runner;
pub mod shapes;
pub mod terrain;
pub mod world;

pub use config::{BenchConfig, BodyGridConfig, SceneConfig, ViewerConfig};
pub use error::{BenchError, BenchResult};
pub use material::MaterialPreset;
pub use motion::MotionQuality;
pub use report::{FrameStats, RunResult, SweepReport};
pub use runner::{build_pool, run_single, NullSink, RunSink, Sweep, TableSink};
pub use shapes::BodyShape;
pub use terrain::{TerrainConfig, TerrainMesh};
pub use world::BenchWorld;

pub use rayon::ThreadPool;

/// Whether the engine was compiled to schedule work on the runner's pool
pub const fn parallel_enabled() -> bool {
    cfg!(feature = "parallel")
}
