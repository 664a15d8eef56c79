//! Benchmark configuration
//!
//! Every field has a default, so an empty file (or no file) reproduces the
//! standard sweep: 500 steps at 60 Hz, discrete then CCD, one thread up to
//! the number of logical CPUs.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, BenchResult};
use crate::material::MaterialPreset;
use crate::motion::MotionQuality;
use crate::shapes::BodyShape;
use crate::terrain::TerrainConfig;

/// Layout of the dynamic body grid
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyGridConfig {
    /// Bodies are placed for x and z in `-half_extent..=half_extent`
    pub half_extent: i32,
    /// Horizontal distance between neighbouring bodies
    pub spacing: f32,
    /// Height of the lowest layer
    pub base_height: f32,
    /// Vertical distance between layers
    pub layer_spacing: f32,
    /// One layer per entry, bottom to top
    pub layers: Vec<BodyShape>,
}

impl Default for BodyGridConfig {
    fn default() -> Self {
        Self {
            half_extent: 10,
            spacing: 7.5,
            base_height: 15.0,
            layer_spacing: 2.0,
            layers: BodyShape::ALL.to_vec(),
        }
    }
}

impl BodyGridConfig {
    pub fn small() -> Self {
        Self {
            half_extent: 2,
            ..Default::default()
        }
    }

    pub fn body_count(&self) -> usize {
        let side = (2 * self.half_extent.max(0) + 1) as usize;
        side * side * self.layers.len()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub terrain: TerrainConfig,
    pub bodies: BodyGridConfig,
    pub material: MaterialPreset,
}

/// Settings for the interactive viewer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub threads: usize,
    pub motion_quality: MotionQuality,
    pub camera_eye: [f32; 3],
    pub camera_direction: [f32; 3],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            threads: 2,
            motion_quality: MotionQuality::Ccd,
            camera_eye: [50.0, 50.0, 50.0],
            camera_direction: [-0.6, -0.2, -0.7],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Steps per run
    pub iterations: usize,
    /// Simulated seconds per step
    pub timestep: f32,
    /// Gravity magnitude (m/s^2), applied along -Y
    pub gravity: f32,
    /// Modes to sweep, in order
    pub motion_qualities: Vec<MotionQuality>,
    pub min_threads: usize,
    /// Upper end of the thread sweep; `None` means every logical CPU
    pub max_threads: Option<usize>,
    /// Write a per-frame timing CSV for every run
    pub record_per_frame: bool,
    pub output_dir: PathBuf,
    /// File name prefix of the per-frame CSVs
    pub file_prefix: String,
    /// Write the whole sweep as JSON here
    pub summary_json: Option<PathBuf>,
    pub scene: SceneConfig,
    pub viewer: ViewerConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            iterations: 500,
            timestep: 1.0 / 60.0,
            gravity: 9.81,
            motion_qualities: MotionQuality::ALL.to_vec(),
            min_threads: 1,
            max_threads: None,
            record_per_frame: true,
            output_dir: PathBuf::from("."),
            file_prefix: "rapier".to_string(),
            summary_json: None,
            scene: SceneConfig::default(),
            viewer: ViewerConfig::default(),
        }
    }
}

impl BenchConfig {
    /// Tiny scene and few steps; used by tests and `--quick`
    pub fn quick() -> Self {
        Self {
            iterations: 20,
            max_threads: Some(2),
            record_per_frame: false,
            scene: SceneConfig {
                terrain: TerrainConfig::small(),
                bodies: BodyGridConfig::small(),
                material: MaterialPreset::benchmark(),
            },
            ..Default::default()
        }
    }

    /// Load from `.toml`, otherwise parse as YAML
    /// Parse and validate a config file
    pub fn load(path: &Path) -> BenchResult<Self> {
        let config = Self::from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file (`.toml`, otherwise YAML) without validating it,
    /// for callers that layer overrides on top first
    pub fn from_file(path: &Path) -> BenchResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| BenchError::io(path, e))?;

        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

        let config: Self = if is_toml {
            toml::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        Ok(config)
    }

    pub fn resolved_max_threads(&self) -> usize {
        self.max_threads.unwrap_or_else(num_cpus::get)
    }

    pub fn thread_counts(&self) -> RangeInclusive<usize> {
        self.min_threads..=self.resolved_max_threads()
    }

    pub fn validate(&self) -> BenchResult<()> {
        if self.iterations == 0 {
            return Err(BenchError::invalid("iterations must be positive"));
        }
        if !(self.timestep > 0.0) {
            return Err(BenchError::invalid("timestep must be positive"));
        }
        if self.motion_qualities.is_empty() {
            return Err(BenchError::invalid("at least one motion quality is required"));
        }
        if self.min_threads == 0 {
            return Err(BenchError::invalid("min_threads must be at least 1"));
        }
        let max = self.resolved_max_threads();
        if max < self.min_threads {
            return Err(BenchError::invalid(format!(
                "max_threads ({}) is below min_threads ({})",
                max, self.min_threads
            )));
        }
        if self.viewer.threads == 0 {
            return Err(BenchError::invalid("viewer threads must be at least 1"));
        }
        if self.scene.bodies.layers.is_empty() {
            return Err(BenchError::invalid("body grid needs at least one layer"));
        }
        if self.scene.bodies.half_extent < 0 {
            return Err(BenchError::invalid("body grid half_extent cannot be negative"));
        }
        if self.scene.terrain.resolution == 0 {
            return Err(BenchError::invalid("terrain resolution must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let config = BenchConfig::default();
        assert_eq!(config.iterations, 500);
        assert_relative_eq!(config.timestep, 1.0 / 60.0);
        assert_eq!(
            config.motion_qualities,
            vec![MotionQuality::Discrete, MotionQuality::Ccd]
        );
        assert_eq!(config.scene.bodies.body_count(), 21 * 21 * 4);
        assert!(config.record_per_frame);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_thread_counts_default_to_cpu_count() {
        let config = BenchConfig::default();
        let counts: Vec<usize> = config.thread_counts().collect();
        assert_eq!(counts.first(), Some(&1));
        assert_eq!(counts.last(), Some(&num_cpus::get()));
    }

    #[test]
    fn test_explicit_thread_range() {
        let config = BenchConfig {
            min_threads: 2,
            max_threads: Some(4),
            ..Default::default()
        };
        assert_eq!(config.thread_counts().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn test_validation_failures() {
        let zero_iters = BenchConfig {
            iterations: 0,
            ..Default::default()
        };
        assert!(zero_iters.validate().is_err());

        let no_modes = BenchConfig {
            motion_qualities: vec![],
            ..Default::default()
        };
        assert!(no_modes.validate().is_err());

        let inverted = BenchConfig {
            min_threads: 4,
            max_threads: Some(2),
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let mut no_layers = BenchConfig::default();
        no_layers.scene.bodies.layers.clear();
        assert!(no_layers.validate().is_err());

        let bad_dt = BenchConfig {
            timestep: f32::NAN,
            ..Default::default()
        };
        assert!(bad_dt.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: BenchConfig = toml::from_str(
            r#"
            iterations = 100
            motion_qualities = ["ccd"]

            [scene.terrain]
            resolution = 20
            "#,
        )
        .unwrap();

        assert_eq!(config.iterations, 100);
        assert_eq!(config.motion_qualities, vec![MotionQuality::Ccd]);
        assert_eq!(config.scene.terrain.resolution, 20);
        assert_relative_eq!(config.scene.terrain.cell_size, 3.0);
        assert_eq!(config.file_prefix, "rapier");
    }

    #[test]
    fn test_yaml_layers() {
        let config: BenchConfig = serde_yaml::from_str(
            "scene:\n  bodies:\n    half_extent: 1\n    layers: [sphere, pyramid]\n",
        )
        .unwrap();
        assert_eq!(
            config.scene.bodies.layers,
            vec![BodyShape::Sphere, BodyShape::Pyramid]
        );
        assert_eq!(config.scene.bodies.body_count(), 9 * 2);
    }

    #[test]
    fn test_quick_preset_is_valid() {
        let config = BenchConfig::quick();
        assert!(config.validate().is_ok());
        assert!(config.scene.bodies.body_count() < 200);
    }
}
