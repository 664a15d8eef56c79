//! Wavy terrain triangle mesh
//!
//! A regular grid whose heights follow `sin(x) * cos(z)`, giving enough
//! curvature that bodies roll and pile up instead of settling on a plane.

use nalgebra::{Point3, Vector3};
use rapier3d::prelude::Real;
use serde::{Deserialize, Serialize};

use crate::error::{BenchError, BenchResult};

/// Terrain generation configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Number of cells along each axis
    pub resolution: u32,
    /// Edge length of a single cell
    pub cell_size: f32,
    /// Peak height of the waves
    pub max_height: f32,
    /// Wave frequency across the whole grid
    pub frequency: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            resolution: 100,
            cell_size: 3.0,
            max_height: 5.0,
            frequency: 50.0,
        }
    }
}

impl TerrainConfig {
    /// Small grid for tests and quick smoke runs
    pub fn small() -> Self {
        Self {
            resolution: 10,
            ..Default::default()
        }
    }

    /// Half of the terrain's edge length
    pub fn center(&self) -> f32 {
        self.resolution as f32 * self.cell_size / 2.0
    }
}

/// Generated terrain geometry in local space
#[derive(Clone, Debug)]
pub struct TerrainMesh {
    pub vertices: Vec<Point3<Real>>,
    pub indices: Vec<[u32; 3]>,
    origin: Vector3<Real>,
}

impl TerrainMesh {
    /// Build the grid described by `config`.
    ///
    /// Vertex `(x, z)` lives at index `z * (n + 1) + x`.
    pub fn generate(config: &TerrainConfig) -> BenchResult<Self> {
        let n = config.resolution;
        if n == 0 {
            return Err(BenchError::invalid("terrain resolution must be positive"));
        }

        let stride = n + 1;
        let inv_n = 1.0 / n as f32;

        let mut vertices = vec![Point3::origin(); (stride * stride) as usize];
        for x in 0..=n {
            for z in 0..=n {
                let height = (x as f32 * config.frequency * inv_n).sin()
                    * (z as f32 * config.frequency * inv_n).cos();
                vertices[(z * stride + x) as usize] = Point3::new(
                    config.cell_size * x as f32,
                    config.max_height * height,
                    config.cell_size * z as f32,
                );
            }
        }

        let mut indices = Vec::with_capacity((n * n * 2) as usize);
        for x in 0..n {
            for z in 0..n {
                let start = stride * z + x;
                indices.push([start, start + n + 1, start + 1]);
                indices.push([start + 1, start + n + 1, start + n + 2]);
            }
        }

        let center = config.center();
        Ok(Self {
            vertices,
            indices,
            origin: Vector3::new(-center, config.max_height, -center),
        })
    }

    /// Translation of the fixed body carrying the mesh, centering it on the origin
    pub fn origin(&self) -> Vector3<Real> {
        self.origin
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }
}
