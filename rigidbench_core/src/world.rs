//! Benchmark physics world (standalone, no Bevy)
//!
//! Owns every Rapier set for a single run. Construction is scene setup,
//! `step` is the timed unit of work and dropping the world tears it down.

use nalgebra::Vector3;
use rapier3d::prelude::*;
use tracing::debug;

use crate::config::BenchConfig;
use crate::error::BenchResult;
use crate::motion::MotionQuality;
use crate::shapes::BodyShape;
use crate::terrain::TerrainMesh;

pub struct BenchWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub gravity: Vector3<f32>,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    motion_quality: MotionQuality,
    terrain: TerrainMesh,
    terrain_handle: RigidBodyHandle,
    bodies: Vec<(RigidBodyHandle, BodyShape)>,
}

impl BenchWorld {
    /// Build the terrain and the dynamic body grid described by `config`
    pub fn new(config: &BenchConfig, motion_quality: MotionQuality) -> BenchResult<Self> {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.timestep;

        let terrain = TerrainMesh::generate(&config.scene.terrain)?;

        let mut world = Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: Vector3::new(0.0, -config.gravity, 0.0),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            motion_quality,
            terrain_handle: RigidBodyHandle::invalid(),
            terrain,
            bodies: Vec::with_capacity(config.scene.bodies.body_count()),
        };

        world.spawn_terrain(config);
        world.spawn_dynamics(config)?;

        debug!(
            "Built world: {} dynamic bodies, {} terrain triangles, motion quality {}",
            world.bodies.len(),
            world.terrain.triangle_count(),
            motion_quality
        );
        Ok(world)
    }

    fn spawn_terrain(&mut self, config: &BenchConfig) {
        let rb = RigidBodyBuilder::fixed()
            .translation(self.terrain.origin())
            .build();
        let handle = self.rigid_body_set.insert(rb);

        let collider = config.scene.material.apply(
            ColliderBuilder::trimesh(self.terrain.vertices.clone(), self.terrain.indices.clone()),
            false,
        );
        self.collider_set
            .insert_with_parent(collider.build(), handle, &mut self.rigid_body_set);
        self.terrain_handle = handle;
    }

    fn spawn_dynamics(&mut self, config: &BenchConfig) -> BenchResult<()> {
        let grid = &config.scene.bodies;
        let ccd = self.motion_quality.ccd_enabled();

        // Colliders are cloned per body; build each layer's shape once
        let colliders = grid
            .layers
            .iter()
            .map(|shape| Ok((*shape, shape.collider(&config.scene.material)?.build())))
            .collect::<BenchResult<Vec<_>>>()?;

        for x in -grid.half_extent..=grid.half_extent {
            for (layer, (shape, collider)) in colliders.iter().enumerate() {
                for z in -grid.half_extent..=grid.half_extent {
                    let rb = RigidBodyBuilder::dynamic()
                        .translation(vector![
                            grid.spacing * x as f32,
                            grid.base_height + grid.layer_spacing * layer as f32,
                            grid.spacing * z as f32
                        ])
                        .ccd_enabled(ccd)
                        .build();

                    let handle = self.rigid_body_set.insert(rb);
                    self.collider_set.insert_with_parent(
                        collider.clone(),
                        handle,
                        &mut self.rigid_body_set,
                    );
                    self.bodies.push((handle, *shape));
                }
            }
        }
        Ok(())
    }

    /// Advance the simulation by one timestep
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }

    pub fn motion_quality(&self) -> MotionQuality {
        self.motion_quality
    }

    pub fn terrain(&self) -> &TerrainMesh {
        &self.terrain
    }

    pub fn terrain_handle(&self) -> RigidBodyHandle {
        self.terrain_handle
    }

    /// Dynamic bodies with the shape each one was spawned with
    pub fn bodies(&self) -> &[(RigidBodyHandle, BodyShape)] {
        &self.bodies
    }

    pub fn dynamic_body_count(&self) -> usize {
        self.bodies.len()
    }
}
