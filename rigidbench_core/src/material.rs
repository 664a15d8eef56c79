use rapier3d::prelude::ColliderBuilder;
use serde::{Deserialize, Serialize};

/// Surface and mass properties shared by every collider in the scene
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialPreset {
    /// Friction coefficient (0.0 = frictionless)
    pub friction: f32,
    /// Restitution/bounciness (0.0 = no bounce, 1.0 = perfect bounce)
    pub restitution: f32,
    /// Density in kg/m^3, used for mass and inertia of dynamic bodies
    pub density: Option<f32>,
}

impl MaterialPreset {
    pub fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction,
            restitution,
            density: None,
        }
    }

    pub fn with_density(friction: f32, restitution: f32, density: f32) -> Self {
        Self {
            friction,
            restitution,
            density: Some(density),
        }
    }

    /// Material used by the throughput scene: moderate friction, lively bounce, water density
    pub fn benchmark() -> Self {
        Self::with_density(0.5, 0.6, 1000.0)
    }

    /// Apply friction and restitution, and density when `with_mass` is set.
    ///
    /// Static geometry skips density since fixed bodies ignore mass.
    pub fn apply(&self, builder: ColliderBuilder, with_mass: bool) -> ColliderBuilder {
        let builder = builder
            .friction(self.friction)
            .restitution(self.restitution);
        match self.density {
            Some(density) if with_mass => builder.density(density),
            _ => builder,
        }
    }
}

impl Default for MaterialPreset {
    fn default() -> Self {
        Self::benchmark()
    }
}
