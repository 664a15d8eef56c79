//! Dynamic body shapes
//!
//! One shape per layer of the body grid: a box, a sphere, an X-aligned
//! capsule and a square pyramid built as a convex hull.

use nalgebra::Point3;
use rapier3d::prelude::{ColliderBuilder, Real};
use serde::{Deserialize, Serialize};

use crate::error::{BenchError, BenchResult};
use crate::material::MaterialPreset;

pub const BOX_HALF_EXTENTS: [Real; 3] = [0.5, 0.75, 1.0];
pub const SPHERE_RADIUS: Real = 0.5;
pub const CAPSULE_RADIUS: Real = 0.5;
pub const CAPSULE_HALF_HEIGHT: Real = 0.75;

/// Hull points: apex, then the base square at +x, -x, +z, -z
pub const PYRAMID_POINTS: [[Real; 3]; 5] = [
    [0.0, 1.0, 0.0],
    [1.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 0.0, -1.0],
];

/// Hull faces wound counter-clockwise seen from outside
pub const PYRAMID_TRIANGLES: [[u32; 3]; 6] = [
    [0, 1, 4],
    [0, 4, 2],
    [0, 2, 3],
    [0, 3, 1],
    [1, 3, 2],
    [1, 2, 4],
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyShape {
    Box,
    Sphere,
    Capsule,
    Pyramid,
}

impl BodyShape {
    /// Layer order of the benchmark scene
    pub const ALL: [BodyShape; 4] = [
        BodyShape::Box,
        BodyShape::Sphere,
        BodyShape::Capsule,
        BodyShape::Pyramid,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BodyShape::Box => "box",
            BodyShape::Sphere => "sphere",
            BodyShape::Capsule => "capsule",
            BodyShape::Pyramid => "pyramid",
        }
    }

    /// Collider for a dynamic body of this shape with `material` applied
    pub fn collider(self, material: &MaterialPreset) -> BenchResult<ColliderBuilder> {
        let builder = match self {
            BodyShape::Box => ColliderBuilder::cuboid(
                BOX_HALF_EXTENTS[0],
                BOX_HALF_EXTENTS[1],
                BOX_HALF_EXTENTS[2],
            ),
            BodyShape::Sphere => ColliderBuilder::ball(SPHERE_RADIUS),
            BodyShape::Capsule => ColliderBuilder::capsule_x(CAPSULE_HALF_HEIGHT, CAPSULE_RADIUS),
            BodyShape::Pyramid => ColliderBuilder::convex_hull(&Self::pyramid_points())
                .ok_or(BenchError::DegenerateHull(self.name()))?,
        };
        Ok(material.apply(builder, true))
    }

    pub fn pyramid_points() -> Vec<Point3<Real>> {
        PYRAMID_POINTS
            .iter()
            .map(|p| Point3::new(p[0], p[1], p[2]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_every_shape_builds() {
        let material = MaterialPreset::benchmark();
        for shape in BodyShape::ALL {
            let collider = shape.collider(&material).unwrap().build();
            assert_eq!(collider.friction(), material.friction);
            assert!(collider.mass() > 0.0, "{} has no mass", shape.name());
        }
    }

    #[test]
    fn test_sphere_mass_from_density() {
        let collider = BodyShape::Sphere
            .collider(&MaterialPreset::benchmark())
            .unwrap()
            .build();
        let volume = 4.0 / 3.0 * std::f32::consts::PI * SPHERE_RADIUS.powi(3);
        assert_relative_eq!(collider.mass(), 1000.0 * volume, max_relative = 1e-3);
    }

    #[test]
    fn test_capsule_lies_along_x() {
        let collider = BodyShape::Capsule
            .collider(&MaterialPreset::benchmark())
            .unwrap()
            .build();
        let aabb = collider.compute_aabb();
        let extents = aabb.half_extents();
        assert_relative_eq!(extents.x, CAPSULE_HALF_HEIGHT + CAPSULE_RADIUS, epsilon = 1e-4);
        assert_relative_eq!(extents.y, CAPSULE_RADIUS, epsilon = 1e-4);
    }

    #[test]
    fn test_pyramid_faces_point_outward() {
        let points = BodyShape::pyramid_points();
        let centroid = points.iter().fold(nalgebra::Vector3::zeros(), |acc, p| acc + p.coords)
            / points.len() as Real;

        for tri in PYRAMID_TRIANGLES {
            let a = points[tri[0] as usize];
            let b = points[tri[1] as usize];
            let c = points[tri[2] as usize];
            let normal = (b - a).cross(&(c - a));
            let face_center = (a.coords + b.coords + c.coords) / 3.0;
            assert!(normal.dot(&(face_center - centroid)) > 0.0, "face {:?}", tri);
        }
    }
}
