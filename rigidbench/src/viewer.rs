//! Interactive viewer
//!
//! Opens a window on a single world, steps it once per rendered frame and
//! mirrors body transforms onto Bevy entities. Escape closes the window.

use std::f32::consts::FRAC_PI_2;

use anyhow::{bail, Result};
use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;
use rapier3d::prelude::RigidBodyHandle;
use rigidbench_core::shapes::{
    BOX_HALF_EXTENTS, CAPSULE_HALF_HEIGHT, CAPSULE_RADIUS, PYRAMID_POINTS, PYRAMID_TRIANGLES,
    SPHERE_RADIUS,
};
use rigidbench_core::{build_pool, BenchConfig, BenchWorld, BodyShape, TerrainMesh, ThreadPool};
use tracing::info;

/// Distance from the eye to the orbit focus point
const FOCUS_DISTANCE: f32 = 60.0;

/// Focus movement per key, in camera-yaw space
const PAN_KEYS: [(KeyCode, Vec3); 6] = [
    (KeyCode::KeyW, Vec3::NEG_Z),
    (KeyCode::KeyS, Vec3::Z),
    (KeyCode::KeyA, Vec3::NEG_X),
    (KeyCode::KeyD, Vec3::X),
    (KeyCode::KeyQ, Vec3::NEG_Y),
    (KeyCode::KeyE, Vec3::Y),
];

#[derive(Resource)]
pub struct ViewerWorld {
    world: BenchWorld,
    pool: ThreadPool,
}

/// Links a rendered entity to its rigid body
#[derive(Component)]
pub struct PhysicsBody(pub RigidBodyHandle);

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub focus: Vec3,
    pub radius: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl OrbitCamera {
    /// Orbit that starts at `eye` looking along `direction`
    pub fn looking_from(eye: Vec3, direction: Vec3, distance: f32) -> Self {
        let direction = direction.try_normalize().unwrap_or(Vec3::NEG_Z);
        let focus = eye + direction * distance;
        let offset = eye - focus;
        let radius = offset.length();

        Self {
            focus,
            radius,
            yaw: offset.x.atan2(offset.z),
            pitch: (-offset.y / radius).asin(),
        }
    }

    pub fn eye(&self) -> Vec3 {
        let rotation = Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch);
        self.focus + rotation * Vec3::new(0.0, 0.0, self.radius)
    }

    /// Mouse drag in pixels; pitch stays short of the poles
    pub fn rotate(&mut self, drag: Vec2) {
        self.yaw -= drag.x * 0.005;
        self.pitch = (self.pitch - drag.y * 0.005).clamp(-1.5, 1.5);
    }

    pub fn zoom(&mut self, scroll: f32) {
        self.radius = (self.radius - scroll * 2.0).clamp(5.0, 400.0);
    }

    /// Move the focus at a speed proportional to the orbit radius
    pub fn pan(&mut self, direction: Vec3, dt: f32) {
        let Some(direction) = direction.try_normalize() else {
            return;
        };
        self.focus += Quat::from_rotation_y(self.yaw) * direction * (0.5 * self.radius * dt);
    }
}

/// Open the viewer and block until the window closes
pub fn run(config: &BenchConfig) -> Result<()> {
    let viewer = &config.viewer;
    let pool = build_pool(viewer.threads)?;
    let world = BenchWorld::new(config, viewer.motion_quality)?;
    info!(
        "Opening viewer: {} bodies, {} thread(s), motion quality {}",
        world.dynamic_body_count(),
        viewer.threads,
        viewer.motion_quality
    );

    let orbit = OrbitCamera::looking_from(
        Vec3::from_array(viewer.camera_eye),
        Vec3::from_array(viewer.camera_direction),
        FOCUS_DISTANCE,
    );

    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "rigidbench - Rapier Performance Test".into(),
                    resolution: (1280.0, 720.0).into(),
                    ..default()
                }),
                ..default()
            })
            .disable::<bevy::log::LogPlugin>(), // tracing is already initialized
    )
    .insert_resource(ClearColor(Color::srgb(0.15, 0.17, 0.2)))
    .insert_resource(ViewerWorld { world, pool })
    .insert_resource(InitialOrbit(orbit))
    .add_systems(Startup, setup_scene)
    .add_systems(Update, (step_physics_system, sync_bodies_system).chain())
    .add_systems(Update, (orbit_camera_system, exit_on_escape_system));

    match app.run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => bail!("viewer exited with code {}", code),
    }
}

#[derive(Resource)]
struct InitialOrbit(OrbitCamera);

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    viewer: Res<ViewerWorld>,
    orbit: Res<InitialOrbit>,
) {
    let orbit = orbit.0;
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(orbit.eye()).looking_at(orbit.focus, Vec3::Y),
        orbit,
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -0.9, -0.5, 0.0)),
    ));
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
    });

    let world = &viewer.world;
    let origin = world.terrain().origin();

    commands.spawn((
        Name::new("terrain"),
        Mesh3d(meshes.add(terrain_mesh(world.terrain()))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.45, 0.55, 0.4),
            perceptual_roughness: 0.9,
            ..default()
        })),
        Transform::from_translation(Vec3::new(origin.x, origin.y, origin.z)),
    ));

    // One mesh + material per shape, shared by every body of that shape
    let shape_assets: Vec<(BodyShape, Handle<Mesh>, Handle<StandardMaterial>)> = BodyShape::ALL
        .iter()
        .map(|shape| {
            (
                *shape,
                meshes.add(shape_mesh(*shape)),
                materials.add(StandardMaterial {
                    base_color: shape_color(*shape),
                    ..default()
                }),
            )
        })
        .collect();

    for (handle, shape) in world.bodies() {
        let Some((_, mesh, material)) = shape_assets.iter().find(|(s, _, _)| s == shape) else {
            continue;
        };
        let Some(rb) = world.rigid_body_set.get(*handle) else {
            continue;
        };

        commands.spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
            body_transform(rb),
            PhysicsBody(*handle),
        ));
    }

    info!("Viewer scene ready with {} bodies", world.dynamic_body_count());
}

fn body_transform(rb: &rapier3d::prelude::RigidBody) -> Transform {
    let position = rb.translation();
    let rotation = rb.rotation();
    Transform {
        translation: Vec3::new(position.x, position.y, position.z),
        rotation: Quat::from_xyzw(rotation.i, rotation.j, rotation.k, rotation.w),
        ..default()
    }
}

fn terrain_mesh(terrain: &TerrainMesh) -> Mesh {
    let positions: Vec<[f32; 3]> = terrain.vertices.iter().map(|p| [p.x, p.y, p.z]).collect();
    let indices: Vec<u32> = terrain.indices.iter().flatten().copied().collect();

    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_indices(Indices::U32(indices))
        .with_computed_normals()
}

fn shape_mesh(shape: BodyShape) -> Mesh {
    match shape {
        BodyShape::Box => Cuboid::new(
            BOX_HALF_EXTENTS[0] * 2.0,
            BOX_HALF_EXTENTS[1] * 2.0,
            BOX_HALF_EXTENTS[2] * 2.0,
        )
        .into(),
        BodyShape::Sphere => Sphere::new(SPHERE_RADIUS).into(),
        // Bevy capsules run along Y; the physics capsule runs along X
        BodyShape::Capsule => Mesh::from(Capsule3d::new(CAPSULE_RADIUS, CAPSULE_HALF_HEIGHT * 2.0))
            .rotated_by(Quat::from_rotation_z(FRAC_PI_2)),
        BodyShape::Pyramid => {
            let positions: Vec<[f32; 3]> = PYRAMID_POINTS.to_vec();
            let indices: Vec<u32> = PYRAMID_TRIANGLES.iter().flatten().copied().collect();
            Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
                .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
                .with_inserted_indices(Indices::U32(indices))
                .with_duplicated_vertices()
                .with_computed_flat_normals()
        }
    }
}

fn shape_color(shape: BodyShape) -> Color {
    match shape {
        BodyShape::Box => Color::srgb(0.85, 0.45, 0.25),
        BodyShape::Sphere => Color::srgb(0.3, 0.55, 0.9),
        BodyShape::Capsule => Color::srgb(0.9, 0.8, 0.3),
        BodyShape::Pyramid => Color::srgb(0.7, 0.35, 0.75),
    }
}

fn step_physics_system(mut viewer: ResMut<ViewerWorld>) {
    let ViewerWorld { world, pool } = &mut *viewer;
    pool.install(|| world.step());
}

fn sync_bodies_system(viewer: Res<ViewerWorld>, mut query: Query<(&PhysicsBody, &mut Transform)>) {
    for (body, mut transform) in query.iter_mut() {
        if let Some(rb) = viewer.world.rigid_body_set.get(body.0) {
            *transform = body_transform(rb);
        }
    }
}

fn exit_on_escape_system(keyboard: Res<ButtonInput<KeyCode>>, mut exit: EventWriter<AppExit>) {
    if keyboard.just_pressed(KeyCode::Escape) {
        exit.send(AppExit::Success);
    }
}

fn orbit_camera_system(
    mut mouse_motion: EventReader<MouseMotion>,
    mut mouse_wheel: EventReader<MouseWheel>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut cameras: Query<(&mut OrbitCamera, &mut Transform)>,
) {
    let drag: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    let scroll: f32 = mouse_wheel.read().map(|w| w.y).sum();
    let pan: Vec3 = PAN_KEYS
        .iter()
        .filter(|(key, _)| keyboard.pressed(*key))
        .map(|(_, dir)| *dir)
        .sum();

    for (mut orbit, mut transform) in &mut cameras {
        if mouse_button.pressed(MouseButton::Right) {
            orbit.rotate(drag);
        }
        orbit.zoom(scroll);
        orbit.pan(pan, time.delta_secs());

        *transform = Transform::from_translation(orbit.eye()).looking_at(orbit.focus, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_reproduces_eye() {
        let eye = Vec3::new(50.0, 50.0, 50.0);
        let direction = Vec3::new(-0.6, -0.2, -0.7);
        let orbit = OrbitCamera::looking_from(eye, direction, FOCUS_DISTANCE);

        assert!((orbit.radius - FOCUS_DISTANCE).abs() < 1e-3);
        assert!(orbit.eye().distance(eye) < 1e-3);
        let looking = (orbit.focus - orbit.eye()).normalize();
        assert!(looking.distance(direction.normalize()) < 1e-4);
    }

    #[test]
    fn test_orbit_zoom_and_pitch_are_clamped() {
        let mut orbit = OrbitCamera::looking_from(Vec3::splat(50.0), Vec3::NEG_ONE, FOCUS_DISTANCE);
        orbit.zoom(1000.0);
        assert_eq!(orbit.radius, 5.0);
        orbit.zoom(-1000.0);
        assert_eq!(orbit.radius, 400.0);

        orbit.rotate(Vec2::new(0.0, -10_000.0));
        assert_eq!(orbit.pitch, 1.5);
    }

    #[test]
    fn test_orbit_pan_follows_yaw() {
        let mut orbit = OrbitCamera {
            focus: Vec3::ZERO,
            radius: 10.0,
            yaw: FRAC_PI_2,
            pitch: 0.0,
        };
        // Forward (-Z) turned a quarter around Y points along -X
        orbit.pan(Vec3::NEG_Z, 1.0);
        assert!(orbit.focus.distance(Vec3::new(-5.0, 0.0, 0.0)) < 1e-4);

        orbit.pan(Vec3::ZERO, 1.0);
        assert!(orbit.focus.distance(Vec3::new(-5.0, 0.0, 0.0)) < 1e-4);
    }

    #[test]
    fn test_pyramid_mesh_is_flat_shaded() {
        let mesh = shape_mesh(BodyShape::Pyramid);
        assert_eq!(mesh.count_vertices(), PYRAMID_TRIANGLES.len() * 3);
        assert!(mesh.attribute(Mesh::ATTRIBUTE_NORMAL).is_some());
    }

    #[test]
    fn test_terrain_mesh_matches_physics() {
        let terrain = TerrainMesh::generate(&rigidbench_core::TerrainConfig::small()).unwrap();
        let mesh = terrain_mesh(&terrain);
        assert_eq!(mesh.count_vertices(), terrain.vertices.len());
        assert_eq!(mesh.indices().map(|i| i.len()), Some(terrain.indices.len() * 3));
    }
}
