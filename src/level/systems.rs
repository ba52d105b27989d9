//! Systems for the demo arena.
use std::f32::consts::FRAC_PI_2;

use avian3d::prelude::*;
use bevy::prelude::*;

use crate::controller::{
    components::CameraSeeThrough, config::BallControllerSettings, orbit::OrbitCamera,
};

/// Half the inner width of the cubic room.
const ROOM_HALF_EXTENT: f32 = 15.0;
const WALL_THICKNESS: f32 = 1.0;
const BALL_RADIUS: f32 = 0.5;
const CAMERA_START_PITCH: f32 = -0.45;
const STANDARD_GRAVITY: f32 = 9.81;

/// Spawns the room shell, obstacles, the ball and the orbit camera rig.
pub fn spawn_arena(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<BallControllerSettings>,
) {
    let shell_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(90, 140, 90),
        perceptual_roughness: 0.9,
        ..default()
    });
    let pillar_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(150, 120, 90),
        perceptual_roughness: 0.8,
        ..default()
    });
    let glass = StandardMaterial {
        base_color: Color::srgb_u8(120, 170, 220),
        perceptual_roughness: 0.1,
        ..default()
    };

    let span = ROOM_HALF_EXTENT * 2.0 + WALL_THICKNESS * 2.0;
    let offset = ROOM_HALF_EXTENT + WALL_THICKNESS * 0.5;
    let shell = [
        ("Floor", Vec3::new(0.0, -offset, 0.0), Vec3::new(span, WALL_THICKNESS, span)),
        ("Ceiling", Vec3::new(0.0, offset, 0.0), Vec3::new(span, WALL_THICKNESS, span)),
        ("West Wall", Vec3::new(-offset, 0.0, 0.0), Vec3::new(WALL_THICKNESS, span, span)),
        ("East Wall", Vec3::new(offset, 0.0, 0.0), Vec3::new(WALL_THICKNESS, span, span)),
        ("North Wall", Vec3::new(0.0, 0.0, -offset), Vec3::new(span, span, WALL_THICKNESS)),
        ("South Wall", Vec3::new(0.0, 0.0, offset), Vec3::new(span, span, WALL_THICKNESS)),
    ];
    for (name, position, size) in shell {
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::from_size(size))),
            MeshMaterial3d(shell_material.clone()),
            Transform::from_translation(position),
            RigidBody::Static,
            Collider::cuboid(size.x, size.y, size.z),
            Name::new(name),
        ));
    }

    let floor_y = -ROOM_HALF_EXTENT;
    let pillars = [
        Vec3::new(6.0, 0.0, 4.0),
        Vec3::new(-7.0, 0.0, -5.0),
        Vec3::new(3.0, 0.0, -9.0),
    ];
    for (index, base) in pillars.into_iter().enumerate() {
        let size = Vec3::new(2.0, 8.0, 2.0);
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::from_size(size))),
            MeshMaterial3d(pillar_material.clone()),
            Transform::from_translation(base + Vec3::Y * (floor_y + size.y * 0.5)),
            RigidBody::Static,
            Collider::cuboid(size.x, size.y, size.z),
            Name::new(format!("Pillar {}", index)),
        ));
    }

    let glass_walls = [
        (Vec3::new(0.0, 0.0, 7.0), Vec3::new(10.0, 5.0, 0.4)),
        (Vec3::new(-9.0, 0.0, 3.0), Vec3::new(0.4, 5.0, 8.0)),
    ];
    for (index, (base, size)) in glass_walls.into_iter().enumerate() {
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::from_size(size))),
            // Each pane gets its own material so fading one leaves the other opaque.
            MeshMaterial3d(materials.add(glass.clone())),
            Transform::from_translation(base + Vec3::Y * (floor_y + size.y * 0.5)),
            RigidBody::Static,
            Collider::cuboid(size.x, size.y, size.z),
            CameraSeeThrough,
            Name::new(format!("Glass Wall {}", index)),
        ));
    }

    let ball_start = Vec3::new(0.0, floor_y + BALL_RADIUS + 0.5, 0.0);
    commands.spawn((
        Mesh3d(meshes.add(Sphere::new(BALL_RADIUS))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb_u8(210, 80, 60),
            metallic: 0.3,
            perceptual_roughness: 0.4,
            ..default()
        })),
        Transform::from_translation(ball_start),
        RigidBody::Dynamic,
        Collider::sphere(BALL_RADIUS),
        Friction::new(0.9),
        AngularDamping(0.6),
        Name::new(settings.ball_name.clone()),
    ));

    commands.spawn((
        PointLight {
            intensity: 4_000_000.0,
            range: ROOM_HALF_EXTENT * 4.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::default(),
    ));
    // Unshadowed so the ceiling does not black out the room.
    commands.spawn((
        DirectionalLight {
            illuminance: 3_000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(4.0, 10.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let orbit = OrbitCamera::new(0.0, CAMERA_START_PITCH, settings.follow_distance);
    let (position, rotation) = orbit.effective_transform(ball_start, Vec3::NEG_Y);
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(position).with_rotation(rotation),
        orbit,
        Name::new("Orbit Camera"),
    ));
}

/// Rotates gravity a quarter turn about Z on `G`; `R` restores standard gravity.
pub fn rotate_gravity(keyboard: Res<ButtonInput<KeyCode>>, mut gravity: ResMut<Gravity>) {
    let next = if keyboard.just_pressed(KeyCode::KeyR) {
        Vec3::NEG_Y * STANDARD_GRAVITY
    } else if keyboard.just_pressed(KeyCode::KeyG) {
        quarter_turn(gravity.0)
    } else {
        return;
    };

    gravity.0 = next;
    info!("Gravity set to ({:.2}, {:.2}, {:.2})", next.x, next.y, next.z);
}

fn quarter_turn(gravity: Vec3) -> Vec3 {
    Quat::from_rotation_z(FRAC_PI_2) * gravity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_turns_cycle_through_walls() {
        let mut gravity = Vec3::NEG_Y * STANDARD_GRAVITY;
        gravity = quarter_turn(gravity);
        assert!(gravity.abs_diff_eq(Vec3::X * STANDARD_GRAVITY, 1e-4));
        gravity = quarter_turn(gravity);
        assert!(gravity.abs_diff_eq(Vec3::Y * STANDARD_GRAVITY, 1e-4));
        gravity = quarter_turn(quarter_turn(gravity));
        assert!(gravity.abs_diff_eq(Vec3::NEG_Y * STANDARD_GRAVITY, 1e-4));
    }

    #[test]
    fn key_presses_update_gravity_resource() {
        let mut app = App::new();
        app.insert_resource(Gravity(Vec3::NEG_Y * STANDARD_GRAVITY))
            .init_resource::<ButtonInput<KeyCode>>()
            .add_systems(Update, rotate_gravity);

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyG);
        app.update();
        assert!(app
            .world()
            .resource::<Gravity>()
            .0
            .abs_diff_eq(Vec3::X * STANDARD_GRAVITY, 1e-4));

        let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        keys.clear();
        keys.press(KeyCode::KeyR);
        app.update();
        assert_eq!(
            app.world().resource::<Gravity>().0,
            Vec3::NEG_Y * STANDARD_GRAVITY
        );
    }
}
