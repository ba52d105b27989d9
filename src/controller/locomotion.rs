//! Gravity-relative rolling input for the controlled ball.
use avian3d::prelude::*;
use bevy::prelude::*;

use crate::controller::{
    components::{BallState, ControlledBall},
    config::BallControllerSettings,
    orbit::OrbitCamera,
};

/// Directional keys sampled once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionKeys {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub sprint: bool,
}

impl DirectionKeys {
    pub fn from_input(keyboard: &ButtonInput<KeyCode>) -> Self {
        Self {
            forward: keyboard.pressed(KeyCode::KeyW),
            back: keyboard.pressed(KeyCode::KeyS),
            left: keyboard.pressed(KeyCode::KeyA),
            right: keyboard.pressed(KeyCode::KeyD),
            sprint: keyboard.pressed(KeyCode::ShiftLeft),
        }
    }
}

/// Returns the unit "up" implied by a gravity vector, falling back to +Y.
pub fn gravity_up(gravity: Vec3) -> Vec3 {
    (-gravity).try_normalize().unwrap_or(Vec3::Y)
}

/// Camera axes with their gravity component removed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityBasis {
    pub forward: Vec3,
    pub right: Vec3,
}

impl GravityBasis {
    pub fn new(forward: Vec3, right: Vec3, gravity: Vec3) -> Self {
        let up = gravity_up(gravity);
        Self {
            forward: flatten(forward, up),
            right: flatten(right, up),
        }
    }
}

fn flatten(axis: Vec3, up: Vec3) -> Vec3 {
    (axis - axis.project_onto_normalized(up)).normalize_or_zero()
}

/// Torque axis and travel direction built from the same key combination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionIntent {
    pub rotation: Vec3,
    pub motion: Vec3,
}

impl LocomotionIntent {
    pub fn from_keys(keys: &DirectionKeys, basis: &GravityBasis) -> Self {
        let mut rotation = Vec3::ZERO;
        let mut motion = Vec3::ZERO;
        if keys.forward {
            rotation -= basis.right;
            motion += basis.forward;
        }
        if keys.back {
            rotation += basis.right;
            motion -= basis.forward;
        }
        if keys.left {
            rotation -= basis.forward;
            motion -= basis.right;
        }
        if keys.right {
            rotation += basis.forward;
            motion += basis.right;
        }
        Self { rotation, motion }
    }

    pub fn is_idle(&self) -> bool {
        self.rotation == Vec3::ZERO
    }
}

/// Outcome of one locomotion tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionStep {
    /// Angular impulse to apply, if any key produced a rotation.
    pub angular_impulse: Option<Vec3>,
    pub motion_direction: Vec3,
}

/// Turns key state into an impulse scaled by force, sprint and frame time.
pub fn plan_locomotion(
    keys: &DirectionKeys,
    basis: &GravityBasis,
    settings: &BallControllerSettings,
    delta_seconds: f32,
) -> LocomotionStep {
    let intent = LocomotionIntent::from_keys(keys, basis);
    if intent.is_idle() {
        return LocomotionStep {
            angular_impulse: None,
            motion_direction: intent.motion,
        };
    }

    debug_assert!(
        intent.motion != Vec3::ZERO,
        "rotation intent {:?} without a matching motion intent",
        intent.rotation
    );

    let rotation = intent.rotation.normalize_or_zero();
    let motion = intent.motion.normalize_or_zero();

    let mut force = settings.push_force;
    if keys.sprint {
        force *= settings.sprint_factor;
    }

    LocomotionStep {
        angular_impulse: Some(rotation * force * delta_seconds),
        motion_direction: motion,
    }
}

/// Applies WASD input as an angular impulse and publishes the motion direction.
///
/// Uses the camera's axes from the previous frame, before the orbit system
/// re-orients it.
pub fn drive_ball_locomotion(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    gravity: Res<Gravity>,
    settings: Res<BallControllerSettings>,
    camera: Query<&Transform, (With<OrbitCamera>, Without<ControlledBall>)>,
    mut ball: Query<(Forces, &mut BallState, Option<&CollidingEntities>), With<ControlledBall>>,
) {
    let Ok(camera_transform) = camera.single() else {
        return;
    };
    let Ok((mut forces, mut state, colliding)) = ball.single_mut() else {
        return;
    };

    let on_ground = colliding.is_some_and(|entities| !entities.is_empty());
    if state.is_on_ground != on_ground {
        debug!("Ball grounded: {}", on_ground);
        state.is_on_ground = on_ground;
    }

    let basis = GravityBasis::new(
        camera_transform.forward().as_vec3(),
        camera_transform.right().as_vec3(),
        gravity.0,
    );
    let keys = DirectionKeys::from_input(&keyboard);
    let step = plan_locomotion(&keys, &basis, &settings, time.delta_secs());

    // Forces wakes a sleeping body before applying the impulse.
    if let Some(impulse) = step.angular_impulse {
        forces.apply_angular_impulse(impulse);
    }

    state.current_motion_direction = step.motion_direction;
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_1_SQRT_2;

    use super::*;

    const EPS: f32 = 1e-5;

    fn world_down_basis() -> GravityBasis {
        GravityBasis::new(Vec3::NEG_Z, Vec3::X, Vec3::new(0.0, -9.81, 0.0))
    }

    #[test]
    fn basis_is_unchanged_for_level_axes() {
        let basis = world_down_basis();
        assert!(basis.forward.abs_diff_eq(Vec3::NEG_Z, EPS));
        assert!(basis.right.abs_diff_eq(Vec3::X, EPS));
    }

    #[test]
    fn basis_drops_component_along_tilted_gravity() {
        let gravity = Vec3::new(9.81, 0.0, 0.0);
        let forward = Vec3::new(1.0, 0.0, -1.0).normalize();
        let basis = GravityBasis::new(forward, Vec3::X, gravity);

        assert!(basis.forward.dot(gravity_up(gravity)).abs() < EPS);
        assert!((basis.forward.length() - 1.0).abs() < EPS);
        assert!(basis.forward.abs_diff_eq(Vec3::NEG_Z, EPS));
        // Right lies entirely along gravity and collapses instead of becoming NaN.
        assert_eq!(basis.right, Vec3::ZERO);
    }

    #[test]
    fn zero_gravity_falls_back_to_world_up() {
        assert_eq!(gravity_up(Vec3::ZERO), Vec3::Y);
        assert!(gravity_up(Vec3::new(0.0, 3.0, 0.0)).abs_diff_eq(Vec3::NEG_Y, EPS));
    }

    #[test]
    fn forward_key_rolls_about_negative_right() {
        let keys = DirectionKeys {
            forward: true,
            ..Default::default()
        };
        let intent = LocomotionIntent::from_keys(&keys, &world_down_basis());
        assert!(intent.rotation.abs_diff_eq(Vec3::NEG_X, EPS));
        assert!(intent.motion.abs_diff_eq(Vec3::NEG_Z, EPS));
        assert!((intent.rotation.length() - 1.0).abs() < EPS);
        assert!((intent.motion.length() - 1.0).abs() < EPS);
    }

    #[test]
    fn opposing_keys_cancel_both_intents() {
        let keys = DirectionKeys {
            forward: true,
            back: true,
            left: true,
            right: true,
            sprint: false,
        };
        let intent = LocomotionIntent::from_keys(&keys, &world_down_basis());
        assert!(intent.is_idle());
        assert_eq!(intent.motion, Vec3::ZERO);
    }

    #[test]
    fn diagonal_input_is_normalised_and_scaled() {
        let settings = BallControllerSettings {
            push_force: 10.0,
            ..Default::default()
        };
        let keys = DirectionKeys {
            forward: true,
            right: true,
            ..Default::default()
        };
        let step = plan_locomotion(&keys, &world_down_basis(), &settings, 0.5);

        let impulse = step.angular_impulse.expect("impulse for pressed keys");
        assert!((impulse.length() - 5.0).abs() < EPS);
        assert!(impulse.abs_diff_eq(Vec3::new(-FRAC_1_SQRT_2, 0.0, -FRAC_1_SQRT_2) * 5.0, EPS));
        assert!(step
            .motion_direction
            .abs_diff_eq(Vec3::new(FRAC_1_SQRT_2, 0.0, -FRAC_1_SQRT_2), EPS));
    }

    #[test]
    fn sprint_multiplies_push_force() {
        let settings = BallControllerSettings {
            push_force: 10.0,
            sprint_factor: 2.5,
            ..Default::default()
        };
        let keys = DirectionKeys {
            back: true,
            sprint: true,
            ..Default::default()
        };
        let step = plan_locomotion(&keys, &world_down_basis(), &settings, 1.0);
        let impulse = step.angular_impulse.expect("impulse for pressed keys");
        assert!(impulse.abs_diff_eq(Vec3::X * 25.0, EPS));
        assert!(step.motion_direction.abs_diff_eq(Vec3::Z, EPS));
    }

    #[test]
    fn idle_frame_publishes_zero_motion() {
        let step = plan_locomotion(
            &DirectionKeys::default(),
            &world_down_basis(),
            &BallControllerSettings::default(),
            0.016,
        );
        assert_eq!(step.angular_impulse, None);
        assert_eq!(step.motion_direction, Vec3::ZERO);
    }
}
