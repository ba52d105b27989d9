//! Third-person orbit camera that follows the ball under arbitrary gravity.
use std::f32::consts::TAU;

use avian3d::prelude::Gravity;
use bevy::{
    ecs::message::MessageReader,
    input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel},
    prelude::*,
};

use crate::controller::{
    components::ControlledBall, config::BallControllerSettings, locomotion::gravity_up,
};

/// Pixel scroll deltas per wheel "line".
const PIXELS_PER_LINE: f32 = 120.0;

/// Orbit state stored on the camera entity.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub yaw: f32,
    pub pitch: f32,
    follow_distance: f32,
    naive_target: Vec3,
}

impl OrbitCamera {
    pub fn new(yaw: f32, pitch: f32, follow_distance: f32) -> Self {
        Self {
            yaw,
            pitch,
            follow_distance,
            naive_target: Vec3::ZERO,
        }
    }

    pub fn follow_distance(&self) -> f32 {
        self.follow_distance
    }

    /// Position behind the ball before occlusion is taken into account.
    pub fn naive_target(&self) -> Vec3 {
        self.naive_target
    }

    /// Accumulates pointer motion, then wraps yaw and clamps pitch.
    pub fn rotate(&mut self, pointer_delta: Vec2, settings: &BallControllerSettings) {
        self.yaw -= pointer_delta.x * settings.turn_speed;
        self.pitch -= pointer_delta.y * settings.turn_speed;
        self.constrain(settings);
    }

    pub fn constrain(&mut self, settings: &BallControllerSettings) {
        self.yaw = wrap_yaw(self.yaw);
        self.pitch = self.pitch.clamp(settings.min_pitch, settings.max_pitch);
    }

    /// Positive wheel deltas move the camera closer.
    pub fn zoom(&mut self, wheel_delta: f32, settings: &BallControllerSettings) {
        if wheel_delta == 0.0 {
            return;
        }
        self.follow_distance = (self.follow_distance - wheel_delta * settings.zoom_speed).clamp(
            settings.min_follow_distance,
            settings.max_follow_distance,
        );
    }

    /// Yaw then pitch, re-aligned so the camera's up follows gravity.
    pub fn orientation(&self, gravity: Vec3) -> Quat {
        let local = Quat::from_axis_angle(Vec3::Y, self.yaw)
            * Quat::from_axis_angle(Vec3::X, self.pitch);
        let gravity_align = Quat::from_rotation_arc(Vec3::Y, gravity_up(gravity));
        (gravity_align * local).normalize()
    }

    /// Camera pose for the given ball position and gravity, without touching state.
    pub fn effective_transform(&self, ball_position: Vec3, gravity: Vec3) -> (Vec3, Quat) {
        let rotation = self.orientation(gravity);
        let forward = rotation * Vec3::NEG_Z;
        (ball_position - forward * self.follow_distance, rotation)
    }
}

/// Brings yaw back inside (-2π, 2π) one turn at a time.
pub fn wrap_yaw(mut yaw: f32) -> f32 {
    if !yaw.is_finite() {
        return 0.0;
    }
    while yaw <= -TAU {
        yaw += TAU;
    }
    while yaw >= TAU {
        yaw -= TAU;
    }
    yaw
}

/// Whether pointer motion may rotate the camera this frame.
pub fn pointer_rotation_allowed(
    require_mouse_button: bool,
    over_overlay: bool,
    button_held: bool,
) -> bool {
    !over_overlay && (!require_mouse_button || button_held)
}

/// True while the pointer hovers or presses any interactive UI node.
pub fn pointer_over_overlay<'a>(interactions: impl IntoIterator<Item = &'a Interaction>) -> bool {
    interactions
        .into_iter()
        .any(|interaction| *interaction != Interaction::None)
}

/// Updates yaw, pitch and zoom from the mouse and aims the camera at the ball.
#[allow(clippy::too_many_arguments)]
pub fn update_orbit_camera(
    mut motion_events: MessageReader<MouseMotion>,
    mut wheel_events: MessageReader<MouseWheel>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    interactions: Query<&Interaction>,
    gravity: Res<Gravity>,
    settings: Res<BallControllerSettings>,
    ball: Query<&Transform, (With<ControlledBall>, Without<OrbitCamera>)>,
    mut camera: Query<(&mut OrbitCamera, &mut Transform), Without<ControlledBall>>,
) {
    let mut pointer_delta = Vec2::ZERO;
    for ev in motion_events.read() {
        pointer_delta += ev.delta;
    }

    let mut wheel_delta = 0.0;
    for ev in wheel_events.read() {
        wheel_delta += match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y / PIXELS_PER_LINE,
        };
    }

    let Ok(ball_transform) = ball.single() else {
        return;
    };
    let Ok((mut orbit, mut transform)) = camera.single_mut() else {
        return;
    };

    let over_overlay = pointer_over_overlay(&interactions);
    let button_held = mouse_buttons.any_pressed([MouseButton::Left, MouseButton::Right]);

    if pointer_rotation_allowed(settings.require_mouse_button, over_overlay, button_held) {
        orbit.rotate(pointer_delta, &settings);
    } else {
        orbit.constrain(&settings);
    }

    if !over_overlay {
        orbit.zoom(wheel_delta, &settings);
    }

    let (naive_target, rotation) =
        orbit.effective_transform(ball_transform.translation, gravity.0);
    orbit.naive_target = naive_target;
    transform.rotation = rotation;
}
