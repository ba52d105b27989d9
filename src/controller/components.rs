//! Components and resources shared by the ball controller systems.
use bevy::prelude::*;

/// Marker for the rigid body driven by the controller.
#[derive(Component, Debug)]
pub struct ControlledBall;

/// Per-frame state published by the locomotion system for other consumers.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct BallState {
    /// Unit motion intent in world space, or zero when no key is held.
    pub current_motion_direction: Vec3,
    /// True while the ball's collider touches anything.
    pub is_on_ground: bool,
}

/// The ball entity resolved by name at startup.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BallBinding {
    ball: Entity,
}

impl BallBinding {
    pub fn new(ball: Entity) -> Self {
        Self { ball }
    }

    pub fn ball(&self) -> Entity {
        self.ball
    }
}

/// Scene geometry the camera may look through instead of being pushed in front of.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct CameraSeeThrough;

/// Frame-scoped request to render an object at reduced opacity.
///
/// Present exactly while the object is in the see-through occluder set.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct TransientTransparency {
    pub opacity: f32,
}

impl TransientTransparency {
    pub fn new(opacity: f32) -> Self {
        Self {
            opacity: opacity.clamp(0.0, 1.0),
        }
    }
}
