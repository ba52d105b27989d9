//! LevelPlugin spawns the arena and exposes gravity controls.
use bevy::prelude::*;

use crate::{
    controller::plugin::BallControllerSet,
    level::systems::{rotate_gravity, spawn_arena},
};

pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_arena)
            .add_systems(Update, rotate_gravity.before(BallControllerSet));
    }
}
