use avian3d::prelude::*;
use bevy::prelude::*;

mod controller;
mod level;
mod overlay;

use crate::{controller::BallControllerPlugin, level::LevelPlugin, overlay::OverlayPlugin};

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            PhysicsPlugins::default(),
            LevelPlugin,
            BallControllerPlugin, // Binds the ball spawned by LevelPlugin in PostStartup
            OverlayPlugin,
        ))
        .run();
}
