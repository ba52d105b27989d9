// src/overlay/plugin.rs
//
// Plugin registration for the camera options overlay.

use bevy::prelude::*;

use crate::controller::plugin::BallControllerSet;

use super::systems::{
    handle_require_button_toggle, refresh_require_button_label, refresh_status_text,
    spawn_overlay_panel, update_cursor_grab,
};

/// Plugin providing the camera options panel.
///
/// # System Ordering
///
/// 1. `handle_require_button_toggle` / `update_cursor_grab` - before the controller reads input
/// 2. `refresh_require_button_label` / `refresh_status_text` - after the controller has run
pub struct OverlayPlugin;

impl Plugin for OverlayPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_overlay_panel).add_systems(
            Update,
            (
                (handle_require_button_toggle, update_cursor_grab).before(BallControllerSet),
                (refresh_require_button_label, refresh_status_text).after(BallControllerSet),
            ),
        );

        info!("OverlayPlugin registered");
    }
}
