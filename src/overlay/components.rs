// src/overlay/components.rs
//
// Marker components for the camera options overlay.

use bevy::prelude::*;

/// Root node of the camera options panel.
#[derive(Component, Debug)]
pub struct CameraOptionsPanel;

/// Button toggling whether camera rotation requires a held mouse button.
#[derive(Component, Debug)]
pub struct RequireButtonToggle;

/// Text child of [`RequireButtonToggle`].
#[derive(Component, Debug)]
pub struct RequireButtonLabel;

/// Text line showing ball and camera state.
#[derive(Component, Debug)]
pub struct OverlayStatusText;
