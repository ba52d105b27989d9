// src/overlay/systems.rs
//
// Systems for the camera options panel, status readout and cursor grab.

use avian3d::prelude::Gravity;
use bevy::{
    prelude::*,
    window::{CursorGrabMode, CursorOptions},
};

use crate::controller::{
    components::{BallState, ControlledBall},
    config::BallControllerSettings,
    orbit::{pointer_over_overlay, OrbitCamera},
};

use super::components::{
    CameraOptionsPanel, OverlayStatusText, RequireButtonLabel, RequireButtonToggle,
};

// Visual constants
const PANEL_COLOR: Color = Color::srgba(0.08, 0.08, 0.1, 0.9);
const BORDER_COLOR: Color = Color::srgb(0.3, 0.3, 0.32);
const BUTTON_COLOR: Color = Color::srgba(0.18, 0.18, 0.22, 0.95);
const BUTTON_HOVER_COLOR: Color = Color::srgba(0.26, 0.26, 0.32, 0.95);
const TEXT_COLOR: Color = Color::WHITE;

/// Spawns the top-left options panel.
pub fn spawn_overlay_panel(mut commands: Commands, settings: Res<BallControllerSettings>) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(16.0),
                left: Val::Px(16.0),
                width: Val::Px(280.0),
                padding: UiRect::all(Val::Px(12.0)),
                border: UiRect::all(Val::Px(2.0)),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(8.0),
                ..default()
            },
            BackgroundColor(PANEL_COLOR),
            BorderColor::from(BORDER_COLOR),
            // Lets the whole panel count as an interactive region.
            Interaction::None,
            CameraOptionsPanel,
            Name::new("Camera Options Panel"),
        ))
        .with_children(|panel| {
            panel.spawn((
                Text::new("WASD roll | Shift sprint | G rotate gravity | R reset"),
                TextFont {
                    font_size: 13.0,
                    ..default()
                },
                TextColor(TEXT_COLOR),
            ));

            panel
                .spawn((
                    Node {
                        width: Val::Percent(100.0),
                        padding: UiRect::all(Val::Px(6.0)),
                        border: UiRect::all(Val::Px(1.5)),
                        justify_content: JustifyContent::Center,
                        align_items: AlignItems::Center,
                        ..default()
                    },
                    Button,
                    Interaction::None,
                    BackgroundColor(BUTTON_COLOR),
                    BorderColor::from(BORDER_COLOR),
                    RequireButtonToggle,
                    Name::new("Require Button Toggle"),
                ))
                .with_children(|button| {
                    button.spawn((
                        Text::new(require_button_label(settings.require_mouse_button)),
                        TextFont {
                            font_size: 14.0,
                            ..default()
                        },
                        TextColor(TEXT_COLOR),
                        RequireButtonLabel,
                    ));
                });

            panel.spawn((
                Text::new(""),
                TextFont {
                    font_size: 13.0,
                    ..default()
                },
                TextColor(TEXT_COLOR),
                OverlayStatusText,
            ));
        });
}

/// Flips `require_mouse_button` when the toggle is pressed and tints it on hover.
#[allow(clippy::type_complexity)]
pub fn handle_require_button_toggle(
    mut settings: ResMut<BallControllerSettings>,
    mut buttons: Query<
        (&Interaction, &mut BackgroundColor),
        (Changed<Interaction>, With<RequireButtonToggle>),
    >,
) {
    for (interaction, mut background) in buttons.iter_mut() {
        match *interaction {
            Interaction::Pressed => {
                settings.require_mouse_button = !settings.require_mouse_button;
                info!(
                    "Camera rotation requires mouse button: {}",
                    settings.require_mouse_button
                );
            }
            Interaction::Hovered => background.0 = BUTTON_HOVER_COLOR,
            Interaction::None => background.0 = BUTTON_COLOR,
        }
    }
}

pub fn refresh_require_button_label(
    settings: Res<BallControllerSettings>,
    mut labels: Query<&mut Text, With<RequireButtonLabel>>,
) {
    if !settings.is_changed() {
        return;
    }
    for mut text in labels.iter_mut() {
        text.0 = require_button_label(settings.require_mouse_button).to_string();
    }
}

pub fn refresh_status_text(
    gravity: Res<Gravity>,
    ball: Query<&BallState, With<ControlledBall>>,
    camera: Query<(&OrbitCamera, &Transform)>,
    mut status: Query<&mut Text, With<OverlayStatusText>>,
) {
    let (Ok(state), Ok((orbit, transform))) = (ball.single(), camera.single()) else {
        return;
    };
    let Ok(mut text) = status.single_mut() else {
        return;
    };

    text.0 = status_line(
        state,
        orbit.follow_distance(),
        orbit.naive_target().distance(transform.translation),
        gravity.0,
    );
}

/// Locks the cursor while the right button drags the camera outside the panel.
pub fn update_cursor_grab(
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    interactions: Query<&Interaction>,
    mut cursor_options: Single<&mut CursorOptions>,
) {
    if mouse_buttons.just_pressed(MouseButton::Right) && !pointer_over_overlay(&interactions) {
        cursor_options.visible = false;
        cursor_options.grab_mode = CursorGrabMode::Locked;
    } else if mouse_buttons.just_released(MouseButton::Right) {
        cursor_options.visible = true;
        cursor_options.grab_mode = CursorGrabMode::None;
    }
}

fn require_button_label(required: bool) -> &'static str {
    if required {
        "Camera: hold mouse button"
    } else {
        "Camera: free look"
    }
}

fn status_line(state: &BallState, follow_distance: f32, pulled_in: f32, gravity: Vec3) -> String {
    format!(
        "Grounded: {} | Follow: {:.1} (pulled in {:.1})\nGravity: ({:.1}, {:.1}, {:.1})",
        if state.is_on_ground { "yes" } else { "no" },
        follow_distance,
        pulled_in,
        gravity.x,
        gravity.y,
        gravity.z
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_reports_ground_and_distances() {
        let state = BallState {
            current_motion_direction: Vec3::Z,
            is_on_ground: true,
        };
        let line = status_line(&state, 12.0, 3.25, Vec3::new(0.0, -9.81, 0.0));
        assert!(line.starts_with("Grounded: yes"));
        assert!(line.contains("Follow: 12.0"));
        assert!(line.contains("pulled in 3.2") || line.contains("pulled in 3.3"));
        assert!(line.contains("(0.0, -9.8, 0.0)"));
    }

    #[test]
    fn pressing_toggle_flips_requirement() {
        let mut app = App::new();
        app.insert_resource(BallControllerSettings::default())
            .add_systems(Update, handle_require_button_toggle);

        app.world_mut().spawn((
            Interaction::Pressed,
            BackgroundColor(BUTTON_COLOR),
            RequireButtonToggle,
        ));
        app.update();
        assert!(app.world().resource::<BallControllerSettings>().require_mouse_button);

        // Interaction unchanged, so the next frame must not toggle again.
        app.update();
        assert!(app.world().resource::<BallControllerSettings>().require_mouse_button);
    }

    #[test]
    fn labels_describe_mode() {
        assert_eq!(require_button_label(true), "Camera: hold mouse button");
        assert_eq!(require_button_label(false), "Camera: free look");
    }
}
