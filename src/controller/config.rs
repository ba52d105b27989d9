//! Ball controller configuration loaded from `config/ball_controller.toml`.
use std::{fs, path::Path};

use bevy::prelude::*;
use serde::Deserialize;

const CONFIG_PATH: &str = "config/ball_controller.toml";

#[derive(Debug, Clone, Deserialize, Default)]
struct RawControllerConfig {
    #[serde(default)]
    ball: RawBallSection,
    #[serde(default)]
    camera: RawCameraSection,
    #[serde(default)]
    occlusion: RawOcclusionSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawBallSection {
    name: String,
    push_force: f32,
    sprint_factor: f32,
}

impl Default for RawBallSection {
    fn default() -> Self {
        Self {
            name: "Ball".to_string(),
            push_force: 100.0,
            sprint_factor: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawCameraSection {
    min_pitch: f32,
    max_pitch: f32,
    require_mouse_button: bool,
    follow_distance: f32,
    min_follow_distance: f32,
    max_follow_distance: f32,
    zoom_speed: f32,
    turn_speed: f32,
}

impl Default for RawCameraSection {
    fn default() -> Self {
        Self {
            min_pitch: -0.95,
            max_pitch: -0.15,
            require_mouse_button: false,
            follow_distance: 10.0,
            min_follow_distance: 5.0,
            max_follow_distance: 25.0,
            zoom_speed: 0.48,
            turn_speed: 0.005,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawOcclusionSection {
    ray_hit_correction_distance: f32,
    see_through_opacity: f32,
    release_markers_on_miss: bool,
}

impl Default for RawOcclusionSection {
    fn default() -> Self {
        Self {
            ray_hit_correction_distance: 0.5,
            see_through_opacity: 0.33,
            release_markers_on_miss: false,
        }
    }
}

/// Tunables shared by the locomotion, orbit and occlusion systems.
#[derive(Resource, Debug, Clone)]
pub struct BallControllerSettings {
    /// Name of the entity the controller drives.
    pub ball_name: String,
    pub push_force: f32,
    /// Impulse multiplier while the sprint modifier is held.
    pub sprint_factor: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
    /// When set, pointer rotation only applies while a mouse button is held.
    pub require_mouse_button: bool,
    /// Starting follow distance for a freshly spawned camera rig.
    pub follow_distance: f32,
    pub min_follow_distance: f32,
    pub max_follow_distance: f32,
    pub zoom_speed: f32,
    pub turn_speed: f32,
    /// Offset past a blocking hit, along camera forward.
    pub ray_hit_correction_distance: f32,
    pub see_through_opacity: f32,
    /// Run the occluder diff on frames where the ray hits nothing.
    pub release_markers_on_miss: bool,
}

impl BallControllerSettings {
    pub fn load_or_default() -> Self {
        let path = Path::new(CONFIG_PATH);
        match fs::read_to_string(path) {
            Ok(data) => Self::from_toml_str(&data).unwrap_or_else(|err| {
                warn!(
                    "Failed to parse {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                RawControllerConfig::default().into()
            }),
            Err(err) => {
                warn!(
                    "Failed to read {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                RawControllerConfig::default().into()
            }
        }
    }

    pub fn from_toml_str(data: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<RawControllerConfig>(data).map(Into::into)
    }
}

impl Default for BallControllerSettings {
    fn default() -> Self {
        RawControllerConfig::default().into()
    }
}

impl From<RawControllerConfig> for BallControllerSettings {
    fn from(value: RawControllerConfig) -> Self {
        let ball = value.ball;
        let camera = value.camera;
        let occlusion = value.occlusion;

        let ball_name = match ball.name.trim() {
            "" => RawBallSection::default().name,
            trimmed => trimmed.to_string(),
        };

        let min_pitch = camera.min_pitch.min(camera.max_pitch);
        let max_pitch = camera.max_pitch.max(camera.min_pitch);

        let min_follow_distance = camera.min_follow_distance.max(0.0);
        let max_follow_distance = camera.max_follow_distance.max(min_follow_distance);

        Self {
            ball_name,
            push_force: ball.push_force.max(0.0),
            sprint_factor: ball.sprint_factor.max(0.0),
            min_pitch,
            max_pitch,
            require_mouse_button: camera.require_mouse_button,
            follow_distance: camera
                .follow_distance
                .clamp(min_follow_distance, max_follow_distance),
            min_follow_distance,
            max_follow_distance,
            zoom_speed: camera.zoom_speed,
            turn_speed: camera.turn_speed,
            ray_hit_correction_distance: occlusion.ray_hit_correction_distance,
            see_through_opacity: occlusion.see_through_opacity.clamp(0.0, 1.0),
            release_markers_on_miss: occlusion.release_markers_on_miss,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_values() {
        let settings = BallControllerSettings::default();
        assert_eq!(settings.ball_name, "Ball");
        assert_eq!(settings.push_force, 100.0);
        assert_eq!(settings.follow_distance, 10.0);
        assert!(settings.min_pitch < settings.max_pitch);
        assert!((settings.see_through_opacity - 0.33).abs() < f32::EPSILON);
        assert!(!settings.release_markers_on_miss);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let settings = BallControllerSettings::from_toml_str(
            r#"
            [ball]
            name = "Marble"

            [camera]
            require_mouse_button = true
            "#,
        )
        .expect("valid toml");

        assert_eq!(settings.ball_name, "Marble");
        assert!(settings.require_mouse_button);
        assert_eq!(settings.max_follow_distance, 25.0);
    }

    #[test]
    fn sanitises_out_of_order_values() {
        let settings = BallControllerSettings::from_toml_str(
            r#"
            [ball]
            name = "   "
            push_force = -4.0

            [camera]
            min_pitch = -0.1
            max_pitch = -0.9
            follow_distance = 100.0
            min_follow_distance = 8.0
            max_follow_distance = 3.0

            [occlusion]
            see_through_opacity = 1.7
            "#,
        )
        .expect("valid toml");

        assert_eq!(settings.ball_name, "Ball");
        assert_eq!(settings.push_force, 0.0);
        assert_eq!(settings.min_pitch, -0.9);
        assert_eq!(settings.max_pitch, -0.1);
        assert_eq!(settings.min_follow_distance, 8.0);
        assert_eq!(settings.max_follow_distance, 8.0);
        assert_eq!(settings.follow_distance, 8.0);
        assert_eq!(settings.see_through_opacity, 1.0);
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(BallControllerSettings::from_toml_str("[camera\nzoom_speed = ").is_err());
    }
}
