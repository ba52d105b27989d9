//! BallControllerPlugin wires the per-frame locomotion, camera and occlusion systems.
use avian3d::prelude::CollidingEntities;
use bevy::prelude::*;
#[cfg(feature = "camera_debug")]
use bevy::time::TimerMode;

#[cfg(feature = "camera_debug")]
use crate::controller::orbit::OrbitCamera;
use crate::controller::{
    components::{BallBinding, BallState, ControlledBall},
    config::BallControllerSettings,
    errors::BallControllerError,
    locomotion::drive_ball_locomotion,
    occlusion::{release_markers_without_camera, resolve_camera_occlusion, OcclusionTracker},
    orbit::update_orbit_camera,
    transparency::{apply_transient_transparency, restore_opaque_materials},
};

/// Ordering handle for everything the controller runs in `Update`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct BallControllerSet;

#[cfg(feature = "camera_debug")]
#[derive(Resource)]
struct CameraDebugTimer {
    timer: Timer,
}

#[cfg(feature = "camera_debug")]
impl Default for CameraDebugTimer {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(1.0, TimerMode::Repeating),
        }
    }
}

pub struct BallControllerPlugin;

impl Plugin for BallControllerPlugin {
    fn build(&self, app: &mut App) {
        let settings = BallControllerSettings::load_or_default();
        info!(
            "Ball controller configured for '{}': push force {:.1}, follow distance {:.1} ({:.1}..{:.1})",
            settings.ball_name,
            settings.push_force,
            settings.follow_distance,
            settings.min_follow_distance,
            settings.max_follow_distance
        );

        app.insert_resource(settings)
            .init_resource::<OcclusionTracker>()
            .add_systems(PostStartup, bind_controlled_ball)
            .add_systems(
                Update,
                (
                    drive_ball_locomotion,
                    update_orbit_camera,
                    resolve_camera_occlusion,
                    apply_transient_transparency,
                    restore_opaque_materials,
                    release_markers_without_camera,
                )
                    .chain()
                    .in_set(BallControllerSet),
            );

        #[cfg(feature = "camera_debug")]
        {
            app.init_resource::<CameraDebugTimer>()
                .add_systems(Update, log_camera_state.after(BallControllerSet));
        }
    }
}

/// Resolves the configured ball name to exactly one entity.
pub fn find_ball<'a>(
    name: &str,
    candidates: impl IntoIterator<Item = (Entity, &'a str)>,
) -> Result<Entity, BallControllerError> {
    let matches: Vec<Entity> = candidates
        .into_iter()
        .filter(|(_, candidate)| *candidate == name)
        .map(|(entity, _)| entity)
        .collect();

    match matches.as_slice() {
        [ball] => Ok(*ball),
        [] => Err(BallControllerError::ball_not_found(name)),
        _ => Err(BallControllerError::ambiguous_ball(name, matches.len())),
    }
}

/// Binds the named ball once the scene exists; a missing ball aborts startup.
pub fn bind_controlled_ball(
    mut commands: Commands,
    settings: Res<BallControllerSettings>,
    named: Query<(Entity, &Name)>,
) -> Result {
    let ball = find_ball(
        &settings.ball_name,
        named.iter().map(|(entity, name)| (entity, name.as_str())),
    )?;

    commands.entity(ball).insert((
        ControlledBall,
        BallState::default(),
        CollidingEntities::default(),
    ));
    commands.insert_resource(BallBinding::new(ball));

    info!("Ball controller bound to '{}' ({:?})", settings.ball_name, ball);
    Ok(())
}

#[cfg(feature = "camera_debug")]
fn log_camera_state(
    mut timer: ResMut<CameraDebugTimer>,
    time: Res<Time>,
    tracker: Res<OcclusionTracker>,
    camera: Query<(&OrbitCamera, &Transform)>,
    ball: Query<&BallState, With<ControlledBall>>,
) {
    if !timer.timer.tick(time.delta()).just_finished() {
        return;
    }
    let (Ok((orbit, transform)), Ok(state)) = (camera.single(), ball.single()) else {
        return;
    };
    info!(
        target: "camera_debug",
        "yaw {:.2} | pitch {:.2} | follow {:.2} | pulled in {:.2} | hits {} | see-through {} | grounded {}",
        orbit.yaw,
        orbit.pitch,
        orbit.follow_distance(),
        orbit.naive_target().distance(transform.translation),
        tracker.hits().len(),
        tracker.sets.previous().len(),
        state.is_on_ground,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_named(world: &mut World, names: &[&str]) -> Vec<Entity> {
        names
            .iter()
            .map(|name| world.spawn(Name::new(name.to_string())).id())
            .collect()
    }

    #[test]
    fn finds_unique_ball() {
        let mut world = World::new();
        let ids = spawn_named(&mut world, &["Ground", "Ball", "Pillar"]);
        let candidates = [(ids[0], "Ground"), (ids[1], "Ball"), (ids[2], "Pillar")];
        assert_eq!(find_ball("Ball", candidates), Ok(ids[1]));
    }

    #[test]
    fn missing_or_duplicate_ball_is_an_error() {
        let mut world = World::new();
        let ids = spawn_named(&mut world, &["Ball", "Ball"]);

        assert_eq!(
            find_ball("Marble", [(ids[0], "Ball")]),
            Err(BallControllerError::ball_not_found("Marble"))
        );
        assert_eq!(
            find_ball("Ball", [(ids[0], "Ball"), (ids[1], "Ball")]),
            Err(BallControllerError::ambiguous_ball("Ball", 2))
        );
    }

    #[test]
    fn binding_marks_ball_and_stores_handle() {
        let mut app = App::new();
        app.insert_resource(BallControllerSettings::default())
            .add_systems(Update, bind_controlled_ball);

        let ball = app.world_mut().spawn(Name::new("Ball")).id();
        app.world_mut().spawn(Name::new("Ground"));

        app.update();

        let world = app.world();
        assert_eq!(world.resource::<BallBinding>().ball(), ball);
        assert!(world.get::<ControlledBall>(ball).is_some());
        assert_eq!(world.get::<BallState>(ball), Some(&BallState::default()));
    }
}
