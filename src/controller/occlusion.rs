//! Camera occlusion: pulls the camera in front of blocking geometry and fades
//! see-through geometry that sits between the camera and the ball.
use std::collections::HashSet;

use bevy::{
    picking::mesh_picking::ray_cast::{MeshRayCast, MeshRayCastSettings, RayCastVisibility},
    prelude::*,
};

use crate::controller::{
    components::{BallBinding, CameraSeeThrough, TransientTransparency},
    config::BallControllerSettings,
    orbit::OrbitCamera,
};

/// What a ray hit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitSubject {
    Ball,
    SeeThrough(Entity),
    Solid(Entity),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OcclusionHit {
    pub subject: HitSubject,
    pub distance: f32,
    pub location: Vec3,
}

/// Capability of scene objects that can be rendered at a temporary opacity.
pub trait TransientOpacity {
    fn fade(&mut self, object: Entity, opacity: f32);
    fn restore(&mut self, object: Entity);
}

/// See-through occluders of the previous frame and the frame being built.
///
/// Two sets addressed by index; committing a frame flips the index instead of
/// copying, then clears the set that becomes the new staging area.
#[derive(Debug, Default)]
pub struct OccluderSets {
    sets: [HashSet<Entity>; 2],
    previous: usize,
}

impl OccluderSets {
    pub fn previous(&self) -> &HashSet<Entity> {
        &self.sets[self.previous]
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn staged(&self) -> &HashSet<Entity> {
        &self.sets[1 - self.previous]
    }

    pub fn stage(&mut self, object: Entity) {
        self.sets[1 - self.previous].insert(object);
    }

    /// Diffs staged against previous, reports transitions, then swaps roles.
    pub fn commit(&mut self, sink: &mut impl TransientOpacity, opacity: f32) {
        let previous = &self.sets[self.previous];
        let staged = &self.sets[1 - self.previous];

        for object in previous.difference(staged) {
            sink.restore(*object);
        }
        for object in staged.difference(previous) {
            sink.fade(*object, opacity);
        }

        self.previous = 1 - self.previous;
        self.sets[1 - self.previous].clear();
    }

    /// Restores every active object and empties both sets.
    pub fn release_all(&mut self, sink: &mut impl TransientOpacity) {
        for object in self.sets[self.previous].drain() {
            sink.restore(object);
        }
        self.sets[1 - self.previous].clear();
    }
}

/// Occlusion bookkeeping owned by the controller.
#[derive(Resource, Debug, Default)]
pub struct OcclusionTracker {
    pub sets: OccluderSets,
    hits: Vec<OcclusionHit>,
}

impl OcclusionTracker {
    #[cfg_attr(not(feature = "camera_debug"), allow(dead_code))]
    pub fn hits(&self) -> &[OcclusionHit] {
        &self.hits
    }
}

/// Picks the final camera position from the hits along the view ray.
///
/// Scans with a running best distance: a solid hit farther than the best so
/// far but short of the follow distance moves the camera to just past it.
/// See-through hits passing the same distance test are staged instead.
pub fn resolve_camera_target(
    hits: &[OcclusionHit],
    naive_target: Vec3,
    forward: Vec3,
    follow_distance: f32,
    correction_distance: f32,
    sets: &mut OccluderSets,
) -> Vec3 {
    let mut best = 0.0;
    let mut target = naive_target;

    for hit in hits {
        if hit.distance <= best || hit.distance >= follow_distance {
            continue;
        }
        match hit.subject {
            HitSubject::Ball => {}
            HitSubject::SeeThrough(object) => sets.stage(object),
            HitSubject::Solid(object) => {
                trace!("Camera blocked by {:?} at {:.2}", object, hit.distance);
                best = hit.distance;
                target = hit.location + forward * correction_distance;
            }
        }
    }

    target
}

/// Maps a hit mesh to the object it belongs to by walking up the hierarchy.
pub fn classify_hit(
    entity: Entity,
    ball: Entity,
    parent_of: impl Fn(Entity) -> Option<Entity>,
    is_see_through: impl Fn(Entity) -> bool,
) -> HitSubject {
    let parent_of = &parent_of;
    let ancestors = || std::iter::successors(Some(entity), move |current| parent_of(*current));

    if ancestors().any(|current| current == ball) {
        return HitSubject::Ball;
    }
    match ancestors().find(|current| is_see_through(*current)) {
        Some(object) => HitSubject::SeeThrough(object),
        None => HitSubject::Solid(entity),
    }
}

/// Inserts and removes [`TransientTransparency`] through deferred commands.
pub struct CommandOpacity<'a, 'w, 's, 'qw, 'qs> {
    commands: &'a mut Commands<'w, 's>,
    live: &'a Query<'qw, 'qs, ()>,
}

impl<'a, 'w, 's, 'qw, 'qs> CommandOpacity<'a, 'w, 's, 'qw, 'qs> {
    pub fn new(commands: &'a mut Commands<'w, 's>, live: &'a Query<'qw, 'qs, ()>) -> Self {
        Self { commands, live }
    }
}

impl TransientOpacity for CommandOpacity<'_, '_, '_, '_, '_> {
    fn fade(&mut self, object: Entity, opacity: f32) {
        if self.live.contains(object) {
            debug!("Fading occluder {:?} to opacity {:.2}", object, opacity);
            self.commands
                .entity(object)
                .insert(TransientTransparency::new(opacity));
        }
    }

    fn restore(&mut self, object: Entity) {
        if self.live.contains(object) {
            debug!("Restoring occluder {:?}", object);
            self.commands
                .entity(object)
                .remove::<TransientTransparency>();
        }
    }
}

/// Casts from the naive camera target toward the ball and commits the camera position.
#[allow(clippy::too_many_arguments)]
pub fn resolve_camera_occlusion(
    mut commands: Commands,
    mut ray_cast: MeshRayCast,
    mut tracker: ResMut<OcclusionTracker>,
    settings: Res<BallControllerSettings>,
    binding: Option<Res<BallBinding>>,
    parents: Query<&ChildOf>,
    see_through: Query<(), With<CameraSeeThrough>>,
    live: Query<()>,
    mut camera: Query<(&OrbitCamera, &mut Transform)>,
) {
    let Some(binding) = binding else {
        return;
    };
    let Ok((orbit, mut transform)) = camera.single_mut() else {
        return;
    };

    let naive_target = orbit.naive_target();
    let forward = transform.forward();

    let tracker = &mut *tracker;
    tracker.hits.clear();
    let ray = Ray3d::new(naive_target, forward);
    let cast_settings = MeshRayCastSettings::default()
        .with_visibility(RayCastVisibility::Any)
        .never_early_exit();
    for (entity, hit) in ray_cast.cast_ray(ray, &cast_settings) {
        tracker.hits.push(OcclusionHit {
            subject: classify_hit(
                *entity,
                binding.ball(),
                |current| parents.get(current).ok().map(ChildOf::parent),
                |current| see_through.contains(current),
            ),
            distance: hit.distance,
            location: hit.point,
        });
    }

    if tracker.hits.is_empty() && !settings.release_markers_on_miss {
        transform.translation = naive_target;
        return;
    }

    let target = resolve_camera_target(
        &tracker.hits,
        naive_target,
        forward.as_vec3(),
        orbit.follow_distance(),
        settings.ray_hit_correction_distance,
        &mut tracker.sets,
    );

    let mut sink = CommandOpacity::new(&mut commands, &live);
    tracker.sets.commit(&mut sink, settings.see_through_opacity);

    transform.translation = target;
}

/// Clears every marker once the camera rig is gone.
pub fn release_markers_without_camera(
    mut commands: Commands,
    mut tracker: ResMut<OcclusionTracker>,
    cameras: Query<(), With<OrbitCamera>>,
    live: Query<()>,
) {
    if !cameras.is_empty() || tracker.sets.previous().is_empty() {
        return;
    }

    info!(
        "Camera rig removed; releasing {} see-through occluders",
        tracker.sets.previous().len()
    );
    let mut sink = CommandOpacity::new(&mut commands, &live);
    tracker.sets.release_all(&mut sink);
}
