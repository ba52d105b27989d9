//! Render-side handling of [`TransientTransparency`] markers.
use bevy::{color::Alpha, prelude::*};

use crate::controller::components::TransientTransparency;

/// Material an object wore before it was faded.
#[derive(Component, Debug, Clone)]
pub struct OpaqueMaterial(pub Handle<StandardMaterial>);

/// Swaps newly marked objects onto a blended copy of their material.
pub fn apply_transient_transparency(
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
    marked: Query<
        (
            Entity,
            &TransientTransparency,
            &MeshMaterial3d<StandardMaterial>,
        ),
        (Added<TransientTransparency>, Without<OpaqueMaterial>),
    >,
) {
    for (entity, marker, material) in marked.iter() {
        let Some(faded) = materials
            .get(&material.0)
            .map(|base| faded_material(base, marker.opacity))
        else {
            continue;
        };

        let original = material.0.clone();
        let faded = materials.add(faded);
        commands
            .entity(entity)
            .insert((OpaqueMaterial(original), MeshMaterial3d(faded)));
    }
}

/// Puts the original material back once the marker is removed.
pub fn restore_opaque_materials(
    mut commands: Commands,
    mut removed: RemovedComponents<TransientTransparency>,
    originals: Query<&OpaqueMaterial, Without<TransientTransparency>>,
) {
    for entity in removed.read() {
        let Ok(original) = originals.get(entity) else {
            continue;
        };
        commands
            .entity(entity)
            .insert(MeshMaterial3d(original.0.clone()))
            .remove::<OpaqueMaterial>();
    }
}

fn faded_material(base: &StandardMaterial, opacity: f32) -> StandardMaterial {
    let mut faded = base.clone();
    faded.base_color = faded.base_color.with_alpha(opacity);
    faded.alpha_mode = AlphaMode::Blend;
    faded
}
