use bevy::pbr::NotShadowCaster;
use bevy::prelude::*;
use constants::render_settings::{
    HIGHLIGHT_COLOUR_SRGBA, HOTSPOT_COLOUR_SRGBA, MARKER_COLOUR_SRGBA, MARKER_SPHERE_RADIUS,
};

use crate::engine::core::view_mode::SceneMember;
use crate::engine::loading::scene_loader::SceneReady;
use crate::engine::viewer::ActiveViewer;

/// Sphere drawn at a navigation node.
#[derive(Component)]
pub struct NodeMarker;

/// Translucent box over a fixed hotspot.
#[derive(Component)]
pub struct HotspotVisual;

/// The single box outlining the current mesh selection.
#[derive(Component)]
pub struct SelectionHighlightBox;

fn overlay_material(colour: [f32; 4], depth_bias: f32) -> StandardMaterial {
    let [r, g, b, a] = colour;
    StandardMaterial {
        base_color: Color::srgba(r, g, b, a),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        depth_bias,
        ..default()
    }
}

/// Spawn markers, hotspot volumes and the (hidden) highlight once the scene is placed.
pub fn spawn_scene_markers(
    mut commands: Commands,
    mut ready: EventReader<SceneReady>,
    viewer: Option<Res<ActiveViewer>>,
    placed: Query<(), With<SelectionHighlightBox>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(viewer) = viewer else {
        ready.clear();
        return;
    };
    if !ready
        .read()
        .any(|event| event.generation == viewer.generation())
    {
        return;
    }
    // Rebuilds despawn the previous viewer's overlays before this runs.
    if !placed.is_empty() {
        debug!("Scene overlays already placed for viewer {}", viewer.generation());
        return;
    }

    let pipeline = viewer.pipeline();

    if !pipeline.markers().is_empty() {
        let sphere = meshes.add(Sphere::new(MARKER_SPHERE_RADIUS).mesh().uv(32, 16));
        let material = materials.add(overlay_material(MARKER_COLOUR_SRGBA, 0.0));
        for marker in pipeline.markers() {
            commands.spawn((
                SceneMember,
                NodeMarker,
                Name::new(format!("Marker {}", marker.node)),
                Mesh3d(sphere.clone()),
                MeshMaterial3d(material.clone()),
                Transform::from_translation(marker.center),
                NotShadowCaster,
            ));
        }
    }

    if !pipeline.hotspots().is_empty() {
        let cube = meshes.add(Cuboid::from_size(Vec3::ONE));
        let material = materials.add(overlay_material(HOTSPOT_COLOUR_SRGBA, 0.0));
        for hotspot in pipeline.hotspots() {
            commands.spawn((
                SceneMember,
                HotspotVisual,
                Name::new(format!("Hotspot {}", hotspot.name)),
                Mesh3d(cube.clone()),
                MeshMaterial3d(material.clone()),
                Transform::from_translation(hotspot.center).with_scale(hotspot.size()),
                NotShadowCaster,
            ));
        }
    }

    commands.spawn((
        SceneMember,
        SelectionHighlightBox,
        Name::new("SelectionHighlight"),
        Mesh3d(meshes.add(Cuboid::from_size(Vec3::ONE))),
        MeshMaterial3d(materials.add(overlay_material(HIGHLIGHT_COLOUR_SRGBA, 1000.0))),
        Transform::default(),
        Visibility::Hidden,
        NotShadowCaster,
    ));
    info!(
        "Placed {} markers and {} hotspot volumes",
        pipeline.markers().len(),
        pipeline.hotspots().len()
    );
}

/// Move the highlight box onto the latest selection.
pub fn sync_selection_highlight(
    viewer: Option<Res<ActiveViewer>>,
    mut boxes: Query<(&mut Transform, &mut Visibility), With<SelectionHighlightBox>>,
) {
    let Some(viewer) = viewer else {
        return;
    };
    if !viewer.is_changed() {
        return;
    }
    let highlight = viewer.pipeline().highlight();
    for (mut transform, mut visibility) in &mut boxes {
        match highlight {
            Some(selection) => {
                transform.translation = selection.center;
                // A flat mesh would give a zero scale and a degenerate box.
                transform.scale = selection.size.max(Vec3::splat(1e-3));
                visibility.set_if_neq(Visibility::Inherited);
            }
            None => {
                visibility.set_if_neq(Visibility::Hidden);
            }
        }
    }
}
