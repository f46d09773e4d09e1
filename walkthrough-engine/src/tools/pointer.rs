use bevy::input::touch::Touches;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use super::pipeline::{InteractionEvent, MeshCandidate, SelectableMesh};
use crate::engine::camera::pose::Perspective;
use crate::engine::scene::overlay::ClickAcknowledgement;
use crate::engine::viewer::ActiveViewer;
use crate::rpc::web_rpc::WebRpcInterface;

/// Position of this frame's press, from the mouse or a new touch.
fn press_position(
    mouse_button: &ButtonInput<MouseButton>,
    touches: &Touches,
    window: &Window,
) -> Option<Vec2> {
    if mouse_button.just_pressed(MouseButton::Left) {
        if let Some(cursor) = window.cursor_position() {
            return Some(cursor);
        }
    }
    touches.iter_just_pressed().next().map(|touch| touch.position())
}

/// Resolve a press against hotspots, markers and meshes and report the result.
pub fn handle_pointer_press(
    mouse_button: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
    ui_buttons: Query<&Interaction, With<Button>>,
    selectable: Query<(&SelectableMesh, &GlobalTransform)>,
    viewer: Option<ResMut<ActiveViewer>>,
    time: Res<Time<Real>>,
    mut rpc: ResMut<WebRpcInterface>,
    mut ack: ResMut<ClickAcknowledgement>,
) {
    let Some(mut viewer) = viewer else {
        return;
    };
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(screen) = press_position(&mouse_button, &touches, window) else {
        return;
    };
    if ui_buttons
        .iter()
        .any(|interaction| *interaction == Interaction::Pressed)
    {
        return;
    }

    let candidates: Vec<MeshCandidate<'_>> = selectable
        .iter()
        .map(|(mesh, transform)| MeshCandidate {
            mesh,
            world: transform.compute_matrix(),
        })
        .collect();

    let viewport = Vec2::new(window.width(), window.height());
    let event = viewer.handle_pointer_event(
        screen,
        viewport,
        &Perspective::default(),
        &candidates,
        time.elapsed(),
    );

    if let Some(event) = event {
        match &event {
            InteractionEvent::FixedHit { name, .. } => {
                info!("Fixed hotspot hit: {name}");
                ack.show();
            }
            InteractionEvent::MeshHit { mesh_name, .. } => debug!("Mesh selected: {mesh_name}"),
            InteractionEvent::Log { .. } | InteractionEvent::Error { .. } => {}
        }
        rpc.send(event.into());
    }
}
