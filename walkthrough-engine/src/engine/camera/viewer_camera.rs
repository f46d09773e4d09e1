use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::input::touch::Touches;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use constants::render_settings::{ROTATE_RADIANS_PER_VIEWPORT, ZOOM_STEP};

use super::controller::OrbitInput;
use super::pose::Perspective;
use crate::engine::viewer::ActiveViewer;

/// The scene camera driven by the active viewer.
#[derive(Component)]
pub struct ViewerCamera;

/// Orbit input gathered this frame, consumed by `tick_viewer_camera`.
#[derive(Resource, Debug, Default)]
pub struct FrameOrbitInput(pub OrbitInput);

pub fn spawn_viewer_camera(mut commands: Commands) {
    let lens = Perspective::default();
    commands.spawn((
        ViewerCamera,
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: lens.fov_y,
            near: lens.near,
            far: lens.far,
            ..default()
        }),
        Transform::default(),
    ));
}

/// Map a pixel drag onto orbit angles: one full viewport height is one turn.
pub fn drag_to_rotation(delta: Vec2, viewport_height: f32) -> Vec2 {
    if viewport_height <= 0.0 {
        return Vec2::ZERO;
    }
    delta / viewport_height * ROTATE_RADIANS_PER_VIEWPORT
}

/// Zoom steps equivalent to a pinch going from `previous` to `current` finger spacing.
pub fn pinch_to_zoom(previous: f32, current: f32) -> f32 {
    if previous <= f32::EPSILON || current <= f32::EPSILON {
        return 0.0;
    }
    (previous / current).ln() / ZOOM_STEP.ln()
}

pub fn gather_orbit_input(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    touches: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
    ui_buttons: Query<&Interaction, With<Button>>,
    mut frame_input: ResMut<FrameOrbitInput>,
) {
    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
    }

    let mut input = OrbitInput::default();
    let Ok(window) = windows.single() else {
        frame_input.0 = input;
        return;
    };
    // Drags that start on a button belong to the button.
    if ui_buttons.iter().any(|interaction| *interaction != Interaction::None) {
        frame_input.0 = input;
        return;
    }

    let height = window.height();
    if mouse_button.pressed(MouseButton::Left) {
        input.rotate += drag_to_rotation(mouse_delta, height);
    }
    if mouse_button.pressed(MouseButton::Right) || mouse_button.pressed(MouseButton::Middle) {
        input.pan += mouse_delta / height.max(1.0);
    }
    input.zoom += scroll_accum;

    let active: Vec<_> = touches.iter().collect();
    match active.as_slice() {
        [finger] => input.rotate += drag_to_rotation(finger.delta(), height),
        [first, second, ..] => {
            let previous = first.previous_position().distance(second.previous_position());
            let current = first.position().distance(second.position());
            input.zoom += pinch_to_zoom(previous, current);
        }
        [] => {}
    }

    frame_input.0 = input;
}

/// Advance the viewer camera and copy its pose onto the scene camera.
pub fn tick_viewer_camera(
    viewer: Option<ResMut<ActiveViewer>>,
    time: Res<Time<Real>>,
    frame_input: Res<FrameOrbitInput>,
    mut cameras: Query<&mut Transform, With<ViewerCamera>>,
) {
    let Some(mut viewer) = viewer else {
        return;
    };
    if viewer.tick(time.elapsed(), frame_input.0).is_some() {
        if let Some(graph) = viewer.navigation() {
            info!("Camera arrived at {}", graph.current_node().label);
        }
    }

    let pose = *viewer.camera().pose();
    for mut transform in &mut cameras {
        let target = Transform::from_translation(pose.position).looking_at(pose.look_target, Vec3::Y);
        transform.set_if_neq(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn full_height_drag_is_one_turn() {
        let rotation = drag_to_rotation(Vec2::new(0.0, 720.0), 720.0);
        assert_relative_eq!(rotation.y, std::f32::consts::TAU);
        assert_eq!(drag_to_rotation(Vec2::ONE, 0.0), Vec2::ZERO);
    }

    #[test]
    fn spreading_fingers_zooms_in() {
        let zoom = pinch_to_zoom(100.0, 200.0);
        assert!(zoom > 0.0);
        assert_relative_eq!(ZOOM_STEP.powf(zoom), 0.5, epsilon = 1e-5);
        assert_eq!(pinch_to_zoom(0.0, 50.0), 0.0);
    }
}
