use bevy::prelude::*;
use constants::render_settings::ACK_INDICATOR_SECS;

use crate::engine::core::view_mode::{RebuildViewer, SceneMember, ViewMode};
use crate::engine::loading::asset_loader::ViewerDisplay;
use crate::engine::viewer::ActiveViewer;

/// Shown until the host's `init` arrives.
pub const WAITING_FOR_HOST: &str = "Loading 3D Viewer...";
pub const CONTROLS_HINT: &str = "Drag to rotate · Pinch to zoom";
pub const CLICK_ACKNOWLEDGED: &str = "Click Registered!";
pub const BACK_TO_EXTERIOR: &str = "Back to exterior";

#[derive(Component)]
pub struct StatusText;

#[derive(Component)]
pub struct HintText;

#[derive(Component)]
pub struct AckIndicator;

#[derive(Component)]
pub struct NavToggleLabel;

/// Overlay button actions.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerControl {
    NextNode,
    BackToExterior,
}

/// Countdown of the fixed-hotspot acknowledgment.
#[derive(Resource, Debug, Default)]
pub struct ClickAcknowledgement {
    timer: Option<Timer>,
}

impl ClickAcknowledgement {
    pub fn show(&mut self) {
        self.timer = Some(Timer::from_seconds(ACK_INDICATOR_SECS, TimerMode::Once));
    }

    pub fn is_visible(&self) -> bool {
        self.timer.is_some()
    }

    pub fn tick(&mut self, delta: std::time::Duration) {
        if let Some(timer) = self.timer.as_mut() {
            if timer.tick(delta).finished() {
                self.timer = None;
            }
        }
    }
}

const BUTTON_IDLE: Color = Color::srgb(0.22, 0.24, 0.28);
const BUTTON_HOVER: Color = Color::srgb(0.26, 0.28, 0.32);
const BUTTON_PRESSED: Color = Color::srgb(0.18, 0.20, 0.24);

/// Status, hint and acknowledgment labels. Lives for the whole session.
pub fn spawn_hud(mut commands: Commands) {
    commands
        .spawn((
            Name::new("ViewerHud"),
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                display: Display::Flex,
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn((
                StatusText,
                Text::new(WAITING_FOR_HOST),
                TextFont {
                    font_size: 20.0,
                    ..default()
                },
                TextColor(Color::srgb(0.85, 0.85, 0.85)),
            ));

            parent.spawn((
                HintText,
                Text::new(CONTROLS_HINT),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgba(1.0, 1.0, 1.0, 0.7)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(16.0),
                    ..default()
                },
            ));

            parent.spawn((
                AckIndicator,
                Text::new(CLICK_ACKNOWLEDGED),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::srgb(0.2, 1.0, 0.2)),
                Node {
                    position_type: PositionType::Absolute,
                    top: Val::Px(16.0),
                    ..default()
                },
                Visibility::Hidden,
            ));
        });
}

/// Per-viewer buttons. Tagged `SceneMember` so a rebuild removes them.
pub fn spawn_viewer_controls(commands: &mut Commands, mode: ViewMode) {
    commands
        .spawn((
            SceneMember,
            Name::new("ViewerControls"),
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(12.0),
                right: Val::Px(12.0),
                display: Display::Flex,
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(8.0),
                ..default()
            },
        ))
        .with_children(|parent| {
            parent
                .spawn((control_button(ViewerControl::NextNode), Visibility::Hidden))
                .with_children(|btn| {
                    btn.spawn((
                        NavToggleLabel,
                        Text::default(),
                        TextFont {
                            font_size: 16.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                    ));
                });

            if mode == ViewMode::Interior {
                parent
                    .spawn(control_button(ViewerControl::BackToExterior))
                    .with_children(|btn| {
                        btn.spawn((
                            Text::new(BACK_TO_EXTERIOR),
                            TextFont {
                                font_size: 16.0,
                                ..default()
                            },
                            TextColor(Color::WHITE),
                        ));
                    });
            }
        });
}

fn control_button(control: ViewerControl) -> impl Bundle {
    (
        control,
        Button,
        Name::new(format!("{control:?}Button")),
        BackgroundColor(BUTTON_IDLE),
        BorderColor(Color::srgba(0.0, 0.0, 0.0, 0.25)),
        Node {
            height: Val::Px(36.0),
            padding: UiRect::axes(Val::Px(14.0), Val::Px(0.0)),
            display: Display::Flex,
            align_items: AlignItems::Center,
            justify_content: JustifyContent::Center,
            border: UiRect::all(Val::Px(1.0)),
            ..default()
        },
    )
}

/// Text for the centred status label, `None` once the scene is interactive.
pub fn status_message(viewer: Option<&ActiveViewer>) -> Option<&'static str> {
    match viewer.map(|viewer| viewer.display()) {
        None => Some(WAITING_FOR_HOST),
        Some(ViewerDisplay::Ready) => None,
        Some(display) => display.message(),
    }
}

pub fn update_status_text(
    viewer: Option<Res<ActiveViewer>>,
    mut labels: Query<(&mut Text, &mut Visibility), With<StatusText>>,
) {
    let message = status_message(viewer.as_deref());
    for (mut text, mut visibility) in &mut labels {
        match message {
            Some(message) => {
                if text.0 != message {
                    text.0 = message.to_string();
                }
                *visibility = Visibility::Inherited;
            }
            None => *visibility = Visibility::Hidden,
        }
    }
}

/// Keep the node toggle labelled with its destination; hidden without navigation.
pub fn update_nav_toggle(
    viewer: Option<Res<ActiveViewer>>,
    mut buttons: Query<(&ViewerControl, &mut Visibility)>,
    mut labels: Query<&mut Text, With<NavToggleLabel>>,
) {
    let label = viewer.as_ref().and_then(|viewer| {
        let graph = viewer.navigation()?;
        graph
            .next_from_current()
            .map(|node| format!("Go to {}", node.label))
    });

    for (control, mut visibility) in &mut buttons {
        if *control == ViewerControl::NextNode {
            *visibility = if label.is_some() {
                Visibility::Inherited
            } else {
                Visibility::Hidden
            };
        }
    }
    if let Some(label) = label {
        for mut text in &mut labels {
            if text.0 != label {
                text.0 = label.clone();
            }
        }
    }
}

pub fn handle_viewer_controls(
    mut buttons: Query<
        (&Interaction, &ViewerControl, &mut BackgroundColor),
        (Changed<Interaction>, With<Button>),
    >,
    mut viewer: Option<ResMut<ActiveViewer>>,
    time: Res<Time<Real>>,
    mut rebuild: EventWriter<RebuildViewer>,
) {
    for (interaction, control, mut bg) in &mut buttons {
        match interaction {
            Interaction::Pressed => {
                *bg = BackgroundColor(BUTTON_PRESSED);
                match control {
                    ViewerControl::NextNode => {
                        if let Some(viewer) = viewer.as_mut() {
                            if let Some(next) = viewer.next_node_name() {
                                viewer.move_to(&next, time.elapsed());
                            }
                        }
                    }
                    ViewerControl::BackToExterior => {
                        rebuild.write(RebuildViewer {
                            mode: ViewMode::Exterior,
                        });
                    }
                }
            }
            Interaction::Hovered => *bg = BackgroundColor(BUTTON_HOVER),
            Interaction::None => *bg = BackgroundColor(BUTTON_IDLE),
        }
    }
}

pub fn update_ack_indicator(
    time: Res<Time>,
    mut ack: ResMut<ClickAcknowledgement>,
    mut indicators: Query<&mut Visibility, With<AckIndicator>>,
) {
    ack.tick(time.delta());
    let visibility = if ack.is_visible() {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    for mut current in &mut indicators {
        current.set_if_neq(visibility);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::engine::assets::scene_setup::PropertySession;
    use crate::engine::loading::asset_loader::LoadError;
    use crate::engine::viewer::Viewer;

    fn exterior_viewer(url: Option<&str>) -> ActiveViewer {
        let session = PropertySession {
            property_name: "Graffiti".to_string(),
            exterior_url: url.map(str::to_string),
            interior_url: None,
        };
        let (viewer, _) = Viewer::new(session.setup_for(ViewMode::Exterior), 1);
        ActiveViewer(viewer)
    }

    #[test]
    fn acknowledgment_hides_after_two_seconds() {
        let mut ack = ClickAcknowledgement::default();
        assert!(!ack.is_visible());
        ack.show();
        ack.tick(Duration::from_millis(1999));
        assert!(ack.is_visible());
        ack.tick(Duration::from_millis(1));
        assert!(!ack.is_visible());
    }

    #[test]
    fn repeated_click_restarts_acknowledgment() {
        let mut ack = ClickAcknowledgement::default();
        ack.show();
        ack.tick(Duration::from_millis(1500));
        ack.show();
        ack.tick(Duration::from_millis(1500));
        assert!(ack.is_visible());
    }

    #[test]
    fn status_waits_for_host_without_viewer() {
        assert_eq!(status_message(None), Some(WAITING_FOR_HOST));
    }

    #[test]
    fn status_explains_missing_model() {
        let viewer = exterior_viewer(None);
        assert_eq!(status_message(Some(&viewer)), Some("No 3D model available"));
    }

    #[test]
    fn status_reports_failed_load() {
        let mut viewer = exterior_viewer(Some("https://cdn/house.glb"));
        assert_eq!(status_message(Some(&viewer)), Some("Loading 3D Model..."));
        viewer.accept_fetch(1, Err(LoadError::Fetch("HTTP 404".to_string())));
        assert_eq!(status_message(Some(&viewer)), Some("Failed to load 3D model"));
    }
}
