use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::assets::scene_setup::PropertySession;
use crate::engine::loading::scene_loader::FetchTasks;
use crate::engine::scene::overlay::spawn_viewer_controls;
use crate::engine::viewer::{ActiveViewer, Viewer};
use crate::rpc::protocol::{BridgeMessage, HostCommand};
use crate::rpc::web_rpc::{HostCommandEvent, WebRpcInterface};

/// Which of the property's two scenes is shown.
#[derive(
    States, Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Exterior,
    Interior,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Exterior => "exterior",
            ViewMode::Interior => "interior",
        }
    }
}

/// Entity owned by the current viewer. Despawned on every rebuild.
#[derive(Component)]
pub struct SceneMember;

/// Tear down the current viewer and build one for `mode`.
#[derive(Event, Debug, Clone, Copy)]
pub struct RebuildViewer {
    pub mode: ViewMode,
}

/// Monotonic viewer counter. Fetch results tagged with an older value are stale.
#[derive(Resource, Debug, Default)]
pub struct ViewerGeneration(u64);

impl ViewerGeneration {
    pub fn bump(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }
}

/// Turn validated host commands into session updates and rebuild requests.
pub fn apply_host_commands(
    mut events: EventReader<HostCommandEvent>,
    mut session: ResMut<PropertySession>,
    viewer: Option<Res<ActiveViewer>>,
    mut rebuild: EventWriter<RebuildViewer>,
) {
    for HostCommandEvent(command) in events.read() {
        match command {
            HostCommand::Init {
                model_url,
                interior_url,
                property_name,
            } => {
                *session = PropertySession {
                    property_name: property_name.clone(),
                    exterior_url: model_url.clone(),
                    interior_url: interior_url.clone(),
                };
                info!("Initialising viewer for property '{property_name}'");
                rebuild.write(RebuildViewer {
                    mode: ViewMode::Exterior,
                });
            }
            HostCommand::SetViewMode { mode } => {
                if viewer.as_ref().is_some_and(|viewer| viewer.mode() == *mode) {
                    debug!("Already in {} mode", mode.as_str());
                    continue;
                }
                rebuild.write(RebuildViewer { mode: *mode });
            }
        }
    }
}

/// Replace the active viewer. Only the last request of a frame is honoured.
pub fn rebuild_viewer(
    mut commands: Commands,
    mut requests: EventReader<RebuildViewer>,
    members: Query<Entity, With<SceneMember>>,
    previous: Option<Res<ActiveViewer>>,
    session: Res<PropertySession>,
    mut generation: ResMut<ViewerGeneration>,
    mut fetches: ResMut<FetchTasks>,
    mut next_mode: ResMut<NextState<ViewMode>>,
    mut rpc: ResMut<WebRpcInterface>,
) {
    let Some(request) = requests.read().last().copied() else {
        return;
    };

    for entity in &members {
        commands.entity(entity).despawn();
    }

    let generation = generation.bump();
    let (viewer, ticket) = Viewer::new(session.setup_for(request.mode), generation);
    match ticket {
        Some(ticket) => fetches.spawn(ticket),
        None => warn!("No model URL for {} scene", request.mode.as_str()),
    }
    info!(
        "Viewer {generation} built for {} scene",
        request.mode.as_str()
    );

    if previous.is_some_and(|previous| previous.mode() != request.mode) {
        rpc.send(BridgeMessage::ViewModeChanged { mode: request.mode });
    }
    spawn_viewer_controls(&mut commands, request.mode);
    commands.insert_resource(ActiveViewer(viewer));
    next_mode.set(request.mode);
}

/// Native shortcut matching the "Back to exterior" button.
#[cfg(not(target_arch = "wasm32"))]
pub fn exit_interior_on_escape(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut rebuild: EventWriter<RebuildViewer>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        rebuild.write(RebuildViewer {
            mode: ViewMode::Exterior,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::state::app::StatesPlugin;

    use crate::engine::loading::asset_loader::ViewerDisplay;

    fn lifecycle_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .init_state::<ViewMode>()
            .init_resource::<PropertySession>()
            .init_resource::<ViewerGeneration>()
            .init_resource::<FetchTasks>()
            .init_resource::<WebRpcInterface>()
            .add_event::<HostCommandEvent>()
            .add_event::<RebuildViewer>()
            .add_systems(Update, (apply_host_commands, rebuild_viewer).chain());
        app
    }

    fn host(app: &mut App, command: HostCommand) {
        app.world_mut().send_event(HostCommandEvent(command));
        app.update();
    }

    fn init_without_urls() -> HostCommand {
        HostCommand::Init {
            model_url: None,
            interior_url: None,
            property_name: "Graffiti".to_string(),
        }
    }

    #[test]
    fn view_mode_serialises_lowercase() {
        assert_eq!(serde_json::to_string(&ViewMode::Interior).unwrap(), "\"interior\"");
        assert_eq!(ViewMode::default(), ViewMode::Exterior);
    }

    #[test]
    fn init_builds_exterior_viewer() {
        let mut app = lifecycle_app();
        host(&mut app, init_without_urls());

        let viewer = app.world().resource::<ActiveViewer>();
        assert_eq!(viewer.mode(), ViewMode::Exterior);
        assert_eq!(viewer.generation(), 1);
        assert_eq!(viewer.display(), ViewerDisplay::Absent);
        assert_eq!(
            app.world().resource::<PropertySession>().property_name,
            "Graffiti"
        );
    }

    #[test]
    fn switching_mode_replaces_viewer_and_members() {
        let mut app = lifecycle_app();
        host(&mut app, init_without_urls());
        let stale = app.world_mut().spawn(SceneMember).id();

        host(
            &mut app,
            HostCommand::SetViewMode {
                mode: ViewMode::Interior,
            },
        );

        let viewer = app.world().resource::<ActiveViewer>();
        assert_eq!(viewer.mode(), ViewMode::Interior);
        assert_eq!(viewer.generation(), 2);
        assert!(app.world().get_entity(stale).is_err());
        assert!(
            app.world()
                .resource::<WebRpcInterface>()
                .pending()
                .contains(&BridgeMessage::ViewModeChanged {
                    mode: ViewMode::Interior
                })
        );

        app.update();
        assert_eq!(
            *app.world().resource::<State<ViewMode>>().get(),
            ViewMode::Interior
        );
    }

    #[test]
    fn same_mode_request_keeps_viewer() {
        let mut app = lifecycle_app();
        host(&mut app, init_without_urls());
        host(
            &mut app,
            HostCommand::SetViewMode {
                mode: ViewMode::Exterior,
            },
        );
        assert_eq!(app.world().resource::<ActiveViewer>().generation(), 1);
    }
}
