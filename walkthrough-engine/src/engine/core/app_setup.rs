use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;
use constants::render_settings::{
    AMBIENT_BRIGHTNESS, CLEAR_COLOUR_SRGB, MAIN_LIGHT_ILLUMINANCE, MAIN_LIGHT_POSITION,
};

// Crate engine modules
use crate::engine::assets::scene_setup::{PropertySession, ViewerManifest};
use crate::engine::camera::viewer_camera::{
    FrameOrbitInput, gather_orbit_input, spawn_viewer_camera, tick_viewer_camera,
};
use crate::engine::core::view_mode::{
    RebuildViewer, ViewMode, ViewerGeneration, apply_host_commands, rebuild_viewer,
};
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::fetched_source::register_fetched_source;
use crate::engine::loading::scene_loader::{
    FetchTasks, PendingGltf, SceneReady, finish_scene_spawn, poll_fetch_tasks, poll_gltf_load,
};
use crate::engine::scene::markers::{spawn_scene_markers, sync_selection_highlight};
use crate::engine::scene::overlay::{
    ClickAcknowledgement, handle_viewer_controls, spawn_hud, update_ack_indicator,
    update_nav_toggle, update_status_text,
};
// Crate tools modules
use crate::tools::pointer::handle_pointer_press;
// Host bridge
use crate::rpc::web_rpc::{BridgeSet, WebRpcPlugin};

#[cfg(not(target_arch = "wasm32"))]
use crate::engine::core::view_mode::exit_interior_on_escape;
#[cfg(not(target_arch = "wasm32"))]
use crate::engine::loading::manifest_loader::{ManifestLoader, apply_viewer_manifest, start_loading};

/// Per-frame phases, run in this order between bridge intake and flush.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ViewerSet {
    Lifecycle,
    Loading,
    Input,
    Camera,
    Presentation,
}

pub fn create_app() -> App {
    let mut app = App::new();

    // Asset sources must exist before AssetPlugin builds.
    let fetched = register_fetched_source(&mut app);

    app.add_plugins(create_default_plugins())
        .init_state::<ViewMode>()
        // Native start-up manifest uses the same fields as the host `init` command.
        .add_plugins(JsonAssetPlugin::<ViewerManifest>::new(&["json"]))
        .add_plugins(WebRpcPlugin)
        .insert_resource(fetched)
        .insert_resource(ClearColor(Color::srgb(
            CLEAR_COLOUR_SRGB[0],
            CLEAR_COLOUR_SRGB[1],
            CLEAR_COLOUR_SRGB[2],
        )))
        .insert_resource(AmbientLight {
            color: Color::WHITE,
            brightness: AMBIENT_BRIGHTNESS,
            ..default()
        });

    // Initialise resources early
    app.init_resource::<PropertySession>()
        .init_resource::<ViewerGeneration>()
        .init_resource::<FetchTasks>()
        .init_resource::<PendingGltf>()
        .init_resource::<FrameOrbitInput>()
        .init_resource::<ClickAcknowledgement>()
        .add_event::<RebuildViewer>()
        .add_event::<SceneReady>();

    app.configure_sets(
        Update,
        (
            BridgeSet::Intake,
            ViewerSet::Lifecycle,
            ViewerSet::Loading,
            ViewerSet::Input,
            ViewerSet::Camera,
            ViewerSet::Presentation,
            BridgeSet::Flush,
        )
            .chain(),
    );

    app.add_systems(Startup, (setup, spawn_viewer_camera, spawn_hud))
        .add_systems(
            Update,
            (apply_host_commands, rebuild_viewer)
                .chain()
                .in_set(ViewerSet::Lifecycle),
        )
        .add_systems(
            Update,
            (
                poll_fetch_tasks,
                poll_gltf_load,
                finish_scene_spawn,
                spawn_scene_markers,
            )
                .chain()
                .in_set(ViewerSet::Loading),
        )
        .add_systems(
            Update,
            (handle_pointer_press, handle_viewer_controls, gather_orbit_input)
                .chain()
                .in_set(ViewerSet::Input),
        )
        .add_systems(Update, tick_viewer_camera.in_set(ViewerSet::Camera))
        .add_systems(
            Update,
            (
                sync_selection_highlight,
                update_status_text,
                update_nav_toggle,
                update_ack_indicator,
            )
                .in_set(ViewerSet::Presentation),
        );

    // Native builds have no host page: read the local manifest and allow Escape out of interiors.
    #[cfg(not(target_arch = "wasm32"))]
    {
        app.init_resource::<ManifestLoader>()
            .add_systems(Startup, start_loading)
            .add_systems(Update, apply_viewer_manifest.before(BridgeSet::Intake))
            .add_systems(
                Update,
                exit_interior_on_escape
                    .in_set(ViewerSet::Input)
                    .run_if(in_state(ViewMode::Interior)),
            );
    }

    app
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: MAIN_LIGHT_ILLUMINANCE,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_translation(Vec3::from_array(MAIN_LIGHT_POSITION))
            .looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

// Startup system that only handles basic initialisation
fn setup(mut commands: Commands) {
    spawn_lighting(&mut commands);
    info!("Walkthrough viewer started, waiting for scene configuration");
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
