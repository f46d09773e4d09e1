use bevy::asset::LoadState;
use bevy::prelude::*;

use crate::engine::assets::scene_setup::ViewerManifest;
use crate::rpc::protocol::{HostCommand, encode};
use crate::rpc::web_rpc::MessageQueue;

/// Local start-up configuration read by native builds.
pub const VIEWER_MANIFEST_PATH: &str = "viewer_manifest.json";

#[derive(Resource, Default)]
pub struct ManifestLoader {
    handle: Option<Handle<ViewerManifest>>,
    applied: bool,
}

pub fn start_loading(mut manifest_loader: ResMut<ManifestLoader>, asset_server: Res<AssetServer>) {
    info!("Loading viewer manifest: {VIEWER_MANIFEST_PATH}");
    manifest_loader.handle = Some(asset_server.load(VIEWER_MANIFEST_PATH));
}

/// Feed the manifest into the bridge as if the host had sent `init`.
pub fn apply_viewer_manifest(
    mut manifest_loader: ResMut<ManifestLoader>,
    asset_server: Res<AssetServer>,
    manifests: Res<Assets<ViewerManifest>>,
    queue: Res<MessageQueue>,
) {
    if manifest_loader.applied {
        return;
    }
    let Some(handle) = manifest_loader.handle.clone() else {
        return;
    };

    let command = if let Some(manifest) = manifests.get(&handle) {
        info!("Viewer manifest loaded for '{}'", manifest.property_name);
        init_command(manifest)
    } else if let Some(LoadState::Failed(err)) = asset_server.get_load_state(handle.id()) {
        warn!("No usable viewer manifest ({err}), starting without a model");
        HostCommand::Init {
            model_url: None,
            interior_url: None,
            property_name: String::new(),
        }
    } else {
        return;
    };

    match encode(&command) {
        Ok(raw) => queue.push(raw),
        Err(err) => error!("Failed to encode manifest init: {err}"),
    }
    manifest_loader.applied = true;
}

fn init_command(manifest: &ViewerManifest) -> HostCommand {
    HostCommand::Init {
        model_url: manifest.model_url.clone(),
        interior_url: manifest.interior_url.clone(),
        property_name: manifest.property_name.clone(),
    }
}
