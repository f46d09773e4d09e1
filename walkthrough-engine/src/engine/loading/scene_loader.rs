use std::sync::Arc;

use bevy::asset::LoadState;
use bevy::ecs::system::SystemParam;
use bevy::gltf::Gltf;
use bevy::prelude::*;
use bevy::scene::SceneInstance;
use bevy::tasks::{IoTaskPool, Task, block_on, futures_lite::future};
use constants::coordinate_system::SceneFrame;

use super::asset_loader::{LoadError, LoadTicket};
use super::fetch::fetch_asset;
use super::fetched_source::FetchedAssets;
use crate::engine::assets::bounds::{SceneBounds, normalising_transform, root_relative_matrix};
use crate::engine::core::view_mode::SceneMember;
use crate::engine::viewer::ActiveViewer;
use crate::tools::pipeline::{MeshGeometry, SelectableMesh, UNNAMED_MESH};

struct FetchTask {
    generation: u64,
    url: String,
    task: Task<Result<Vec<u8>, LoadError>>,
}

/// In-flight fetches. Never cancelled; stale results are dropped when they land.
#[derive(Resource, Default)]
pub struct FetchTasks(Vec<FetchTask>);

impl FetchTasks {
    pub fn spawn(&mut self, ticket: LoadTicket) {
        info!("Fetching scene asset: {}", ticket.url);
        let url = ticket.url.clone();
        let task = IoTaskPool::get().spawn(fetch_asset(url));
        self.0.push(FetchTask {
            generation: ticket.generation,
            url: ticket.url,
            task,
        });
    }
}

/// glTF handed to the asset server and awaiting decode.
#[derive(Resource, Default)]
pub struct PendingGltf(Option<(u64, Handle<Gltf>)>);

/// Root of the spawned viewer scene.
#[derive(Component)]
pub struct ViewerSceneRoot {
    pub generation: u64,
}

/// Set once the root transform has been normalised.
#[derive(Component)]
pub struct SceneNormalised;

/// Fired once per viewer when its scene is ready for interaction.
#[derive(Event, Debug, Clone, Copy)]
pub struct SceneReady {
    pub generation: u64,
}

pub fn poll_fetch_tasks(
    mut fetches: ResMut<FetchTasks>,
    mut pending: ResMut<PendingGltf>,
    viewer: Option<ResMut<ActiveViewer>>,
    mut fetched: ResMut<FetchedAssets>,
    asset_server: Res<AssetServer>,
) {
    let mut completed = Vec::new();
    fetches.0.retain_mut(|fetch| match block_on(future::poll_once(&mut fetch.task)) {
        Some(result) => {
            completed.push((fetch.generation, fetch.url.clone(), result));
            false
        }
        None => true,
    });

    let Some(mut viewer) = viewer else {
        return;
    };
    for (generation, url, result) in completed {
        if generation != viewer.generation() {
            debug!("Discarding fetch result of replaced viewer {generation}");
            continue;
        }
        if let Err(err) = &result {
            error!("Scene fetch failed: {err}");
        }
        if let Some(bytes) = viewer.accept_fetch(generation, result) {
            info!("Fetched {} bytes, decoding", bytes.len());
            let path = fetched.publish(generation, &url, bytes);
            pending.0 = Some((generation, asset_server.load(path)));
        }
    }
}

pub fn poll_gltf_load(
    mut commands: Commands,
    mut pending: ResMut<PendingGltf>,
    viewer: Option<ResMut<ActiveViewer>>,
    mut fetched: ResMut<FetchedAssets>,
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
) {
    let Some((generation, handle)) = pending.0.clone() else {
        return;
    };
    let Some(mut viewer) = viewer else {
        return;
    };
    if generation != viewer.generation() {
        pending.0 = None;
        fetched.release();
        return;
    }

    match asset_server.get_load_state(handle.id()) {
        Some(LoadState::Failed(err)) => {
            error!(
                "Scene decode failed for {}: {err}",
                viewer.loader().url().unwrap_or_default()
            );
            viewer.fail(LoadError::Decode(err.to_string()));
            pending.0 = None;
            fetched.release();
        }
        Some(LoadState::Loaded) => {
            let scene = gltfs
                .get(&handle)
                .and_then(|gltf| gltf.default_scene.clone().or_else(|| gltf.scenes.first().cloned()));
            match scene {
                Some(scene) => {
                    commands.spawn((
                        SceneRoot(scene),
                        Transform::default(),
                        SceneMember,
                        ViewerSceneRoot { generation },
                    ));
                }
                None => {
                    error!("Scene asset decoded without a scene");
                    viewer.fail(LoadError::EmptyScene);
                }
            }
            pending.0 = None;
            fetched.release();
        }
        _ => {}
    }
}

/// Read access to an instantiated scene's hierarchy and mesh assets.
#[derive(SystemParam)]
pub struct SceneGeometry<'w, 's> {
    hierarchy: Query<'w, 's, (&'static Transform, Option<&'static ChildOf>)>,
    mesh_entities: Query<'w, 's, (&'static Mesh3d, Option<&'static Name>, Option<&'static ChildOf>)>,
    names: Query<'w, 's, &'static Name>,
    meshes: Res<'w, Assets<Mesh>>,
}

impl SceneGeometry<'_, '_> {
    /// Measure the meshes below `root`, normalise the root and attach pick geometry.
    ///
    /// Meshes are named after their parent node, then themselves, then [`UNNAMED_MESH`].
    /// Returns the applied frame and the number of selectable meshes.
    pub fn place(
        &self,
        commands: &mut Commands,
        root: Entity,
        entities: impl IntoIterator<Item = Entity>,
    ) -> (SceneFrame, usize) {
        let mut bounds = SceneBounds::default();
        let mut selectable = 0;
        for entity in entities {
            let Ok((mesh3d, own_name, parent)) = self.mesh_entities.get(entity) else {
                continue;
            };
            let Some(mesh) = self.meshes.get(&mesh3d.0) else {
                continue;
            };
            if let Some(to_root) = root_relative_matrix(entity, root, &self.hierarchy) {
                bounds.include_mesh(mesh, &to_root);
            }
            if let Some(geometry) = MeshGeometry::from_mesh(mesh) {
                let name = parent
                    .and_then(|parent| self.names.get(parent.parent()).ok())
                    .or(own_name)
                    .map(|name| name.as_str().to_string())
                    .unwrap_or_else(|| UNNAMED_MESH.to_string());
                commands.entity(entity).insert(SelectableMesh {
                    name,
                    geometry: Arc::new(geometry),
                });
                selectable += 1;
            }
        }

        let frame = bounds.frame();
        commands
            .entity(root)
            .insert((normalising_transform(&frame), SceneNormalised));
        (frame, selectable)
    }
}

/// Normalise each newly instantiated viewer scene and report it ready.
pub fn finish_scene_spawn(
    mut commands: Commands,
    roots: Query<(Entity, &SceneInstance, &ViewerSceneRoot), Without<SceneNormalised>>,
    scene_spawner: Res<SceneSpawner>,
    viewer: Option<ResMut<ActiveViewer>>,
    geometry: SceneGeometry,
    mut ready: EventWriter<SceneReady>,
) {
    let Some(mut viewer) = viewer else {
        return;
    };

    for (root, instance, tag) in &roots {
        if tag.generation != viewer.generation() || !scene_spawner.instance_is_ready(**instance) {
            continue;
        }

        let (frame, selectable) =
            geometry.place(&mut commands, root, scene_spawner.iter_instance_entities(**instance));
        info!(
            "Scene ready: center {:?}, scale {:.4}, {selectable} selectable meshes",
            frame.center, frame.scale
        );
        if viewer.scene_ready(frame) {
            ready.write(SceneReady {
                generation: tag.generation,
            });
        }
    }
}
