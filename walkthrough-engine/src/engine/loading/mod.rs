//! Scene asset loading from a URL through to an interactive scene.
//!
//! A viewer owns exactly one load. Bytes are fetched on the IO task pool,
//! published into the in-memory `fetched://` source, decoded by Bevy's glTF
//! loader and finally measured and normalised once the scene instance spawns.
//!
//! ```text
//! Viewer::new ──> FetchTasks ──> poll_fetch_tasks ──> PendingGltf
//!                                                        │
//!        SceneReady <── finish_scene_spawn <── poll_gltf_load
//! ```

/// Pure load state machine, display state and load errors.
pub mod asset_loader;

/// Platform fetch of raw scene bytes.
pub mod fetch;

/// In-memory asset source for fetched bytes.
pub mod fetched_source;

/// Systems driving fetch, decode and scene spawn.
pub mod scene_loader;

/// Native start-up manifest fed into the host bridge.
pub mod manifest_loader;
