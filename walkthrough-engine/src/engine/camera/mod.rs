//! Viewer camera: pose, navigation graph, transitions and orbit input.
//!
//! The camera pose is owned by `CameraController`. Bevy's `Camera3d` only
//! mirrors it once per frame, after input and transitions have been applied.

/// Node-to-node camera state machine with orbit controls.
pub mod controller;

/// Easing curve for camera flights.
pub mod easing;

/// Navigable viewpoints and their adjacency.
pub mod navigation;

/// Camera pose, projection and pick-ray construction.
pub mod pose;

/// Bevy systems: input gathering and pose sync.
pub mod viewer_camera;
