//! Scene dressing around the loaded model.
//!
//! Navigation markers, hotspot volumes and the selection highlight are placed
//! in world space once the model is normalised. The UI overlay carries the
//! status text, control hint, node toggle and acknowledgment label.

/// Marker spheres, hotspot boxes and the selection highlight.
pub mod markers;

/// Screen-space overlay: status, hint, buttons.
pub mod overlay;
