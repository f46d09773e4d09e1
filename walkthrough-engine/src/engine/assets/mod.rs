//! Scene configuration and geometry measurement.
//!
//! Turns the property session into per-mode scene setups and measures
//! spawned scenes so they can be normalised into render space.

/// Scene bounds accumulated over a spawned glTF hierarchy.
pub mod bounds;

/// Property session, per-mode scene setup and the native start-up manifest.
pub mod scene_setup;
