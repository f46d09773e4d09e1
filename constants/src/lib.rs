//! Shared static configuration for the walkthrough engine.

/// Authoring-to-render coordinate conversion.
pub mod coordinate_system;

/// Per-property node and hotspot tables.
pub mod property;

/// Camera, lighting and interaction constants.
pub mod render_settings;
