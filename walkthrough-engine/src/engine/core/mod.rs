//! Core application setup and view lifecycle.
//!
//! Builds the Bevy app for native and WASM targets and owns the switch
//! between the exterior and interior scenes.

/// Application setup and system ordering.
pub mod app_setup;

/// Exterior/interior state, viewer rebuilds and host command handling.
pub mod view_mode;

/// Platform-specific window configuration for native and WASM builds.
///
/// Configures canvas integration for web targets and vsync settings.
pub mod window_config;
