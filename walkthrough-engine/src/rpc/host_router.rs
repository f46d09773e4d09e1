use bevy::prelude::*;

use super::protocol::{BridgeMessage, HostCommand};
use crate::engine::assets::scene_setup::PropertySession;
use crate::engine::core::view_mode::ViewMode;

/// Host-side dispatch of outbound bridge messages.
///
/// On wasm the embedding page plays this role. Native builds have no page, so
/// the router runs in-process and its commands are looped back into the
/// inbound queue.
#[derive(Resource, Debug, Default)]
pub struct HostRouter {
    clicks_registered: u32,
}

impl HostRouter {
    pub fn clicks_registered(&self) -> u32 {
        self.clicks_registered
    }

    /// Handle one message; returns the commands the host answers with.
    pub fn route(&mut self, message: &BridgeMessage, session: &PropertySession) -> Vec<HostCommand> {
        match message {
            BridgeMessage::FixedClick { name, center, size } => {
                info!(
                    "Fixed button clicked: {name} at {} size {}",
                    format_vec(center),
                    format_vec(size)
                );
                self.clicks_registered += 1;
                info!("Click registered");
                if session.entry_hotspots().contains(&name.as_str()) && session.interior_available() {
                    vec![HostCommand::SetViewMode {
                        mode: ViewMode::Interior,
                    }]
                } else {
                    Vec::new()
                }
            }
            BridgeMessage::Selection {
                mesh_name,
                center,
                size,
            } => {
                info!(
                    "Mesh selected: {mesh_name} center {} size {}",
                    format_vec(center),
                    format_vec(size)
                );
                Vec::new()
            }
            BridgeMessage::Log { message } => {
                info!("[viewer] {message}");
                Vec::new()
            }
            BridgeMessage::Error { message } => {
                error!("[viewer] {message}");
                Vec::new()
            }
            BridgeMessage::SceneReady { mode } => {
                debug!("Viewer reports {} scene ready", mode.as_str());
                Vec::new()
            }
            BridgeMessage::ViewModeChanged { mode } => {
                debug!("Viewer switched to {}", mode.as_str());
                Vec::new()
            }
        }
    }
}

fn round3(value: f32) -> f32 {
    (value * 1000.0).round() / 1000.0
}

fn format_vec(values: &[f32; 3]) -> String {
    format!(
        "({}, {}, {})",
        round3(values[0]),
        round3(values[1]),
        round3(values[2])
    )
}
