use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::core::view_mode::ViewMode;
use crate::tools::pipeline::InteractionEvent;

/// Message sent from the viewer to the host, discriminated by `type`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeMessage {
    FixedClick {
        name: String,
        center: [f32; 3],
        size: [f32; 3],
    },
    Selection {
        #[serde(rename = "meshName")]
        mesh_name: String,
        center: [f32; 3],
        size: [f32; 3],
    },
    Log {
        message: String,
    },
    Error {
        message: String,
    },
    SceneReady {
        mode: ViewMode,
    },
    ViewModeChanged {
        mode: ViewMode,
    },
}

impl From<InteractionEvent> for BridgeMessage {
    fn from(event: InteractionEvent) -> Self {
        match event {
            InteractionEvent::FixedHit {
                name,
                center,
                half_extents,
            } => BridgeMessage::FixedClick {
                name,
                center: center.to_array(),
                size: (half_extents * 2.0).to_array(),
            },
            InteractionEvent::MeshHit {
                mesh_name,
                center,
                extents,
            } => BridgeMessage::Selection {
                mesh_name,
                center: center.to_array(),
                size: extents.to_array(),
            },
            InteractionEvent::Log { message } => BridgeMessage::Log { message },
            InteractionEvent::Error { message } => BridgeMessage::Error { message },
        }
    }
}

/// Command sent from the host to the viewer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostCommand {
    /// (Re)initialise the viewer for a property.
    #[serde(rename_all = "camelCase")]
    Init {
        #[serde(default)]
        model_url: Option<String>,
        #[serde(default)]
        interior_url: Option<String>,
        property_name: String,
    },
    SetViewMode {
        mode: ViewMode,
    },
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("malformed bridge payload: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("failed to encode bridge message: {0}")]
    Encode(#[source] serde_json::Error),
}

pub fn decode_command(raw: &str) -> Result<HostCommand, BridgeError> {
    serde_json::from_str(raw).map_err(BridgeError::Malformed)
}

pub fn decode_message(raw: &str) -> Result<BridgeMessage, BridgeError> {
    serde_json::from_str(raw).map_err(BridgeError::Malformed)
}

pub fn encode<T: Serialize>(message: &T) -> Result<String, BridgeError> {
    serde_json::to_string(message).map_err(BridgeError::Encode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec3;
    use serde_json::json;

    #[test]
    fn fixed_click_reports_full_size() {
        let message = BridgeMessage::from(InteractionEvent::FixedHit {
            name: "Object_52".to_string(),
            center: Vec3::new(-3.301, 0.283, -0.106),
            half_extents: Vec3::new(0.25, 0.5, 1.0),
        });
        let value: serde_json::Value = serde_json::from_str(&encode(&message).unwrap()).unwrap();
        assert_eq!(value["type"], "fixed_click");
        assert_eq!(value["name"], "Object_52");
        assert_eq!(value["size"], json!([0.5, 1.0, 2.0]));
    }

    #[test]
    fn selection_uses_camel_case_mesh_name() {
        let message = BridgeMessage::from(InteractionEvent::MeshHit {
            mesh_name: "Unnamed Mesh".to_string(),
            center: Vec3::ZERO,
            extents: Vec3::ONE,
        });
        let value: serde_json::Value = serde_json::from_str(&encode(&message).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "selection",
                "meshName": "Unnamed Mesh",
                "center": [0.0, 0.0, 0.0],
                "size": [1.0, 1.0, 1.0]
            })
        );
    }

    #[test]
    fn lifecycle_messages_carry_lowercase_mode() {
        let encoded = encode(&BridgeMessage::ViewModeChanged {
            mode: ViewMode::Interior,
        })
        .unwrap();
        assert_eq!(encoded, r#"{"type":"view_mode_changed","mode":"interior"}"#);
        assert_eq!(
            decode_message(r#"{"type":"log","message":"hello"}"#).unwrap(),
            BridgeMessage::Log {
                message: "hello".to_string()
            }
        );
    }

    #[test]
    fn init_command_parses_host_field_names() {
        let command = decode_command(
            r#"{"type":"init","modelUrl":"https://cdn/a.glb","propertyName":"Graffiti"}"#,
        )
        .unwrap();
        assert_eq!(
            command,
            HostCommand::Init {
                model_url: Some("https://cdn/a.glb".to_string()),
                interior_url: None,
                property_name: "Graffiti".to_string(),
            }
        );
    }

    #[test]
    fn malformed_and_unknown_payloads_are_errors() {
        assert!(matches!(decode_command("{not json"), Err(BridgeError::Malformed(_))));
        assert!(matches!(
            decode_command(r#"{"type":"teleport","to":"Node_B"}"#),
            Err(BridgeError::Malformed(_))
        ));
        assert!(matches!(
            decode_command(r#"{"type":"set_view_mode","mode":"attic"}"#),
            Err(BridgeError::Malformed(_))
        ));
        assert!(matches!(decode_message(r#"{"name":"x"}"#), Err(BridgeError::Malformed(_))));
    }
}
