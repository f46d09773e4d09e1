use bevy::prelude::*;
use constants::property::{SceneLayout, exterior_layout, interior_layout};
use serde::{Deserialize, Serialize};

use crate::engine::core::view_mode::ViewMode;

/// Everything a viewer needs to build one scene.
#[derive(Debug, Clone)]
pub struct SceneSetup {
    pub mode: ViewMode,
    pub model_url: Option<String>,
    pub layout: SceneLayout,
    pub mesh_selection: bool,
}

/// Property currently shown, as supplied by the host `init` command or the local manifest.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySession {
    pub property_name: String,
    pub exterior_url: Option<String>,
    pub interior_url: Option<String>,
}

impl PropertySession {
    pub fn setup_for(&self, mode: ViewMode) -> SceneSetup {
        match mode {
            ViewMode::Exterior => SceneSetup {
                mode,
                model_url: self.exterior_url.clone(),
                layout: exterior_layout(&self.property_name),
                mesh_selection: true,
            },
            ViewMode::Interior => SceneSetup {
                mode,
                model_url: self.interior_url.clone(),
                layout: interior_layout(&self.property_name),
                mesh_selection: true,
            },
        }
    }

    pub fn interior_available(&self) -> bool {
        self.interior_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }

    /// Hotspots whose click should take the host into the interior.
    pub fn entry_hotspots(&self) -> &'static [&'static str] {
        exterior_layout(&self.property_name).entry_hotspots
    }
}

/// Optional native start-up configuration (`viewer_manifest.json`).
#[derive(Asset, Debug, Clone, Serialize, Deserialize, TypePath)]
pub struct ViewerManifest {
    #[serde(rename = "propertyName")]
    pub property_name: String,
    #[serde(rename = "modelUrl", default)]
    pub model_url: Option<String>,
    #[serde(rename = "interiorUrl", default)]
    pub interior_url: Option<String>,
}

impl From<&ViewerManifest> for PropertySession {
    fn from(manifest: &ViewerManifest) -> Self {
        Self {
            property_name: manifest.property_name.clone(),
            exterior_url: manifest.model_url.clone(),
            interior_url: manifest.interior_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graffiti_exterior_carries_entry_hotspots() {
        let session = PropertySession {
            property_name: "Graffiti".to_string(),
            exterior_url: Some("a.glb".to_string()),
            interior_url: None,
        };
        assert_eq!(session.setup_for(ViewMode::Exterior).layout.hotspots.len(), 6);
        assert!(session.entry_hotspots().contains(&"Object_52"));
        assert!(!session.interior_available());
    }

    #[test]
    fn interior_setup_uses_interior_url_and_nodes() {
        let session = PropertySession {
            property_name: "Harbour Loft".to_string(),
            exterior_url: Some("ext.glb".to_string()),
            interior_url: Some("int.glb".to_string()),
        };
        let setup = session.setup_for(ViewMode::Interior);
        assert_eq!(setup.model_url.as_deref(), Some("int.glb"));
        assert_eq!(setup.layout.default_node, Some("Node_A"));
        assert!(session.entry_hotspots().is_empty());
    }

    #[test]
    fn manifest_parses_host_field_names() {
        let manifest: ViewerManifest = serde_json::from_str(
            r#"{"propertyName":"Graffiti","modelUrl":"https://cdn/g.glb"}"#,
        )
        .unwrap();
        let session = PropertySession::from(&manifest);
        assert_eq!(session.exterior_url.as_deref(), Some("https://cdn/g.glb"));
        assert_eq!(session.interior_url, None);
    }
}
