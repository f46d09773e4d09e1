use crate::coordinate_system::CoordinateSpace;

/// Named camera viewpoint as exported from the authoring tool.
#[derive(Debug, Clone, Copy)]
pub struct AuthoredNode {
    pub name: &'static str,
    /// Short label shown on the navigation toggle.
    pub label: &'static str,
    pub position: [f32; 3],
}

/// Axis-aligned interactive box. `size` is the full box size.
#[derive(Debug, Clone, Copy)]
pub struct AuthoredHotspot {
    pub name: &'static str,
    pub position: [f32; 3],
    pub size: [f32; 3],
}

/// Static interactive layout of one scene.
#[derive(Debug, Clone, Copy)]
pub struct SceneLayout {
    pub nodes: &'static [AuthoredNode],
    pub node_space: CoordinateSpace,
    pub default_node: Option<&'static str>,
    pub hotspots: &'static [AuthoredHotspot],
    pub hotspot_space: CoordinateSpace,
    /// Hotspots whose click moves the host into the interior scene.
    pub entry_hotspots: &'static [&'static str],
}

pub const EMPTY_LAYOUT: SceneLayout = SceneLayout {
    nodes: &[],
    node_space: CoordinateSpace::Authoring,
    default_node: None,
    hotspots: &[],
    hotspot_space: CoordinateSpace::Render,
    entry_hotspots: &[],
};

/// Property whose exterior carries the fixed hotspot set.
pub const GRAFFITI_PROPERTY: &str = "Graffiti";

pub const INTERIOR_NODES: &[AuthoredNode] = &[
    AuthoredNode {
        name: "Node_A",
        label: "Room A",
        position: [0.21206, -0.097888, 1.5867],
    },
    AuthoredNode {
        name: "Node_B",
        label: "Room B",
        position: [-3.6825, -2.357, 1.8756],
    },
];

/// Doorway boxes captured in the normalised exterior scene.
pub const GRAFFITI_HOTSPOTS: &[AuthoredHotspot] = &[
    AuthoredHotspot {
        name: "Object_52",
        position: [-3.301, 0.283, -0.106],
        size: [0.399, 0.996, 1.622],
    },
    AuthoredHotspot {
        name: "Object_36",
        position: [2.035, 0.298, -4.451],
        size: [0.903, 0.765, 0.12],
    },
    AuthoredHotspot {
        name: "Object_37",
        position: [-1.764, 0.178, -2.012],
        size: [0.903, 0.765, 0.12],
    },
    AuthoredHotspot {
        name: "Object_34",
        position: [3.78, 0.285, 0.737],
        size: [0.179, 0.766, 1.409],
    },
    AuthoredHotspot {
        name: "Object_42",
        position: [0.663, 0.373, -3.379],
        size: [0.199, 0.58, 1.591],
    },
    AuthoredHotspot {
        name: "Object_5",
        position: [-3.383, 1.91, -0.118],
        size: [0.045, 0.983, 0.357],
    },
];

pub const GRAFFITI_ENTRY_HOTSPOTS: &[&str] = &[
    "Object_52",
    "Object_36",
    "Object_37",
    "Object_34",
    "Object_42",
    "Object_5",
];

/// Exterior layout for a property. Only the Graffiti building carries hotspots.
pub fn exterior_layout(property_name: &str) -> SceneLayout {
    if property_name == GRAFFITI_PROPERTY {
        SceneLayout {
            hotspots: GRAFFITI_HOTSPOTS,
            hotspot_space: CoordinateSpace::Render,
            entry_hotspots: GRAFFITI_ENTRY_HOTSPOTS,
            ..EMPTY_LAYOUT
        }
    } else {
        EMPTY_LAYOUT
    }
}

/// Interior layout shared by every property.
pub fn interior_layout(_property_name: &str) -> SceneLayout {
    SceneLayout {
        nodes: INTERIOR_NODES,
        node_space: CoordinateSpace::Authoring,
        default_node: Some("Node_A"),
        ..EMPTY_LAYOUT
    }
}
