/// Vertical field of view of the viewer camera, in degrees.
pub const CAMERA_FOV_DEGREES: f32 = 45.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;

/// Survey pose used when a scene has no navigation nodes.
pub const SURVEY_POSITION: [f32; 3] = [0.0, 5.0, 12.0];
pub const SURVEY_TARGET: [f32; 3] = [0.0, 0.0, 0.0];

/// Offset from a parked node position to its look target.
pub const NODE_LOOK_OFFSET: [f32; 3] = [0.0, 0.0, -0.01];

/// Node-to-node camera flight duration.
pub const TRANSITION_DURATION_MS: u64 = 1800;

/// Radius of the navigation marker sphere drawn at each node.
pub const MARKER_SPHERE_RADIUS: f32 = 0.12;

/// How long the fixed-hotspot acknowledgment stays on screen.
pub const ACK_INDICATOR_SECS: f32 = 2.0;

pub const CLEAR_COLOUR_SRGB: [f32; 3] = [0.039, 0.039, 0.039];
pub const MARKER_COLOUR_SRGBA: [f32; 4] = [1.0, 0.4, 0.0, 0.85];
pub const HOTSPOT_COLOUR_SRGBA: [f32; 4] = [0.0, 1.0, 0.0, 0.5];
pub const HIGHLIGHT_COLOUR_SRGBA: [f32; 4] = [1.0, 1.0, 0.0, 0.4];

pub const AMBIENT_BRIGHTNESS: f32 = 1000.0;
pub const MAIN_LIGHT_ILLUMINANCE: f32 = 6000.0;
pub const MAIN_LIGHT_POSITION: [f32; 3] = [5.0, 10.0, 7.5];

/// Orbit behaviour for one control policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitLimits {
    pub enable_pan: bool,
    pub enable_zoom: bool,
    /// Fraction of angular velocity removed per frame.
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

pub const FREE_ORBIT_LIMITS: OrbitLimits = OrbitLimits {
    enable_pan: true,
    enable_zoom: true,
    damping_factor: 0.05,
    rotate_speed: 1.0,
    min_distance: 0.0,
    max_distance: f32::INFINITY,
};

pub const FIXED_ROTATE_LIMITS: OrbitLimits = OrbitLimits {
    enable_pan: false,
    enable_zoom: false,
    damping_factor: 0.08,
    rotate_speed: 0.5,
    min_distance: 0.01,
    max_distance: 0.01,
};

/// Pointer pixels to radians for a full-height drag, before `rotate_speed`.
pub const ROTATE_RADIANS_PER_VIEWPORT: f32 = std::f32::consts::TAU;
pub const ZOOM_STEP: f32 = 0.95;
pub const PAN_SPEED: f32 = 1.0;
