use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

/// Coordinate transformation matrix (row-major: [x_new, y_new, z_new])
/// Default: -90° X rotation (Z→Y, -Y→Z, X→X)
pub const COORDINATE_TRANSFORM: [[f32; 3]; 3] = [
    [1.0, 0.0, 0.0],  // X = X
    [0.0, 0.0, 1.0],  // Y = Z
    [0.0, -1.0, 0.0], // Z = -Y
];

/// Longest bounding-box dimension of a normalised scene, in render units.
pub const REFERENCE_LENGTH: f32 = 10.0;

/// Frame an authored table was captured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateSpace {
    /// Z-up authoring tool coordinates, before recentering and rescaling.
    Authoring,
    /// Y-up render coordinates of the already normalised scene.
    Render,
}

/// Recentering and rescaling pair computed once per loaded scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneFrame {
    /// Bounding-box center of the raw scene, in render axes.
    pub center: Vec3,
    pub scale: f32,
}

impl SceneFrame {
    pub const IDENTITY: Self = Self {
        center: Vec3::ZERO,
        scale: 1.0,
    };

    /// Frame that maps the box `[min, max]` onto a centered box whose longest
    /// side is [`REFERENCE_LENGTH`].
    pub fn from_bounds(min: Vec3, max: Vec3) -> Self {
        let size = max - min;
        let max_dim = size.max_element();
        let scale = if max_dim > f32::EPSILON {
            REFERENCE_LENGTH / max_dim
        } else {
            1.0
        };
        Self {
            center: (min + max) * 0.5,
            scale,
        }
    }

    /// Place an authored point into render space.
    pub fn place(&self, point: Vec3, space: CoordinateSpace) -> Vec3 {
        match space {
            CoordinateSpace::Authoring => convert(point, self.center, self.scale),
            CoordinateSpace::Render => point,
        }
    }

    /// Place authored half-extents into render space. Extents are rescaled
    /// but never recentered.
    pub fn place_extents(&self, half_extents: Vec3, space: CoordinateSpace) -> Vec3 {
        match space {
            CoordinateSpace::Authoring => remap_extents(half_extents) * self.scale,
            CoordinateSpace::Render => half_extents,
        }
    }
}

/// Apply the axis remap only.
pub fn remap_axes(point: Vec3) -> Vec3 {
    let input = point.to_array();
    let mut output = [0.0; 3];

    for i in 0..3 {
        for j in 0..3 {
            output[i] += COORDINATE_TRANSFORM[i][j] * input[j];
        }
    }

    Vec3::from_array(output)
}

/// Axis remap for sizes: same permutation, always non-negative.
pub fn remap_extents(extents: Vec3) -> Vec3 {
    remap_axes(extents).abs()
}

/// Authoring point to render point: remap axes, subtract `center`, multiply by `scale`.
pub fn convert(point: Vec3, center: Vec3, scale: f32) -> Vec3 {
    (remap_axes(point) - center) * scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn node_a_lands_on_y_up_axes() {
        let world = convert(Vec3::new(0.212, -0.098, 1.587), Vec3::ZERO, 1.0);
        assert_relative_eq!(world.x, 0.212);
        assert_relative_eq!(world.y, 1.587);
        assert_relative_eq!(world.z, 0.098);
    }

    #[test]
    fn recenter_happens_before_rescale() {
        let world = convert(Vec3::new(1.0, -2.0, 3.0), Vec3::new(1.0, 1.0, 1.0), 2.0);
        assert!(world.abs_diff_eq(Vec3::new(0.0, 4.0, 2.0), 1e-6));
    }

    #[test]
    fn conversion_is_not_idempotent_for_real_frames() {
        let frame = SceneFrame {
            center: Vec3::new(0.5, 1.0, -0.25),
            scale: 2.5,
        };
        let p = Vec3::new(0.212, -0.098, 1.587);
        let once = frame.place(p, CoordinateSpace::Authoring);
        let twice = frame.place(once, CoordinateSpace::Authoring);
        assert!(!once.abs_diff_eq(twice, 1e-4));

        // Render-space data is never normalised a second time.
        assert_eq!(frame.place(once, CoordinateSpace::Render), once);
    }

    #[test]
    fn identity_frame_is_a_pure_axis_remap() {
        let p = Vec3::new(3.0, 4.0, 5.0);
        assert_eq!(SceneFrame::IDENTITY.place(p, CoordinateSpace::Authoring), remap_axes(p));
    }

    #[test]
    fn frame_from_bounds_fits_reference_length() {
        let frame = SceneFrame::from_bounds(Vec3::new(-1.0, 0.0, -2.0), Vec3::new(3.0, 2.0, 2.0));
        assert!(frame.center.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-6));
        assert_relative_eq!(frame.scale, REFERENCE_LENGTH / 4.0);
    }

    #[test]
    fn degenerate_bounds_keep_unit_scale() {
        let frame = SceneFrame::from_bounds(Vec3::ONE, Vec3::ONE);
        assert_relative_eq!(frame.scale, 1.0);
    }

    #[test]
    fn extents_stay_positive_after_remap() {
        let he = remap_extents(Vec3::new(0.5, 1.0, 2.0));
        assert!(he.abs_diff_eq(Vec3::new(0.5, 2.0, 1.0), 1e-6));
    }
}
