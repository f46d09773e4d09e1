use bevy::math::{Dir3, Mat4, Ray3d, Vec2, Vec3};
use constants::render_settings::{
    CAMERA_FAR, CAMERA_FOV_DEGREES, CAMERA_NEAR, NODE_LOOK_OFFSET, SURVEY_POSITION, SURVEY_TARGET,
};

/// Live viewpoint of the viewer camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_target: Vec3,
}

impl CameraPose {
    pub fn new(position: Vec3, look_target: Vec3) -> Self {
        Self {
            position,
            look_target,
        }
    }

    /// Pose parked exactly at a node, looking a hair down -Z.
    pub fn at_node(position: Vec3) -> Self {
        Self {
            position,
            look_target: position + Vec3::from_array(NODE_LOOK_OFFSET),
        }
    }

    pub fn survey() -> Self {
        Self::new(
            Vec3::from_array(SURVEY_POSITION),
            Vec3::from_array(SURVEY_TARGET),
        )
    }

    /// Position and target interpolated independently with the same weight.
    pub fn lerp(&self, other: &CameraPose, weight: f32) -> CameraPose {
        CameraPose {
            position: self.position.lerp(other.position, weight),
            look_target: self.look_target.lerp(other.look_target, weight),
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_target, Vec3::Y)
    }

    /// Ray from the camera through a point in normalised device coordinates.
    pub fn ray_through_ndc(&self, ndc: Vec2, projection: &Perspective, aspect: f32) -> Option<Ray3d> {
        let view_proj = projection.matrix(aspect) * self.view_matrix();
        let inverse = view_proj.inverse();
        let on_near_plane = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        let direction = Dir3::new(on_near_plane - self.position).ok()?;
        Some(Ray3d::new(self.position, direction))
    }
}

/// Perspective parameters shared by the Bevy camera and the pick ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perspective {
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Perspective {
    fn default() -> Self {
        Self {
            fov_y: CAMERA_FOV_DEGREES.to_radians(),
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
        }
    }
}

impl Perspective {
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect.max(f32::EPSILON), self.near, self.far)
    }
}

/// Window pixel coordinates (origin top-left) to NDC (origin center, +Y up).
pub fn screen_to_ndc(screen: Vec2, viewport: Vec2) -> Option<Vec2> {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return None;
    }
    Some(Vec2::new(
        screen.x / viewport.x * 2.0 - 1.0,
        -(screen.y / viewport.y) * 2.0 + 1.0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndc_corners() {
        let viewport = Vec2::new(800.0, 600.0);
        assert_eq!(screen_to_ndc(Vec2::ZERO, viewport), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(screen_to_ndc(viewport, viewport), Some(Vec2::new(1.0, -1.0)));
        assert_eq!(screen_to_ndc(viewport * 0.5, viewport), Some(Vec2::ZERO));
        assert_eq!(screen_to_ndc(Vec2::ONE, Vec2::ZERO), None);
    }

    #[test]
    fn center_ray_follows_view_direction() {
        let pose = CameraPose::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let ray = pose
            .ray_through_ndc(Vec2::ZERO, &Perspective::default(), 4.0 / 3.0)
            .unwrap();
        assert!(ray.origin.abs_diff_eq(pose.position, 1e-6));
        assert!(ray.direction.as_vec3().abs_diff_eq(Vec3::NEG_Z, 1e-4));
    }

    #[test]
    fn right_edge_ray_leans_right() {
        let pose = CameraPose::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let ray = pose
            .ray_through_ndc(Vec2::new(1.0, 0.0), &Perspective::default(), 1.0)
            .unwrap();
        assert!(ray.direction.x > 0.0);
        assert!(ray.direction.z < 0.0);
    }

    #[test]
    fn node_pose_looks_down_negative_z() {
        let pose = CameraPose::at_node(Vec3::new(1.0, 2.0, 3.0));
        assert!(pose.look_target.abs_diff_eq(Vec3::new(1.0, 2.0, 2.99), 1e-6));
    }
}
