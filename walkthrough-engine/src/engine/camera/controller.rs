use std::time::Duration;

use bevy::math::{Vec2, Vec3};
use constants::render_settings::{
    FIXED_ROTATE_LIMITS, FREE_ORBIT_LIMITS, OrbitLimits, PAN_SPEED, TRANSITION_DURATION_MS,
    ZOOM_STEP,
};

use super::easing::ease_in_out_quad;
use super::navigation::WorldNode;
use super::pose::CameraPose;

/// Below this the residual orbit velocity is dropped.
const VELOCITY_EPSILON: f32 = 1e-5;
/// Keeps the polar angle off the poles where look-at degenerates.
const POLAR_MARGIN: f32 = 1e-3;

/// Which manual camera manipulation is allowed while idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPolicy {
    /// Rotate, zoom and pan around an inspected object.
    FreeOrbit,
    /// Look around in place at a navigation node.
    FixedRotate,
}

impl ControlPolicy {
    pub fn limits(self) -> OrbitLimits {
        match self {
            ControlPolicy::FreeOrbit => FREE_ORBIT_LIMITS,
            ControlPolicy::FixedRotate => FIXED_ROTATE_LIMITS,
        }
    }
}

/// One in-flight camera flight between two poses.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from: CameraPose,
    pub to: CameraPose,
    pub to_node: String,
    pub started_at: Duration,
    pub duration: Duration,
}

impl Transition {
    /// Linear progress in [0, 1].
    pub fn progress(&self, now: Duration) -> f32 {
        let elapsed = now.saturating_sub(self.started_at);
        if elapsed >= self.duration {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()) as f32
    }

    pub fn sample(&self, now: Duration) -> CameraPose {
        self.from.lerp(&self.to, ease_in_out_quad(self.progress(now)))
    }

    pub fn is_finished(&self, now: Duration) -> bool {
        now.saturating_sub(self.started_at) >= self.duration
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CameraState {
    /// Parked. `at_node` is `None` for the survey pose.
    Idle { at_node: Option<String> },
    Transitioning(Transition),
}

/// Manual orbit input accumulated over one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrbitInput {
    /// Yaw and pitch deltas in radians, before the policy's rotate speed.
    pub rotate: Vec2,
    /// Pan in viewport fractions.
    pub pan: Vec2,
    /// Positive steps zoom in.
    pub zoom: f32,
}

/// Camera pose state machine: idle with manual orbit, or flying to a node.
#[derive(Debug, Clone)]
pub struct CameraController {
    pose: CameraPose,
    state: CameraState,
    policy: ControlPolicy,
    orbit_velocity: Vec2,
    transition_duration: Duration,
}

impl CameraController {
    /// Survey camera over a scene without nodes.
    pub fn survey() -> Self {
        Self {
            pose: CameraPose::survey(),
            state: CameraState::Idle { at_node: None },
            policy: ControlPolicy::FreeOrbit,
            orbit_velocity: Vec2::ZERO,
            transition_duration: Duration::from_millis(TRANSITION_DURATION_MS),
        }
    }

    /// Snap to a node without animating.
    pub fn place_at(&mut self, node: &WorldNode) {
        self.pose = node.pose();
        self.state = CameraState::Idle {
            at_node: Some(node.name.clone()),
        };
        self.policy = ControlPolicy::FixedRotate;
        self.orbit_velocity = Vec2::ZERO;
    }

    /// Begin flying to `node`. Refused while already in flight or already parked there.
    pub fn start_transition(&mut self, node: &WorldNode, now: Duration) -> bool {
        match &self.state {
            CameraState::Transitioning(_) => return false,
            CameraState::Idle { at_node: Some(at) } if *at == node.name => return false,
            CameraState::Idle { .. } => {}
        }
        self.orbit_velocity = Vec2::ZERO;
        self.state = CameraState::Transitioning(Transition {
            from: self.pose,
            to: node.pose(),
            to_node: node.name.clone(),
            started_at: now,
            duration: self.transition_duration,
        });
        true
    }

    /// Advance one frame. Returns the node name on the frame a flight lands.
    pub fn tick(&mut self, now: Duration, input: OrbitInput) -> Option<String> {
        let landed = match &self.state {
            CameraState::Transitioning(transition) if transition.is_finished(now) => {
                Some((transition.to, transition.to_node.clone()))
            }
            CameraState::Transitioning(transition) => {
                self.pose = transition.sample(now);
                return None;
            }
            CameraState::Idle { .. } => None,
        };

        if let Some((pose, node)) = landed {
            self.pose = pose;
            self.state = CameraState::Idle {
                at_node: Some(node.clone()),
            };
            self.policy = ControlPolicy::FixedRotate;
            self.orbit_velocity = Vec2::ZERO;
            return Some(node);
        }

        self.apply_orbit(input);
        None
    }

    fn apply_orbit(&mut self, input: OrbitInput) {
        let limits = self.policy.limits();
        self.orbit_velocity += input.rotate * limits.rotate_speed;

        let zoom = if limits.enable_zoom { input.zoom } else { 0.0 };
        let pan = if limits.enable_pan { input.pan } else { Vec2::ZERO };
        if self.orbit_velocity == Vec2::ZERO && zoom == 0.0 && pan == Vec2::ZERO {
            return;
        }

        let offset = self.pose.position - self.pose.look_target;
        let radius = offset.length();
        let mut yaw = offset.x.atan2(offset.z);
        let mut polar = if radius > 0.0 {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            std::f32::consts::FRAC_PI_2
        };

        yaw -= self.orbit_velocity.x;
        polar = (polar - self.orbit_velocity.y)
            .clamp(POLAR_MARGIN, std::f32::consts::PI - POLAR_MARGIN);

        let radius = (radius * ZOOM_STEP.powf(zoom)).clamp(limits.min_distance, limits.max_distance);

        if pan != Vec2::ZERO {
            let forward = (-offset).normalize_or_zero();
            let right = forward.cross(Vec3::Y).normalize_or_zero();
            let up = right.cross(forward);
            let shift = (-right * pan.x + up * pan.y) * radius * PAN_SPEED;
            self.pose.look_target += shift;
        }

        let direction = Vec3::new(
            polar.sin() * yaw.sin(),
            polar.cos(),
            polar.sin() * yaw.cos(),
        );
        self.pose.position = self.pose.look_target + direction * radius;

        self.orbit_velocity *= 1.0 - limits.damping_factor;
        if self.orbit_velocity.length() < VELOCITY_EPSILON {
            self.orbit_velocity = Vec2::ZERO;
        }
    }

    pub fn pose(&self) -> &CameraPose {
        &self.pose
    }

    /// Destination of the in-flight transition, if any.
    pub fn transition_target(&self) -> Option<&str> {
        match &self.state {
            CameraState::Transitioning(transition) => Some(&transition.to_node),
            CameraState::Idle { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn node(name: &str, position: Vec3) -> WorldNode {
        WorldNode {
            name: name.to_string(),
            label: name.to_string(),
            position,
        }
    }

    fn parked_at_a() -> (CameraController, WorldNode, WorldNode) {
        let a = node("Node_A", Vec3::new(0.0, 1.0, 0.0));
        let b = node("Node_B", Vec3::new(4.0, 1.0, -2.0));
        let mut camera = CameraController::survey();
        camera.place_at(&a);
        (camera, a, b)
    }

    #[test]
    fn midpoint_of_flight_is_half_way() {
        let (mut camera, a, b) = parked_at_a();
        let t0 = Duration::from_secs(3);
        assert!(camera.start_transition(&b, t0));
        assert_eq!(camera.tick(t0 + Duration::from_millis(900), OrbitInput::default()), None);

        let expected = a.pose().lerp(&b.pose(), 0.5);
        assert!(camera.pose().position.abs_diff_eq(expected.position, 1e-5));
        assert!(camera.pose().look_target.abs_diff_eq(expected.look_target, 1e-5));
        assert_eq!(camera.transition_target(), Some("Node_B"));
    }

    #[test]
    fn flight_lands_exactly_on_target() {
        let (mut camera, _, b) = parked_at_a();
        let t0 = Duration::from_millis(500);
        camera.start_transition(&b, t0);
        camera.tick(t0 + Duration::from_millis(1200), OrbitInput::default());

        let landed = camera.tick(t0 + Duration::from_millis(1800), OrbitInput::default());
        assert_eq!(landed.as_deref(), Some("Node_B"));
        assert_eq!(*camera.pose(), b.pose());
        assert_eq!(camera.transition_target(), None);

        // Landed under FixedRotate: pan and zoom are ignored.
        let idle_input = OrbitInput {
            rotate: Vec2::ZERO,
            pan: Vec2::ONE,
            zoom: 3.0,
        };
        camera.tick(t0 + Duration::from_millis(1816), idle_input);
        assert_eq!(*camera.pose(), b.pose());
    }

    #[test]
    fn late_frame_still_lands_once() {
        let (mut camera, _, b) = parked_at_a();
        camera.start_transition(&b, Duration::ZERO);
        let landed = camera.tick(Duration::from_secs(10), OrbitInput::default());
        assert_eq!(landed.as_deref(), Some("Node_B"));
        assert_eq!(camera.tick(Duration::from_secs(11), OrbitInput::default()), None);
    }

    #[test]
    fn second_request_during_flight_is_refused() {
        let (mut camera, a, b) = parked_at_a();
        camera.start_transition(&b, Duration::ZERO);
        assert!(!camera.start_transition(&a, Duration::from_millis(100)));
        assert_eq!(camera.transition_target(), Some("Node_B"));
    }

    #[test]
    fn parked_node_is_not_a_destination() {
        let (mut camera, a, _) = parked_at_a();
        let before = *camera.pose();
        assert!(!camera.start_transition(&a, Duration::ZERO));
        camera.tick(Duration::from_millis(16), OrbitInput::default());
        assert_eq!(*camera.pose(), before);
    }

    #[test]
    fn input_is_ignored_in_flight() {
        let (mut camera, a, b) = parked_at_a();
        camera.start_transition(&b, Duration::ZERO);
        let input = OrbitInput {
            rotate: Vec2::new(1.0, 0.3),
            pan: Vec2::ONE,
            zoom: 4.0,
        };
        camera.tick(Duration::from_millis(900), input);
        let expected = a.pose().lerp(&b.pose(), 0.5);
        assert!(camera.pose().position.abs_diff_eq(expected.position, 1e-5));
    }

    #[test]
    fn fixed_rotate_pins_radius_and_position() {
        let (mut camera, a, _) = parked_at_a();
        let input = OrbitInput {
            rotate: Vec2::new(0.4, 0.0),
            pan: Vec2::new(0.5, 0.5),
            zoom: 10.0,
        };
        camera.tick(Duration::ZERO, input);
        let offset = camera.pose().position - camera.pose().look_target;
        assert_relative_eq!(offset.length(), 0.01, epsilon = 1e-5);
        assert!(camera.pose().look_target.abs_diff_eq(a.pose().look_target, 1e-6));
    }

    #[test]
    fn orbit_velocity_decays_after_release() {
        let mut camera = CameraController::survey();
        camera.tick(
            Duration::ZERO,
            OrbitInput {
                rotate: Vec2::new(0.2, 0.0),
                ..Default::default()
            },
        );
        let after_drag = camera.pose().position;
        camera.tick(Duration::from_millis(16), OrbitInput::default());
        let coasting = camera.pose().position;
        assert!(!coasting.abs_diff_eq(after_drag, 1e-6));

        for frame in 0..2000 {
            camera.tick(Duration::from_millis(32 + frame), OrbitInput::default());
        }
        let settled = camera.pose().position;
        camera.tick(Duration::from_secs(60), OrbitInput::default());
        assert_eq!(camera.pose().position, settled);
    }

    #[test]
    fn free_orbit_zoom_moves_toward_target() {
        let mut camera = CameraController::survey();
        let before = (camera.pose().position - camera.pose().look_target).length();
        camera.tick(
            Duration::ZERO,
            OrbitInput {
                zoom: 3.0,
                ..Default::default()
            },
        );
        let after = (camera.pose().position - camera.pose().look_target).length();
        assert!(after < before);
    }
}
