//! Orbit camera and the camera contract used by the character controller.

use std::f32::consts::{PI, TAU};

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::render::CameraParams;

/// Camera operations the locomotion controller depends on.
///
/// The controller reads the camera position and viewing direction, drags the
/// camera along with the character and moves the orbit pivot.
pub trait CameraRig {
    fn position(&self) -> Vec3;
    /// Unit viewing direction in world space.
    fn forward(&self) -> Vec3;
    fn translate(&mut self, offset: Vec3);
    /// Point the camera orbits around and looks at.
    fn set_target(&mut self, target: Vec3);
}

const POLAR_EPSILON: f32 = 1e-4;

/// Perspective camera orbiting a target point, with damped mouse input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Fraction of the pending orbit applied per update; the rest carries over.
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    #[serde(skip)]
    pending_yaw: f32,
    #[serde(skip)]
    pending_pitch: f32,
    #[serde(skip, default = "unit_scale")]
    pending_scale: f32,
}

fn unit_scale() -> f32 {
    1.0
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(Vec3::new(4.0, 2.0, 5.0), Vec3::ZERO)
    }
}

impl OrbitCamera {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            fov_degrees: 75.0,
            near: 0.1,
            far: 100.0,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_scale: 1.0,
        }
    }

    /// Queues an orbit from a mouse drag measured in pixels.
    ///
    /// A drag across the full viewport height turns the camera a full circle.
    pub fn orbit(&mut self, drag: Vec2, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.pending_yaw -= TAU * drag.x / height * self.rotate_speed;
        self.pending_pitch -= TAU * drag.y / height * self.rotate_speed;
    }

    /// Queues a zoom step; positive amounts move the camera closer.
    pub fn zoom(&mut self, amount: f32) {
        self.pending_scale *= 0.95_f32.powf(amount * self.zoom_speed);
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Applies a damped share of the queued orbit and zoom.
    pub fn update(&mut self) {
        let idle = self.pending_yaw.abs() < 1e-6
            && self.pending_pitch.abs() < 1e-6
            && (self.pending_scale - 1.0).abs() < 1e-6;
        if idle {
            self.pending_yaw = 0.0;
            self.pending_pitch = 0.0;
            self.pending_scale = 1.0;
            return;
        }

        let offset = self.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }
        let theta = offset.x.atan2(offset.z) + self.pending_yaw * self.damping_factor;
        let phi = ((offset.y / radius).clamp(-1.0, 1.0).acos()
            + self.pending_pitch * self.damping_factor)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        let radius = (radius * self.pending_scale).clamp(self.min_distance, self.max_distance);

        self.pending_yaw *= 1.0 - self.damping_factor;
        self.pending_pitch *= 1.0 - self.damping_factor;
        self.pending_scale = 1.0;

        let sin_phi = phi.sin();
        self.position = self.target
            + Vec3::new(
                radius * sin_phi * theta.sin(),
                radius * phi.cos(),
                radius * sin_phi * theta.cos(),
            );
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            aspect.max(0.01),
            self.near,
            self.far,
        )
    }

    pub fn camera_params(&self, aspect: f32) -> CameraParams {
        CameraParams {
            view_proj: self.projection(aspect) * self.view(),
            position: self.position,
        }
    }
}

impl CameraRig for OrbitCamera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_points_at_target() {
        let camera = OrbitCamera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn update_without_input_leaves_camera_in_place() {
        let mut camera = OrbitCamera::default();
        let before = camera.position;
        camera.update();
        assert_eq!(camera.position, before);
    }

    #[test]
    fn orbit_keeps_distance_and_eases_in() {
        let mut camera = OrbitCamera::default();
        let distance = camera.distance();
        camera.orbit(Vec2::new(120.0, 0.0), 720.0);

        camera.update();
        let first = camera.position;
        assert!((camera.distance() - distance).abs() < 1e-4);
        assert!(first.distance(Vec3::new(4.0, 2.0, 5.0)) > 0.0);

        // Damping carries the remaining orbit into later frames.
        camera.update();
        assert!(camera.position.distance(first) > 0.0);
    }

    #[test]
    fn pitch_never_flips_over_the_pole() {
        let mut camera = OrbitCamera::default();
        camera.damping_factor = 1.0;
        camera.orbit(Vec2::new(0.0, 10_000.0), 100.0);
        camera.update();
        assert!(camera.position.y > camera.target.y);
        assert!(camera.forward().is_finite());
    }

    #[test]
    fn zoom_respects_distance_limits() {
        let mut camera = OrbitCamera::default();
        camera.min_distance = 2.0;
        camera.zoom(200.0);
        camera.update();
        assert!((camera.distance() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn rig_moves_camera_and_pivot_independently() {
        let mut camera = OrbitCamera::default();
        camera.translate(Vec3::new(1.0, 0.0, -1.0));
        camera.set_target(Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(CameraRig::position(&camera), Vec3::new(5.0, 2.0, 4.0));
        assert_eq!(camera.target, Vec3::Y);
    }
}
