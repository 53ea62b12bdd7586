//! Point-light ghosts circling the house.

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::scene::{rgb, Light, LightKind};

/// Height the facing direction is raised by, so ghosts tilt upwards as they fly.
const FACING_LIFT: f32 = 2.0;

/// Shadow-casting point light carried by a ghost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub color: Vec3,
    pub intensity: f32,
    pub distance: f32,
    pub shadow_map_size: u32,
    pub shadow_far: f32,
}

impl PointLight {
    pub fn ghostly(color: Vec3) -> Self {
        Self {
            color,
            intensity: 3.0,
            distance: 3.0,
            shadow_map_size: 256,
            shadow_far: 7.0,
        }
    }
}

/// Closed-form flight path of a ghost as a function of elapsed seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GhostPath {
    /// Slow circle of radius 4 bobbing gently.
    Inner,
    /// Reverse circle of radius 5 with a jittery height.
    Middle,
    /// Wide reverse loop whose radius wobbles per axis.
    Outer,
}

impl GhostPath {
    pub fn position(self, t: f32) -> Vec3 {
        match self {
            Self::Inner => {
                let angle = t * 0.5;
                Vec3::new(
                    angle.cos() * 4.0,
                    (t * 3.0).sin() * 0.5 + 1.0,
                    angle.sin() * 4.0,
                )
            }
            Self::Middle => {
                let angle = -t * 0.32;
                Vec3::new(angle.cos() * 5.0, jitter_height(t), angle.sin() * 5.0)
            }
            Self::Outer => {
                let angle = -t * 0.18;
                Vec3::new(
                    angle.cos() * (7.0 + (t * 0.32).sin()),
                    jitter_height(t),
                    angle.sin() * (7.0 + (t * 0.5).sin()),
                )
            }
        }
    }
}

fn jitter_height(t: f32) -> f32 {
    (t * 4.0).sin() * 0.5 + (t * 2.5).sin() + 1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ghost {
    pub name: String,
    pub light: PointLight,
    pub path: GhostPath,
    position: Vec3,
    rotation: Quat,
}

impl Ghost {
    pub fn new(name: impl Into<String>, color: Vec3, path: GhostPath) -> Self {
        Self {
            name: name.into(),
            light: PointLight::ghostly(color),
            path,
            position: path.position(0.0),
            rotation: Quat::IDENTITY,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Moves the ghost to where its path is at `elapsed` and turns it along
    /// the step it just took.
    pub fn update(&mut self, elapsed: f32) {
        let next = self.path.position(elapsed);
        let step = next - self.position;
        let facing = Vec3::new(step.x, FACING_LIFT, step.z).normalize();
        self.rotation = look_rotation(facing).unwrap_or(self.rotation);
        self.position = next;
    }

    /// Scene light matching the ghost's current position.
    pub fn light(&self) -> Light {
        Light {
            name: self.name.clone(),
            kind: LightKind::Point {
                distance: self.light.distance,
            },
            position: self.position,
            color: self.light.color,
            intensity: self.light.intensity,
            cast_shadow: true,
        }
    }
}

/// Rotation taking +Z to `facing` with +Y kept as up, so the body never rolls.
/// `None` when `facing` is vertical.
fn look_rotation(facing: Vec3) -> Option<Quat> {
    let x = Vec3::Y.cross(facing).try_normalize()?;
    let y = facing.cross(x);
    Some(Quat::from_mat3(&Mat3::from_cols(x, y, facing)))
}

/// The three ghosts haunting the graveyard.
pub fn haunting() -> Vec<Ghost> {
    vec![
        Ghost::new("ghost-1", rgb(0xff00ff), GhostPath::Inner),
        Ghost::new("ghost-2", rgb(0x00ffff), GhostPath::Middle),
        Ghost::new("ghost-3", rgb(0xff7800), GhostPath::Outer),
    ]
}
