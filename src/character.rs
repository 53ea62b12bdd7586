//! Third-person locomotion for the player character.
//!
//! Every frame [`CharacterControls::update`] picks one of three animation
//! states from the held movement keys, cross-fades the clips, turns the
//! character towards the camera-relative heading and moves it (and the
//! camera) across the ground plane.

use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use std::fmt;
use std::str::FromStr;

use glam::{Quat, Vec3};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animation::{AnimationDriver, ClipId};
use crate::camera::CameraRig;
use crate::input::{InputLatch, KeyCode};

pub const FORWARD_KEY: KeyCode = KeyCode::Character('W');
pub const BACK_KEY: KeyCode = KeyCode::Character('S');
pub const LEFT_KEY: KeyCode = KeyCode::Character('A');
pub const RIGHT_KEY: KeyCode = KeyCode::Character('D');
pub const DIRECTION_KEYS: [KeyCode; 4] = [FORWARD_KEY, LEFT_KEY, BACK_KEY, RIGHT_KEY];

/// Errors raised when the controller is misused.
#[derive(Debug, Error, PartialEq)]
pub enum ControlsError {
    #[error("no animation clip registered for the {0} state")]
    MissingClip(AnimationState),
    #[error("frame delta must be finite and non-negative, got {0}")]
    InvalidDelta(f32),
    #[error("unknown animation state {0:?} (expected Idle, Walk or Run)")]
    UnknownState(String),
}

/// Animation the character is currently playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationState {
    Idle,
    Walk,
    Run,
}

impl AnimationState {
    pub const ALL: [Self; 3] = [Self::Idle, Self::Walk, Self::Run];

    /// State for the given input: Idle when no movement key is held,
    /// otherwise Run or Walk depending on the run toggle.
    pub fn select(moving: bool, run_toggle: bool) -> Self {
        match (moving, run_toggle) {
            (true, true) => Self::Run,
            (true, false) => Self::Walk,
            (false, _) => Self::Idle,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Walk => "Walk",
            Self::Run => "Run",
        }
    }

    pub fn is_moving(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl fmt::Display for AnimationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnimationState {
    type Err = ControlsError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.name() == name)
            .ok_or_else(|| ControlsError::UnknownState(name.to_string()))
    }
}

/// Clip handle for each animation state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationClipMap {
    clips: HashMap<AnimationState, ClipId>,
}

impl AnimationClipMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, state: AnimationState, clip: ClipId) -> Option<ClipId> {
        self.clips.insert(state, clip)
    }

    pub fn get(&self, state: AnimationState) -> Option<ClipId> {
        self.clips.get(&state).copied()
    }

    pub fn require(&self, state: AnimationState) -> Result<ClipId, ControlsError> {
        self.get(state).ok_or(ControlsError::MissingClip(state))
    }

    /// Fails with the first state, in Idle/Walk/Run order, that has no clip.
    pub fn validate(&self) -> Result<(), ControlsError> {
        AnimationState::ALL
            .into_iter()
            .try_for_each(|state| self.require(state).map(|_| ()))
    }
}

impl FromIterator<(AnimationState, ClipId)> for AnimationClipMap {
    fn from_iter<I: IntoIterator<Item = (AnimationState, ClipId)>>(iter: I) -> Self {
        Self {
            clips: iter.into_iter().collect(),
        }
    }
}

/// Position and orientation of a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

/// Tuning constants for [`CharacterControls`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Seconds spent cross-fading between two clips.
    pub fade_duration: f32,
    /// Units per second while running.
    pub run_velocity: f32,
    /// Units per second while walking.
    pub walk_velocity: f32,
    /// Largest turn, in radians, applied to the character in one frame.
    pub rotation_step: f32,
    /// Height of the camera orbit pivot above the character origin.
    pub target_height: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            fade_duration: 0.2,
            run_velocity: 5.0,
            walk_velocity: 2.0,
            rotation_step: 0.2,
            target_height: 1.0,
        }
    }
}

/// True when any of the four movement keys is held.
pub fn is_moving(input: &InputLatch) -> bool {
    DIRECTION_KEYS.iter().any(|key| input.is_held(*key))
}

/// Heading bias, in radians, for the held movement keys (0 is forward,
/// positive turns left).
///
/// Forward wins over back when both are held and left wins over right, so
/// every combination resolves to one of eight headings.
pub fn direction_offset(input: &InputLatch) -> f32 {
    let left = input.is_held(LEFT_KEY);
    let right = input.is_held(RIGHT_KEY);
    if input.is_held(FORWARD_KEY) {
        if left {
            FRAC_PI_4
        } else if right {
            -FRAC_PI_4
        } else {
            0.0
        }
    } else if input.is_held(BACK_KEY) {
        if left {
            FRAC_PI_4 + FRAC_PI_2
        } else if right {
            -FRAC_PI_4 - FRAC_PI_2
        } else {
            PI
        }
    } else if left {
        FRAC_PI_2
    } else if right {
        -FRAC_PI_2
    } else {
        0.0
    }
}

/// Keyboard-driven character with Idle/Walk/Run clip blending.
#[derive(Debug)]
pub struct CharacterControls<D> {
    model: Transform,
    mixer: D,
    clips: AnimationClipMap,
    config: ControlsConfig,
    run_toggle: bool,
    current: AnimationState,
}

impl<D: AnimationDriver> CharacterControls<D> {
    /// Starts the `initial` clip and anchors the camera pivot above the
    /// character.
    pub fn new(
        model: Transform,
        mixer: D,
        clips: AnimationClipMap,
        camera: &mut impl CameraRig,
        initial: AnimationState,
    ) -> Result<Self, ControlsError> {
        Self::with_config(model, mixer, clips, camera, initial, ControlsConfig::default())
    }

    pub fn with_config(
        model: Transform,
        mut mixer: D,
        clips: AnimationClipMap,
        camera: &mut impl CameraRig,
        initial: AnimationState,
        config: ControlsConfig,
    ) -> Result<Self, ControlsError> {
        clips.validate()?;
        mixer.play(clips.require(initial)?);
        let controls = Self {
            model,
            mixer,
            clips,
            config,
            run_toggle: true,
            current: initial,
        };
        controls.update_camera_target(Vec3::ZERO, camera);
        Ok(controls)
    }

    pub fn switch_run_toggle(&mut self) {
        self.run_toggle = !self.run_toggle;
    }

    pub fn run_toggle(&self) -> bool {
        self.run_toggle
    }

    pub fn current_state(&self) -> AnimationState {
        self.current
    }

    pub fn model(&self) -> &Transform {
        &self.model
    }

    pub fn mixer(&self) -> &D {
        &self.mixer
    }

    pub fn config(&self) -> &ControlsConfig {
        &self.config
    }

    /// Runs one frame of locomotion.
    ///
    /// A zero `delta` still resolves the animation state but leaves the
    /// character and camera where they are.
    pub fn update(
        &mut self,
        delta: f32,
        input: &InputLatch,
        camera: &mut impl CameraRig,
    ) -> Result<(), ControlsError> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(ControlsError::InvalidDelta(delta));
        }

        let play = AnimationState::select(is_moving(input), self.run_toggle);
        if play != self.current {
            self.cross_fade(play)?;
        }

        self.mixer.advance(delta);

        if self.current.is_moving() && delta > 0.0 {
            self.move_character(delta, input, camera);
        }
        Ok(())
    }

    fn cross_fade(&mut self, play: AnimationState) -> Result<(), ControlsError> {
        let to_play = self.clips.require(play)?;
        let current = self.clips.require(self.current)?;
        let fade = self.config.fade_duration;

        self.mixer.fade_out(current, fade);
        self.mixer.reset(to_play);
        self.mixer.fade_in(to_play, fade);
        self.mixer.play(to_play);

        debug!("character animation {} -> {}", self.current, play);
        self.current = play;
        Ok(())
    }

    fn move_character(&mut self, delta: f32, input: &InputLatch, camera: &mut impl CameraRig) {
        let camera_position = camera.position();
        let camera_yaw = (camera_position.x - self.model.position.x)
            .atan2(camera_position.z - self.model.position.z);
        let offset = direction_offset(input);

        let heading = Quat::from_axis_angle(Vec3::Y, camera_yaw + offset + PI);
        self.model.rotation = rotate_towards(self.model.rotation, heading, self.config.rotation_step);

        let mut walk_direction = camera.forward();
        walk_direction.y = 0.0;
        let walk_direction =
            Quat::from_axis_angle(Vec3::Y, offset) * walk_direction.normalize_or_zero();

        let velocity = match self.current {
            AnimationState::Run => self.config.run_velocity,
            _ => self.config.walk_velocity,
        };
        let displacement = Vec3::new(
            walk_direction.x * velocity * delta,
            0.0,
            walk_direction.z * velocity * delta,
        );
        self.model.position += displacement;
        self.update_camera_target(displacement, camera);
    }

    fn update_camera_target(&self, displacement: Vec3, camera: &mut impl CameraRig) {
        camera.translate(Vec3::new(displacement.x, 0.0, displacement.z));
        let position = self.model.position;
        camera.set_target(Vec3::new(
            position.x,
            position.y + self.config.target_height,
            position.z,
        ));
    }
}

/// Turns `from` towards `to` by at most `max_angle` radians.
pub fn rotate_towards(from: Quat, to: Quat, max_angle: f32) -> Quat {
    let angle = from.angle_between(to);
    if angle <= f32::EPSILON {
        return from;
    }
    let t = (max_angle / angle).min(1.0);
    from.slerp(to, t).normalize()
}
