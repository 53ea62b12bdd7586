//! Per-frame driver tying scene, ghosts, camera and character together.

use glam::Vec3;
use log::{debug, info};

use crate::animation::{AnimationClip, AnimationMixer};
use crate::camera::OrbitCamera;
use crate::character::{
    AnimationClipMap, AnimationState, CharacterControls, ControlsError, Transform,
};
use crate::data_model::DataModel;
use crate::galaxy::GalaxyPanel;
use crate::ghosts::{self, Ghost};
use crate::input::{InputState, KeyCode};
use crate::render::LightingParams;
use crate::scene::{Light, Scene, SceneObject, Shape};

pub const CHARACTER_NAME: &str = "character";
const PAUSE_KEY: KeyCode = KeyCode::Character('P');

/// Where the character appears when spawned with [`World::spawn_default_character`].
pub const CHARACTER_SPAWN: Vec3 = Vec3::new(0.0, 0.0, 4.0);

pub struct World {
    scene: Scene,
    model: DataModel,
    ghosts: Vec<Ghost>,
    camera: OrbitCamera,
    character: Option<CharacterControls<AnimationMixer>>,
    galaxy: GalaxyPanel,
    elapsed: f32,
    paused: bool,
    viewport_height: f32,
}

impl World {
    pub fn new(scene: Scene, seed: u64) -> Self {
        let ghosts = ghosts::haunting();
        let model = DataModel::from_objects(scene.objects.clone());
        for ghost in &ghosts {
            model.insert(ghost_body(ghost));
        }
        let galaxy = GalaxyPanel::new(scene.galaxy, seed);
        info!(
            "world ready: {} objects, {} ghosts, {} galaxy points",
            model.len(),
            ghosts.len(),
            galaxy.galaxy().map_or(0, |g| g.len())
        );
        Self {
            scene,
            model,
            ghosts,
            camera: OrbitCamera::default(),
            character: None,
            galaxy,
            elapsed: 0.0,
            paused: false,
            viewport_height: 720.0,
        }
    }

    /// Attaches a controllable character; the camera pivot jumps to it.
    pub fn spawn_character(
        &mut self,
        model: Transform,
        mixer: AnimationMixer,
        clips: AnimationClipMap,
        initial: AnimationState,
    ) -> Result<(), ControlsError> {
        let controls = CharacterControls::with_config(
            model,
            mixer,
            clips,
            &mut self.camera,
            initial,
            self.scene.controls,
        )?;
        self.model.remove_by_type(CHARACTER_NAME);
        self.model.insert(SceneObject {
            name: CHARACTER_NAME.to_string(),
            object_type: CHARACTER_NAME.to_string(),
            shape: Shape::Box,
            color: Vec3::new(0.85, 0.8, 0.7),
            position: model.position,
            rotation: model.rotation,
            scale: Vec3::new(0.4, 1.8, 0.4),
            cast_shadow: true,
        });
        debug!("character spawned at {} in state {}", model.position, initial);
        self.character = Some(controls);
        Ok(())
    }

    /// Spawns the character in front of the door with the built-in clips.
    pub fn spawn_default_character(&mut self) -> Result<(), ControlsError> {
        let (mixer, clips) = default_character_rig();
        self.spawn_character(
            Transform::from_position(CHARACTER_SPAWN),
            mixer,
            clips,
            AnimationState::Idle,
        )
    }

    /// Advances the world by `delta` seconds of wall time.
    pub fn tick(&mut self, delta: f32, input: &InputState) -> Result<(), ControlsError> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(ControlsError::InvalidDelta(delta));
        }

        if self.paused {
            return Ok(());
        }

        self.elapsed += delta;
        for ghost in &mut self.ghosts {
            ghost.update(self.elapsed);
            self.model.update(&ghost.name, |body| {
                body.position = ghost.position();
                body.rotation = ghost.rotation();
            });
        }

        if let Some(controls) = self.character.as_mut() {
            controls.update(delta, &input.latch(), &mut self.camera)?;
            self.model.set_transform(CHARACTER_NAME, controls.model());
        }

        self.camera.orbit(input.take_drag_delta(), self.viewport_height);
        self.camera.zoom(input.take_scroll());
        self.camera.update();
        Ok(())
    }

    /// Handles discrete key presses; auto-repeat should be filtered out by
    /// the caller.
    pub fn handle_key_press(&mut self, key: KeyCode) {
        if key.is_shift() {
            if let Some(controls) = self.character.as_mut() {
                controls.switch_run_toggle();
                debug!("run toggle now {}", controls.run_toggle());
            }
        } else if key == PAUSE_KEY {
            self.paused = !self.paused;
            info!("{}", if self.paused { "paused" } else { "resumed" });
        }
    }

    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = height;
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn objects(&self) -> Vec<SceneObject> {
        self.model.all_objects()
    }

    pub fn data_model(&self) -> &DataModel {
        &self.model
    }

    /// Static scene lights followed by one point light per ghost.
    pub fn lights(&self) -> Vec<Light> {
        let mut lights = self.scene.lights.clone();
        lights.extend(self.ghosts.iter().map(Ghost::light));
        lights
    }

    pub fn lighting(&self) -> LightingParams {
        LightingParams::from_scene(&self.lights(), &self.scene.fog)
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn ghost_positions(&self) -> Vec<Vec3> {
        self.ghosts.iter().map(Ghost::position).collect()
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn character(&self) -> Option<&CharacterControls<AnimationMixer>> {
        self.character.as_ref()
    }

    pub fn character_position(&self) -> Option<Vec3> {
        self.character.as_ref().map(|c| c.model().position)
    }

    pub fn current_state(&self) -> Option<AnimationState> {
        self.character.as_ref().map(|c| c.current_state())
    }

    pub fn galaxy(&self) -> &GalaxyPanel {
        &self.galaxy
    }

    pub fn galaxy_mut(&mut self) -> &mut GalaxyPanel {
        &mut self.galaxy
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

/// Mixer and clip table for the placeholder character.
pub fn default_character_rig() -> (AnimationMixer, AnimationClipMap) {
    let mut mixer = AnimationMixer::new();
    let clips = [
        (AnimationState::Idle, 2.0),
        (AnimationState::Walk, 1.0),
        (AnimationState::Run, 0.7),
    ]
    .into_iter()
    .map(|(state, duration)| (state, mixer.add_clip(AnimationClip::new(state.name(), duration))))
    .collect();
    (mixer, clips)
}

fn ghost_body(ghost: &Ghost) -> SceneObject {
    SceneObject {
        name: ghost.name.clone(),
        object_type: "ghost".to_string(),
        shape: Shape::Sphere,
        color: ghost.light.color,
        position: ghost.position(),
        rotation: ghost.rotation(),
        scale: Vec3::splat(0.2),
        cast_shadow: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::GalaxyParameters;
    use crate::input::NamedKey;
    use crate::scene::GraveyardLayout;

    const FRAME: f32 = 1.0 / 60.0;

    fn world() -> World {
        let mut scene = Scene::haunted_house(GraveyardLayout::default());
        scene.galaxy = GalaxyParameters {
            count: 200,
            ..GalaxyParameters::default()
        };
        let mut world = World::new(scene, 1);
        world.spawn_default_character().unwrap();
        world
    }

    #[test]
    fn spawn_anchors_camera_above_character() {
        let world = world();
        assert_eq!(world.camera().target, CHARACTER_SPAWN + Vec3::Y);
        assert_eq!(world.current_state(), Some(AnimationState::Idle));
        assert!(world.data_model().get(CHARACTER_NAME).is_some());
    }

    #[test]
    fn ticking_moves_ghosts_and_their_bodies() {
        let mut world = world();
        let input = InputState::new();
        let before = world.ghost_positions();
        for _ in 0..30 {
            world.tick(FRAME, &input).unwrap();
        }
        let after = world.ghost_positions();
        assert!(before.iter().zip(&after).all(|(a, b)| a != b));
        let body = world.data_model().get("ghost-1").unwrap();
        assert_eq!(body.position, after[0]);
        assert!((world.elapsed() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn holding_forward_runs_the_character() {
        let mut world = world();
        let input = InputState::new();
        input.set_key_down(KeyCode::Character('W'));
        for _ in 0..60 {
            world.tick(FRAME, &input).unwrap();
        }
        assert_eq!(world.current_state(), Some(AnimationState::Run));
        let moved = world.character_position().unwrap() - CHARACTER_SPAWN;
        assert!((moved.length() - 5.0).abs() < 0.2, "{moved}");
        assert_eq!(
            world.data_model().get(CHARACTER_NAME).unwrap().position,
            world.character_position().unwrap()
        );
    }

    #[test]
    fn shift_switches_between_run_and_walk() {
        let mut world = world();
        let input = InputState::new();
        input.set_key_down(KeyCode::Character('D'));
        world.handle_key_press(KeyCode::Named(NamedKey::LeftShift));
        world.tick(FRAME, &input).unwrap();
        assert_eq!(world.current_state(), Some(AnimationState::Walk));
        world.handle_key_press(KeyCode::Named(NamedKey::RightShift));
        world.tick(FRAME, &input).unwrap();
        assert_eq!(world.current_state(), Some(AnimationState::Run));
    }

    #[test]
    fn pause_freezes_ghosts_and_character() {
        let mut world = world();
        let input = InputState::new();
        input.set_key_down(KeyCode::Character('W'));
        world.handle_key_press(KeyCode::Character('P'));
        let ghosts = world.ghost_positions();
        world.tick(0.5, &input).unwrap();
        assert!(world.is_paused());
        assert_eq!(world.ghost_positions(), ghosts);
        assert_eq!(world.character_position(), Some(CHARACTER_SPAWN));
        assert_eq!(world.elapsed(), 0.0);
    }

    #[test]
    fn negative_delta_is_rejected() {
        let mut world = world();
        let input = InputState::new();
        assert_eq!(
            world.tick(-0.1, &input),
            Err(ControlsError::InvalidDelta(-0.1))
        );
        assert_eq!(world.elapsed(), 0.0);
    }

    #[test]
    fn lighting_includes_door_and_ghost_lights() {
        let world = world();
        let lighting = world.lighting();
        assert_eq!(lighting.points.len(), 4);
        assert!(lighting.ambient.length() > 0.0);
        assert_eq!(lighting.fog_far, 15.0);
    }

    #[test]
    fn world_without_character_still_ticks() {
        let mut world = World::new(
            Scene {
                galaxy: GalaxyParameters {
                    count: 100,
                    ..GalaxyParameters::default()
                },
                ..Scene::default()
            },
            3,
        );
        world.handle_key_press(KeyCode::Named(NamedKey::LeftShift));
        world.tick(FRAME, &InputState::new()).unwrap();
        assert_eq!(world.character_position(), None);
    }
}
