//! Haunted house scene runtime.
//!
//! The crate assembles a small night-time graveyard, flies point-light ghosts
//! around it and drives a keyboard-controlled character whose animation
//! cross-fades between idle, walk and run. Everything except the wgpu
//! renderer is plain simulation state, so it can be driven headless from
//! tests, the CLI summary mode or the browser.

pub mod animation;
pub mod camera;
pub mod character;
pub mod data_model;
pub mod galaxy;
pub mod ghosts;
pub mod input;
pub mod render;
pub mod scene;
#[cfg(target_arch = "wasm32")]
pub mod web;
pub mod world;

pub use animation::{AnimationClip, AnimationDriver, AnimationMixer, ClipId};
pub use camera::{CameraRig, OrbitCamera};
pub use character::{
    AnimationClipMap, AnimationState, CharacterControls, ControlsConfig, ControlsError, Transform,
};
pub use data_model::DataModel;
pub use galaxy::{Galaxy, GalaxyPanel, GalaxyParameters, TweakError};
pub use ghosts::{Ghost, GhostPath};
pub use input::{InputLatch, InputState, KeyCode, MouseButton, NamedKey};
pub use render::{CameraParams, LightingParams, Mesh};
#[cfg(not(target_arch = "wasm32"))]
pub use render::Renderer;
pub use scene::{Fog, GraveyardLayout, Light, LightKind, Scene, SceneObject, Shape};
pub use world::World;
