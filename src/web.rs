#![cfg(target_arch = "wasm32")]

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

use crate::input::{InputState, KeyCode};
use crate::scene::{GraveyardLayout, Scene};
use crate::world::World;

#[wasm_bindgen(start)]
pub fn init_logging() {
    console_error_panic_hook::set_once();
}

/// Browser handle on the haunted house simulation.
///
/// The page forwards `keydown`/`keyup` events by `KeyboardEvent.key` and calls
/// [`WebHauntedHouse::tick`] from its animation frame callback.
#[wasm_bindgen]
pub struct WebHauntedHouse {
    world: World,
    input: InputState,
}

#[wasm_bindgen]
impl WebHauntedHouse {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u32) -> Result<WebHauntedHouse, JsValue> {
        let scene = Scene::haunted_house(GraveyardLayout {
            seed: u64::from(seed),
            ..GraveyardLayout::default()
        });
        let mut world = World::new(scene, u64::from(seed));
        world
            .spawn_default_character()
            .map_err(|err| JsValue::from_str(&format!("failed to spawn character: {err}")))?;
        Ok(Self {
            world,
            input: InputState::new(),
        })
    }

    /// Returns false for key names the runtime does not know.
    pub fn key_down(&mut self, name: &str) -> bool {
        let Some(key) = KeyCode::from_name(name) else {
            return false;
        };
        if self.input.set_key_down(key) {
            self.world.handle_key_press(key);
        }
        true
    }

    pub fn key_up(&mut self, name: &str) -> bool {
        let Some(key) = KeyCode::from_name(name) else {
            return false;
        };
        self.input.set_key_up(key);
        true
    }

    pub fn tick(&mut self, delta: f32) -> Result<(), JsValue> {
        self.world
            .tick(delta, &self.input)
            .map_err(|err| JsValue::from_str(&err.to_string()))
    }

    /// `[x, y, z]` of the character.
    pub fn character_position(&self) -> Float32Array {
        let position = self.world.character_position().unwrap_or_default();
        Float32Array::from(position.to_array().as_slice())
    }

    /// Flat `[x, y, z, x, y, z, ...]` list, one triple per ghost.
    pub fn ghost_positions(&self) -> Float32Array {
        let flat: Vec<f32> = self
            .world
            .ghost_positions()
            .iter()
            .flat_map(|position| position.to_array())
            .collect();
        Float32Array::from(flat.as_slice())
    }

    pub fn current_state(&self) -> Option<String> {
        self.world.current_state().map(|state| state.to_string())
    }

    pub fn tweak_galaxy(&mut self, name: &str, value: f32) -> Result<(), JsValue> {
        self.world
            .galaxy_mut()
            .tweak(name, value)
            .map_err(|err| JsValue::from_str(&err.to_string()))
    }

    pub fn tweak_galaxy_color(&mut self, name: &str, hex: &str) -> Result<(), JsValue> {
        self.world
            .galaxy_mut()
            .tweak_color(name, hex)
            .map_err(|err| JsValue::from_str(&err.to_string()))
    }

    pub fn galaxy_point_count(&self) -> u32 {
        self.world.galaxy().galaxy().map_or(0, |g| g.len() as u32)
    }
}
