//! Spiral galaxy particle effect and the debug panel that tunes it.

use std::f32::consts::TAU;

use glam::Vec3;
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scene::{parse_hex_color, rgb};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TweakError {
    #[error("unknown galaxy parameter {0:?}")]
    UnknownParameter(String),
    #[error("{name} must lie in {min}..={max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("invalid colour {0:?}, expected #rrggbb")]
    InvalidColor(String),
}

/// Range of a numeric panel control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slider {
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

const fn slider(name: &'static str, min: f32, max: f32, step: f32) -> Slider {
    Slider {
        name,
        min,
        max,
        step,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalaxyParameters {
    pub count: u32,
    pub size: f32,
    pub radius: f32,
    pub branches: u32,
    /// Extra rotation per unit of radius, giving the arms their curl.
    pub spin: f32,
    pub randomness: f32,
    /// Exponent biasing scatter towards the arm centre line.
    pub randomness_power: f32,
    pub inside_color: Vec3,
    pub outside_color: Vec3,
}

impl Default for GalaxyParameters {
    fn default() -> Self {
        Self {
            count: 100_000,
            size: 0.01,
            radius: 5.0,
            branches: 3,
            spin: 1.0,
            randomness: 0.2,
            randomness_power: 3.0,
            inside_color: rgb(0xff6030),
            outside_color: rgb(0x1b3984),
        }
    }
}

impl GalaxyParameters {
    pub const SLIDERS: [Slider; 7] = [
        slider("count", 100.0, 1_000_000.0, 100.0),
        slider("size", 0.001, 0.1, 0.001),
        slider("radius", 0.01, 20.0, 0.01),
        slider("branches", 2.0, 20.0, 1.0),
        slider("spin", -5.0, 5.0, 0.001),
        slider("randomness", 0.0, 2.0, 0.001),
        slider("randomness_power", 1.0, 10.0, 0.001),
    ];

    pub fn slider(name: &str) -> Option<&'static Slider> {
        Self::SLIDERS.iter().find(|slider| slider.name == name)
    }

    /// Sets a numeric parameter after checking it against its slider range.
    pub fn set(&mut self, name: &str, value: f32) -> Result<(), TweakError> {
        let slider =
            Self::slider(name).ok_or_else(|| TweakError::UnknownParameter(name.to_string()))?;
        if !value.is_finite() || value < slider.min || value > slider.max {
            return Err(TweakError::OutOfRange {
                name: slider.name,
                value,
                min: slider.min,
                max: slider.max,
            });
        }
        match slider.name {
            "count" => self.count = value.round() as u32,
            "size" => self.size = value,
            "radius" => self.radius = value,
            "branches" => self.branches = value.round() as u32,
            "spin" => self.spin = value,
            "randomness" => self.randomness = value,
            _ => self.randomness_power = value,
        }
        Ok(())
    }

    /// Sets `inside_color` or `outside_color` from `#rrggbb` notation.
    pub fn set_color(&mut self, name: &str, hex: &str) -> Result<(), TweakError> {
        let color = parse_hex_color(hex).ok_or_else(|| TweakError::InvalidColor(hex.to_string()))?;
        match name {
            "inside_color" => self.inside_color = color,
            "outside_color" => self.outside_color = color,
            other => return Err(TweakError::UnknownParameter(other.to_string())),
        }
        Ok(())
    }
}

/// Generated point cloud; positions and colours are parallel arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct Galaxy {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    pub size: f32,
}

impl Galaxy {
    pub fn generate(params: &GalaxyParameters, rng: &mut impl Rng) -> Self {
        let count = params.count as usize;
        let branches = params.branches.max(1);
        let mut positions = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);

        for i in 0..count {
            let radius = rng.random::<f32>() * params.radius;
            let spin_angle = radius * params.spin;
            let branch_angle = (i as u32 % branches) as f32 / branches as f32 * TAU;
            let angle = branch_angle + spin_angle;

            let scatter = Vec3::new(
                scatter(rng, params, radius),
                scatter(rng, params, radius),
                scatter(rng, params, radius),
            );
            positions.push(Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius) + scatter);

            let mix = if params.radius > 0.0 {
                radius / params.radius
            } else {
                0.0
            };
            colors.push(params.inside_color.lerp(params.outside_color, mix));
        }

        Self {
            positions,
            colors,
            size: params.size,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Largest horizontal distance of any point from the centre.
    pub fn extent(&self) -> f32 {
        self.positions
            .iter()
            .map(|p| Vec3::new(p.x, 0.0, p.z).length())
            .fold(0.0, f32::max)
    }
}

fn scatter(rng: &mut impl Rng, params: &GalaxyParameters, radius: f32) -> f32 {
    let sign = if rng.random::<bool>() { 1.0 } else { -1.0 };
    rng.random::<f32>().powf(params.randomness_power) * sign * params.randomness * radius
}

/// Live-tuning panel: every accepted tweak throws the old points away and
/// regenerates the galaxy.
#[derive(Debug)]
pub struct GalaxyPanel {
    params: GalaxyParameters,
    rng: ChaCha8Rng,
    galaxy: Option<Galaxy>,
    generation: u64,
}

impl GalaxyPanel {
    pub fn new(params: GalaxyParameters, seed: u64) -> Self {
        let mut panel = Self {
            params,
            rng: ChaCha8Rng::seed_from_u64(seed),
            galaxy: None,
            generation: 0,
        };
        panel.regenerate();
        panel
    }

    pub fn params(&self) -> &GalaxyParameters {
        &self.params
    }

    pub fn galaxy(&self) -> Option<&Galaxy> {
        self.galaxy.as_ref()
    }

    /// Number of galaxies built so far, including the initial one.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn tweak(&mut self, name: &str, value: f32) -> Result<(), TweakError> {
        self.params.set(name, value)?;
        self.regenerate();
        Ok(())
    }

    pub fn tweak_color(&mut self, name: &str, hex: &str) -> Result<(), TweakError> {
        self.params.set_color(name, hex)?;
        self.regenerate();
        Ok(())
    }

    pub fn regenerate(&mut self) {
        if let Some(old) = self.galaxy.take() {
            debug!("disposing galaxy #{} ({} points)", self.generation, old.len());
        }
        let galaxy = Galaxy::generate(&self.params, &mut self.rng);
        self.generation += 1;
        debug!("generated galaxy #{} ({} points)", self.generation, galaxy.len());
        self.galaxy = Some(galaxy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> GalaxyParameters {
        GalaxyParameters {
            count: 600,
            ..GalaxyParameters::default()
        }
    }

    #[test]
    fn generated_points_stay_near_the_disc() {
        let params = small();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let galaxy = Galaxy::generate(&params, &mut rng);
        assert_eq!(galaxy.len(), 600);
        assert_eq!(galaxy.colors.len(), 600);
        let limit = params.radius * (1.0 + params.randomness * 3f32.sqrt());
        for p in &galaxy.positions {
            assert!(p.length() <= limit + 1e-4, "{p}");
        }
    }

    #[test]
    fn zero_randomness_puts_points_on_the_arms() {
        let params = GalaxyParameters {
            count: 90,
            branches: 3,
            spin: 0.0,
            randomness: 0.0,
            ..GalaxyParameters::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let galaxy = Galaxy::generate(&params, &mut rng);
        for (i, p) in galaxy.positions.iter().enumerate() {
            assert_eq!(p.y, 0.0);
            let expected = (i % 3) as f32 / 3.0 * TAU;
            let direction = Vec3::new(expected.cos(), 0.0, expected.sin());
            assert!(p.cross(direction).length() < 1e-4);
        }
    }

    #[test]
    fn colours_blend_from_inside_to_outside() {
        let params = small();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let galaxy = Galaxy::generate(&params, &mut rng);
        for color in &galaxy.colors {
            for channel in 0..3 {
                let lo = params.inside_color[channel].min(params.outside_color[channel]);
                let hi = params.inside_color[channel].max(params.outside_color[channel]);
                assert!(color[channel] >= lo - 1e-5 && color[channel] <= hi + 1e-5);
            }
        }
    }

    #[test]
    fn out_of_range_tweak_is_rejected_and_keeps_galaxy() {
        let mut panel = GalaxyPanel::new(small(), 9);
        let err = panel.tweak("branches", 1.0).unwrap_err();
        assert!(matches!(err, TweakError::OutOfRange { name: "branches", .. }));
        assert_eq!(panel.generation(), 1);
        assert_eq!(panel.params().branches, 3);
        assert!(panel.tweak("spin", f32::NAN).is_err());
    }

    #[test]
    fn unknown_parameter_is_rejected() {
        let mut panel = GalaxyPanel::new(small(), 9);
        assert_eq!(
            panel.tweak("wobble", 1.0),
            Err(TweakError::UnknownParameter("wobble".to_string()))
        );
        assert!(matches!(
            panel.tweak_color("inside_color", "red"),
            Err(TweakError::InvalidColor(_))
        ));
    }

    #[test]
    fn tweak_regenerates_with_new_parameters() {
        let mut panel = GalaxyPanel::new(small(), 9);
        panel.tweak("count", 250.0).unwrap();
        assert_eq!(panel.generation(), 2);
        assert_eq!(panel.galaxy().unwrap().len(), 250);

        panel.tweak_color("outside_color", "#ffffff").unwrap();
        assert_eq!(panel.params().outside_color, Vec3::ONE);
        assert_eq!(panel.generation(), 3);
    }

    #[test]
    fn same_seed_gives_same_galaxy() {
        let a = GalaxyPanel::new(small(), 42);
        let b = GalaxyPanel::new(small(), 42);
        assert_eq!(a.galaxy(), b.galaxy());
    }
}
