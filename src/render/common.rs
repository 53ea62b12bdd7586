use glam::{Mat4, Vec3};

use crate::scene::{Fog, Light, LightKind};

/// Upper bound on point lights uploaded per frame; extra lights are ignored.
pub const MAX_POINT_LIGHTS: usize = 8;

/// Camera parameters consumed by the renderer's uniform buffer.
#[derive(Clone, Debug)]
pub struct CameraParams {
    pub view_proj: Mat4,
    pub position: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLightParams {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub range: f32,
}

/// Lighting and fog state consumed by the renderer's uniform buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct LightingParams {
    pub ambient: Vec3,
    /// Unit vector pointing from the scene towards the directional light.
    pub sun_direction: Vec3,
    pub sun_color: Vec3,
    pub points: Vec<PointLightParams>,
    pub fog_color: Vec3,
    pub fog_near: f32,
    pub fog_far: f32,
}

impl LightingParams {
    /// Folds the scene's light list into what the shader understands: summed
    /// ambient, the first directional light and up to [`MAX_POINT_LIGHTS`]
    /// point lights.
    pub fn from_scene(lights: &[Light], fog: &Fog) -> Self {
        let ambient = lights
            .iter()
            .filter(|light| matches!(light.kind, LightKind::Ambient))
            .map(|light| light.color * light.intensity)
            .fold(Vec3::ZERO, |acc, color| acc + color);

        let (sun_direction, sun_color) = lights
            .iter()
            .find(|light| matches!(light.kind, LightKind::Directional))
            .map(|light| {
                (
                    light.position.normalize_or_zero(),
                    light.color * light.intensity,
                )
            })
            .unwrap_or((Vec3::Y, Vec3::ZERO));

        let points = lights
            .iter()
            .filter_map(|light| match light.kind {
                LightKind::Point { distance } => Some(PointLightParams {
                    position: light.position,
                    color: light.color,
                    intensity: light.intensity,
                    range: distance,
                }),
                _ => None,
            })
            .take(MAX_POINT_LIGHTS)
            .collect();

        Self {
            ambient,
            sun_direction,
            sun_color,
            points,
            fog_color: fog.color,
            fog_near: fog.near,
            fog_far: fog.far,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(name: &str, x: f32) -> Light {
        Light {
            name: name.to_string(),
            kind: LightKind::Point { distance: 3.0 },
            position: Vec3::new(x, 1.0, 0.0),
            color: Vec3::ONE,
            intensity: 3.0,
            cast_shadow: true,
        }
    }

    #[test]
    fn folds_ambient_sun_and_points() {
        let lights = vec![
            Light {
                name: "ambient".to_string(),
                kind: LightKind::Ambient,
                position: Vec3::ZERO,
                color: Vec3::new(1.0, 0.5, 0.0),
                intensity: 0.5,
                cast_shadow: false,
            },
            Light {
                name: "moon".to_string(),
                kind: LightKind::Directional,
                position: Vec3::new(0.0, 5.0, 0.0),
                color: Vec3::ONE,
                intensity: 0.25,
                cast_shadow: true,
            },
            point("door", 0.0),
        ];
        let params = LightingParams::from_scene(&lights, &Fog::default());
        assert_eq!(params.ambient, Vec3::new(0.5, 0.25, 0.0));
        assert_eq!(params.sun_direction, Vec3::Y);
        assert_eq!(params.sun_color, Vec3::splat(0.25));
        assert_eq!(params.points.len(), 1);
        assert_eq!(params.points[0].range, 3.0);
    }

    #[test]
    fn point_lights_are_capped() {
        let lights: Vec<Light> = (0..12).map(|i| point("ghost", i as f32)).collect();
        let params = LightingParams::from_scene(&lights, &Fog::default());
        assert_eq!(params.points.len(), MAX_POINT_LIGHTS);
        assert_eq!(params.sun_color, Vec3::ZERO);
    }
}
