use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use anyhow::{anyhow, bail, Context, Result};
use glam::{EulerRot, Quat, Vec3};
use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::character::ControlsConfig;
use crate::galaxy::GalaxyParameters;

/// Runtime representation of the haunted house scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub lights: Vec<Light>,
    pub fog: Fog,
    pub clear_color: Vec3,
    pub graveyard: GraveyardLayout,
    pub controls: ControlsConfig,
    pub galaxy: GalaxyParameters,
}

impl Default for Scene {
    fn default() -> Self {
        Self::haunted_house(GraveyardLayout::default())
    }
}

impl Scene {
    /// Builds the house, the graveyard around it and the night lighting.
    pub fn haunted_house(graveyard: GraveyardLayout) -> Self {
        let mut objects = vec![floor()];
        objects.extend(house());
        objects.extend(graves(&graveyard));
        let fog = Fog::default();
        Self {
            objects,
            lights: night_lights(),
            clear_color: fog.color,
            fog,
            graveyard,
            controls: ControlsConfig::default(),
            galaxy: GalaxyParameters::default(),
        }
    }

    /// Parses a scene description and applies it on top of the default
    /// haunted house.
    ///
    /// Every block is optional: `<graves>`, `<fog>`, `<controls>` and
    /// `<galaxy>` override the defaults field by field, and each `<object>`
    /// is appended to the scene (objects of type `light` become point lights).
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let root = document.root_element();

        let graveyard = match child(&root, "graves") {
            Some(node) => parse_graveyard(&node).context("invalid <graves> block")?,
            None => GraveyardLayout::default(),
        };
        let mut scene = Self::haunted_house(graveyard);

        if let Some(node) = child(&root, "fog") {
            scene.fog = parse_fog(&node, scene.fog).context("invalid <fog> block")?;
            scene.clear_color = scene.fog.color;
        }
        if let Some(node) = child(&root, "controls") {
            scene.controls =
                parse_controls(&node, scene.controls).context("invalid <controls> block")?;
        }
        if let Some(node) = child(&root, "galaxy") {
            scene.galaxy = parse_galaxy(&node, scene.galaxy).context("invalid <galaxy> block")?;
        }

        for node in root.children().filter(|n| n.has_tag_name("object")) {
            let object = parse_object(&node)?;
            if object.object_type == "light" {
                scene.lights.push(Light {
                    name: object.name,
                    kind: LightKind::Point {
                        distance: parse_f32(optional_text(&node, "distance"), 0.0)?,
                    },
                    position: object.position,
                    color: object.color,
                    intensity: parse_f32(optional_text(&node, "intensity"), 1.0)?,
                    cast_shadow: false,
                });
            } else {
                scene.objects.push(object);
            }
        }

        info!(
            "scene description applied: {} objects, {} lights",
            scene.objects.len(),
            scene.lights.len()
        );
        Ok(scene)
    }

    /// Replaces the graves with a fresh layout.
    pub fn set_graveyard(&mut self, graveyard: GraveyardLayout) {
        self.objects.retain(|object| object.object_type != "grave");
        self.objects.extend(graves(&graveyard));
        self.graveyard = graveyard;
    }

    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.name == name)
    }
}

/// Primitive a scene object is drawn with; `scale` gives its dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Shape {
    /// Unit cube scaled to width, height and depth.
    #[default]
    Box,
    /// Cone of unit radius and height with the given number of sides.
    Cone { segments: u32 },
    /// Unit quad in the XY plane facing +Z.
    Plane,
    /// Sphere of unit radius.
    Sphere,
}

impl Shape {
    fn from_name(name: &str) -> Result<Self> {
        Ok(match name {
            "box" => Self::Box,
            "plane" => Self::Plane,
            "sphere" => Self::Sphere,
            "cone" => Self::Cone { segments: 16 },
            other => {
                if let Some(segments) = other.strip_prefix("cone") {
                    let segments = segments
                        .parse::<u32>()
                        .map_err(|err| anyhow!("invalid cone segment count: {err}"))?;
                    Self::Cone {
                        segments: segments.max(3),
                    }
                } else {
                    bail!("unknown shape {other:?}");
                }
            }
        })
    }
}

/// Drawable node of the scene graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(default)]
    pub shape: Shape,
    #[serde(default = "default_color")]
    pub color: Vec3,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default = "default_rotation")]
    pub rotation: Quat,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    #[serde(default)]
    pub cast_shadow: bool,
}

impl Default for SceneObject {
    fn default() -> Self {
        Self {
            name: String::new(),
            object_type: String::new(),
            shape: Shape::Box,
            color: default_color(),
            position: Vec3::ZERO,
            rotation: default_rotation(),
            scale: default_scale(),
            cast_shadow: false,
        }
    }
}

impl SceneObject {
    fn mesh(name: &str, object_type: &str, shape: Shape, color: Vec3) -> Self {
        Self {
            name: name.to_string(),
            object_type: object_type.to_string(),
            shape,
            color,
            ..Self::default()
        }
    }

    fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    fn scaled(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    fn rotated(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    fn shadowed(mut self) -> Self {
        self.cast_shadow = true;
        self
    }
}

fn default_color() -> Vec3 {
    Vec3::ONE
}

fn default_rotation() -> Quat {
    Quat::IDENTITY
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LightKind {
    Ambient,
    /// Shines from `position` towards the origin.
    Directional,
    Point { distance: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub name: String,
    pub kind: LightKind,
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub cast_shadow: bool,
}

/// Linear distance fog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fog {
    pub color: Vec3,
    pub near: f32,
    pub far: f32,
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            color: rgb(0x262837),
            near: 1.0,
            far: 15.0,
        }
    }
}

/// Placement of the graves scattered on a ring around the house.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraveyardLayout {
    pub count: usize,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub seed: u64,
}

impl Default for GraveyardLayout {
    fn default() -> Self {
        Self {
            count: 50,
            inner_radius: 3.0,
            outer_radius: 9.0,
            seed: 0x6057,
        }
    }
}

/// Converts a `0xRRGGBB` literal to linear 0..1 components.
pub fn rgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

/// Parses `#rrggbb` colour notation.
pub fn parse_hex_color(text: &str) -> Option<Vec3> {
    let digits = text.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    u32::from_str_radix(digits, 16).ok().map(rgb)
}

fn floor() -> SceneObject {
    SceneObject::mesh("floor", "floor", Shape::Plane, rgb(0xa9c388))
        .scaled(Vec3::new(20.0, 20.0, 1.0))
        .rotated(Quat::from_rotation_x(-FRAC_PI_2))
}

fn house() -> Vec<SceneObject> {
    let bush = |name: &str, size: f32, position: Vec3| {
        SceneObject::mesh(name, "bush", Shape::Sphere, rgb(0x89c854))
            .at(position)
            .scaled(Vec3::splat(size))
            .shadowed()
    };
    vec![
        SceneObject::mesh("walls", "house", Shape::Box, rgb(0xac8e82))
            .at(Vec3::new(0.0, 1.25, 0.0))
            .scaled(Vec3::new(4.0, 2.5, 4.0))
            .shadowed(),
        SceneObject::mesh("roof", "house", Shape::Cone { segments: 4 }, rgb(0xb35f45))
            .at(Vec3::new(0.0, 2.5 + 0.5, 0.0))
            .scaled(Vec3::new(3.5, 1.0, 3.5))
            .rotated(Quat::from_rotation_y(FRAC_PI_4)),
        SceneObject::mesh("door", "house", Shape::Plane, rgb(0xaa7b7b))
            .at(Vec3::new(0.0, 1.0, 2.0 + 0.01))
            .scaled(Vec3::new(2.0, 2.0, 1.0)),
        bush("bush-1", 0.5, Vec3::new(0.8, 0.2, 2.2)),
        bush("bush-2", 0.25, Vec3::new(1.4, 0.1, 2.1)),
        bush("bush-3", 0.4, Vec3::new(-0.8, 0.1, 2.2)),
        bush("bush-4", 0.15, Vec3::new(-1.0, 0.05, 2.6)),
    ]
}

fn graves(layout: &GraveyardLayout) -> Vec<SceneObject> {
    let mut rng = ChaCha8Rng::seed_from_u64(layout.seed);
    let span = layout.outer_radius - layout.inner_radius;
    (0..layout.count)
        .map(|index| {
            let angle = rng.random::<f32>() * TAU;
            let radius = layout.inner_radius + rng.random::<f32>() * span;
            let tilt_z = (rng.random::<f32>() - 0.5) * 0.4;
            let tilt_y = (rng.random::<f32>() - 0.5) * 0.4;
            SceneObject::mesh(&format!("grave-{index}"), "grave", Shape::Box, rgb(0x727272))
                .at(Vec3::new(angle.cos() * radius, 0.3, angle.sin() * radius))
                .scaled(Vec3::new(0.6, 0.8, 0.1))
                .rotated(Quat::from_euler(EulerRot::XYZ, 0.0, tilt_y, tilt_z))
                .shadowed()
        })
        .collect()
}

fn night_lights() -> Vec<Light> {
    vec![
        Light {
            name: "ambient".to_string(),
            kind: LightKind::Ambient,
            position: Vec3::ZERO,
            color: rgb(0xb9d5ff),
            intensity: 0.3,
            cast_shadow: false,
        },
        Light {
            name: "moon".to_string(),
            kind: LightKind::Directional,
            position: Vec3::new(4.0, 5.0, -2.0),
            color: rgb(0xb9d5ff),
            intensity: 0.12,
            cast_shadow: true,
        },
        Light {
            name: "door-light".to_string(),
            kind: LightKind::Point { distance: 7.0 },
            position: Vec3::new(0.0, 2.2, 2.7),
            color: rgb(0xff7d46),
            intensity: 1.0,
            cast_shadow: true,
        },
    ]
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(tag))
}

fn parse_object(node: &Node<'_, '_>) -> Result<SceneObject> {
    let name = required_text(node, "name")?;
    let mut object = SceneObject {
        object_type: optional_text(node, "type").unwrap_or_else(|| "mesh".to_string()),
        ..SceneObject::default()
    };
    if let Some(shape) = optional_text(node, "shape") {
        object.shape = Shape::from_name(&shape).with_context(|| format!("object {name}"))?;
    }
    object.color = parse_color(optional_text(node, "color"), object.color)?;
    object.position = parse_vec3(optional_text(node, "position"), object.position)?;
    let euler = parse_vec3(optional_text(node, "rotation"), Vec3::ZERO)?;
    object.rotation = Quat::from_euler(
        EulerRot::XYZ,
        euler.x.to_radians(),
        euler.y.to_radians(),
        euler.z.to_radians(),
    );
    object.scale = parse_vec3(optional_text(node, "scale"), object.scale)?;
    object.cast_shadow = parse_bool(optional_text(node, "shadow"), false)?;
    object.name = name;
    Ok(object)
}

fn parse_graveyard(node: &Node<'_, '_>) -> Result<GraveyardLayout> {
    let defaults = GraveyardLayout::default();
    let layout = GraveyardLayout {
        count: parse_number(optional_text(node, "count"), defaults.count)?,
        inner_radius: parse_f32(optional_text(node, "inner"), defaults.inner_radius)?,
        outer_radius: parse_f32(optional_text(node, "outer"), defaults.outer_radius)?,
        seed: parse_number(optional_text(node, "seed"), defaults.seed)?,
    };
    if !layout.inner_radius.is_finite()
        || !layout.outer_radius.is_finite()
        || layout.inner_radius < 0.0
        || layout.outer_radius < layout.inner_radius
    {
        bail!(
            "grave ring must satisfy 0 <= inner <= outer (got {} and {})",
            layout.inner_radius,
            layout.outer_radius
        );
    }
    Ok(layout)
}

fn parse_fog(node: &Node<'_, '_>, defaults: Fog) -> Result<Fog> {
    let fog = Fog {
        color: parse_color(optional_text(node, "color"), defaults.color)?,
        near: parse_f32(optional_text(node, "near"), defaults.near)?,
        far: parse_f32(optional_text(node, "far"), defaults.far)?,
    };
    if !fog.near.is_finite() || !fog.far.is_finite() {
        bail!("fog distances must be finite (got {} and {})", fog.near, fog.far);
    }
    if fog.far <= fog.near {
        bail!("fog far distance {} must exceed near distance {}", fog.far, fog.near);
    }
    Ok(fog)
}

fn parse_controls(node: &Node<'_, '_>, defaults: ControlsConfig) -> Result<ControlsConfig> {
    let controls = ControlsConfig {
        fade_duration: parse_f32(optional_text(node, "fade_duration"), defaults.fade_duration)?,
        run_velocity: parse_f32(optional_text(node, "run_velocity"), defaults.run_velocity)?,
        walk_velocity: parse_f32(optional_text(node, "walk_velocity"), defaults.walk_velocity)?,
        rotation_step: parse_f32(optional_text(node, "rotation_step"), defaults.rotation_step)?,
        target_height: parse_f32(optional_text(node, "target_height"), defaults.target_height)?,
    };
    for (name, value) in [
        ("fade_duration", controls.fade_duration),
        ("run_velocity", controls.run_velocity),
        ("walk_velocity", controls.walk_velocity),
        ("rotation_step", controls.rotation_step),
    ] {
        if !value.is_finite() || value < 0.0 {
            bail!("{name} must be a non-negative number (got {value})");
        }
    }
    if !controls.target_height.is_finite() {
        bail!("target_height must be finite (got {})", controls.target_height);
    }
    Ok(controls)
}

fn parse_galaxy(node: &Node<'_, '_>, defaults: GalaxyParameters) -> Result<GalaxyParameters> {
    let mut params = defaults;
    for slider in GalaxyParameters::SLIDERS {
        if let Some(text) = optional_text(node, slider.name) {
            let value = text
                .parse::<f32>()
                .map_err(|err| anyhow!("failed to parse {}: {err}", slider.name))?;
            params.set(slider.name, value)?;
        }
    }
    params.inside_color = parse_color(optional_text(node, "inside_color"), params.inside_color)?;
    params.outside_color =
        parse_color(optional_text(node, "outside_color"), params.outside_color)?;
    Ok(params)
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let components = value
        .split_whitespace()
        .map(|component| component.parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| anyhow!("invalid vector {value:?}: {err}"))?;
    match components.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(anyhow!("vector {value:?} must have three components")),
    }
}

/// Accepts `#rrggbb` or three 0-255 components.
fn parse_color(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    if value.starts_with('#') {
        return parse_hex_color(&value).ok_or_else(|| anyhow!("invalid hex colour {value:?}"));
    }
    let rgb = parse_vec3(Some(value), Vec3::ZERO).context("invalid colour")?;
    Ok(rgb / 255.0)
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float: {err}")),
        None => Ok(default),
    }
}

fn parse_number<T>(value: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(value) => value
            .parse::<T>()
            .map_err(|err| anyhow!("failed to parse integer {value:?}: {err}")),
        None => Ok(default),
    }
}

fn parse_bool(value: Option<String>, default: bool) -> Result<bool> {
    match value.as_deref() {
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(anyhow!("expected true or false, got {other:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
    <scene>
        <graves>
            <count>12</count>
            <seed>7</seed>
        </graves>
        <fog>
            <color>#101010</color>
            <far>20</far>
        </fog>
        <controls>
            <run_velocity>6.5</run_velocity>
        </controls>
        <galaxy>
            <branches>5</branches>
            <inside_color>#ffffff</inside_color>
        </galaxy>
        <object>
            <name>Lantern</name>
            <type>light</type>
            <intensity>2.5</intensity>
            <distance>4</distance>
            <position>0 5 0</position>
            <color>255 128 0</color>
        </object>
        <object>
            <name>Crypt</name>
            <shape>cone4</shape>
            <position>6 0.5 -6</position>
            <rotation>0 90 0</rotation>
        </object>
    </scene>
    "##;

    #[test]
    fn default_scene_has_house_graves_and_night_lights() {
        let scene = Scene::default();
        let graves = scene
            .objects
            .iter()
            .filter(|o| o.object_type == "grave")
            .count();
        assert_eq!(graves, 50);
        assert_eq!(scene.object("roof").unwrap().shape, Shape::Cone { segments: 4 });
        assert_eq!(scene.object("walls").unwrap().position, Vec3::new(0.0, 1.25, 0.0));
        assert_eq!(scene.lights.len(), 3);
        assert_eq!(scene.fog, Fog::default());
        assert_eq!(scene.clear_color, rgb(0x262837));
    }

    #[test]
    fn graves_sit_on_the_ring_with_small_tilt() {
        let layout = GraveyardLayout::default();
        for grave in graves(&layout) {
            let radius = Vec3::new(grave.position.x, 0.0, grave.position.z).length();
            assert!(radius >= 3.0 - 1e-4 && radius <= 9.0 + 1e-4, "{radius}");
            assert_eq!(grave.position.y, 0.3);
            let (x, y, z) = grave.rotation.to_euler(EulerRot::XYZ);
            assert!(x.abs() < 1e-5);
            assert!(y.abs() <= 0.2 + 1e-5 && z.abs() <= 0.2 + 1e-5);
        }
    }

    #[test]
    fn graveyard_is_reproducible_per_seed() {
        let layout = GraveyardLayout::default();
        assert_eq!(graves(&layout), graves(&layout));
        let other = GraveyardLayout {
            seed: layout.seed + 1,
            ..layout
        };
        assert_ne!(graves(&layout), graves(&other));
    }

    #[test]
    fn parse_scene_applies_overrides() {
        let scene = Scene::from_xml(SAMPLE).unwrap();
        assert_eq!(scene.graveyard.count, 12);
        assert_eq!(scene.graveyard.seed, 7);
        assert_eq!(scene.fog.color, Vec3::splat(16.0 / 255.0));
        assert_eq!(scene.fog.near, 1.0);
        assert_eq!(scene.fog.far, 20.0);
        assert_eq!(scene.clear_color, scene.fog.color);
        assert_eq!(scene.controls.run_velocity, 6.5);
        assert_eq!(scene.controls.walk_velocity, 2.0);
        assert_eq!(scene.galaxy.branches, 5);
        assert_eq!(scene.galaxy.inside_color, Vec3::ONE);

        let lantern = scene.lights.iter().find(|l| l.name == "Lantern").unwrap();
        assert_eq!(lantern.kind, LightKind::Point { distance: 4.0 });
        assert!((lantern.intensity - 2.5).abs() < f32::EPSILON);
        assert_eq!(lantern.color, Vec3::new(1.0, 128.0 / 255.0, 0.0));
        assert!(scene.object("Lantern").is_none());

        let crypt = scene.object("Crypt").unwrap();
        assert_eq!(crypt.object_type, "mesh");
        assert_eq!(crypt.shape, Shape::Cone { segments: 4 });
        assert!(crypt
            .rotation
            .abs_diff_eq(Quat::from_rotation_y(FRAC_PI_2), 1e-5));
    }

    #[test]
    fn missing_name_is_an_error() {
        let bad = "<scene><object><type>mesh</type></object></scene>";
        assert!(Scene::from_xml(bad).is_err());
    }

    #[test]
    fn inverted_fog_is_rejected() {
        let bad = "<scene><fog><near>10</near><far>5</far></fog></scene>";
        let err = Scene::from_xml(bad).unwrap_err();
        assert!(format!("{err:#}").contains("must exceed"));
    }

    #[test]
    fn non_finite_fog_and_grave_radii_are_rejected() {
        for bad in [
            "<scene><fog><near>NaN</near></fog></scene>",
            "<scene><fog><far>inf</far></fog></scene>",
            "<scene><graves><inner>NaN</inner></graves></scene>",
            "<scene><graves><outer>NaN</outer></graves></scene>",
        ] {
            assert!(Scene::from_xml(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn bad_controls_are_rejected() {
        for (field, value) in [
            ("run_velocity", "NaN"),
            ("walk_velocity", "-1"),
            ("fade_duration", "-0.1"),
            ("rotation_step", "-0.2"),
            ("rotation_step", "inf"),
            ("target_height", "NaN"),
        ] {
            let xml = format!("<scene><controls><{field}>{value}</{field}></controls></scene>");
            let err = Scene::from_xml(&xml).unwrap_err();
            let message = format!("{err:#}");
            assert!(message.contains("invalid <controls> block"), "{message}");
            assert!(message.contains(field), "{message}");
        }
    }

    #[test]
    fn valid_controls_override_defaults() {
        let xml = "<scene><controls><run_velocity>7.5</run_velocity>\
                   <rotation_step>0</rotation_step></controls></scene>";
        let scene = Scene::from_xml(xml).unwrap();
        assert_eq!(scene.controls.run_velocity, 7.5);
        assert_eq!(scene.controls.rotation_step, 0.0);
        assert_eq!(scene.controls.walk_velocity, ControlsConfig::default().walk_velocity);
    }

    #[test]
    fn out_of_range_galaxy_value_is_rejected() {
        let bad = "<scene><galaxy><branches>99</branches></galaxy></scene>";
        assert!(Scene::from_xml(bad).is_err());
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#ff0000"), Some(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(parse_hex_color("ff0000"), None);
        assert_eq!(parse_hex_color("#ff00"), None);
    }
}
