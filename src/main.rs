use std::any::Any;
use std::env;
use std::fmt;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use glam::Vec2;
use log::{info, warn};
use pollster::block_on;
use winit::dpi::LogicalSize;
use winit::event::{
    ElementState, Event, KeyEvent, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent,
};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::keyboard::{KeyCode as WinitKey, PhysicalKey};
use winit::window::{Window, WindowBuilder};

use haunted_house::{
    InputState, KeyCode, MouseButton, NamedKey, Renderer, Scene, World,
};

/// Simulated frame length in summary mode.
const FRAME_DELTA: f32 = 1.0 / 60.0;
/// Longest step fed to the world in interactive mode, so a stalled window
/// does not teleport the character.
const MAX_FRAME_DELTA: f32 = 0.1;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;

    let mut scene = match options.scene_path.as_deref() {
        Some(path) => {
            let xml = fs::read_to_string(path)
                .with_context(|| format!("failed to read scene {path}"))?;
            Scene::from_xml(&xml).with_context(|| format!("failed to parse scene {path}"))?
        }
        None => Scene::default(),
    };
    if let Some(seed) = options.seed {
        let mut layout = scene.graveyard;
        layout.seed = seed;
        scene.set_graveyard(layout);
    }
    print_scene(&scene);

    let seed = options.seed.unwrap_or(scene.graveyard.seed);
    let mut world = World::new(scene, seed);
    world
        .spawn_default_character()
        .context("failed to spawn character")?;
    if options.walk {
        world.handle_key_press(KeyCode::Named(NamedKey::LeftShift));
    }
    for tweak in &options.tweaks {
        tweak
            .apply(&mut world)
            .with_context(|| format!("failed to apply tweak {}", tweak.name))?;
    }

    let input = Arc::new(InputState::new());
    if options.summary_only {
        return run_headless(world, &input, &options);
    }

    match open_window() {
        Ok((event_loop, window)) => run_interactive(event_loop, window, world, input),
        Err(err) => {
            eprintln!(
                "{err}. Falling back to --summary-only mode (set DISPLAY or install X11 libs to enable rendering)."
            );
            run_headless(world, &input, &options)
        }
    }
}

fn run_headless(mut world: World, input: &InputState, options: &CliOptions) -> Result<()> {
    for key in &options.hold {
        input.set_key_down(*key);
    }
    for frame in 0..options.frames {
        world
            .tick(FRAME_DELTA, input)
            .with_context(|| format!("simulation failed at frame {frame}"))?;
    }
    println!(
        "Simulated {} frames ({:.2}s)",
        options.frames,
        world.elapsed()
    );
    print_final_state(&world);
    Ok(())
}

fn open_window() -> Result<(EventLoop<()>, Arc<Window>), WindowInitError> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop = event_loop
        .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
        .map_err(|err| WindowInitError::from_error("event loop", err))?;
    let window = WindowBuilder::new()
        .with_title("Haunted House")
        .with_inner_size(LogicalSize::new(1280.0, 720.0))
        .build(&event_loop)
        .map_err(|err| WindowInitError::from_error("window", err))?;
    Ok((event_loop, Arc::new(window)))
}

fn run_interactive(
    event_loop: EventLoop<()>,
    window: Arc<Window>,
    world: World,
    input: Arc<InputState>,
) -> Result<()> {
    let renderer = block_on(Renderer::new(window))?;
    let mut app = AppState {
        renderer,
        world,
        input,
        last_frame: Instant::now(),
        last_error: None,
    };

    event_loop
        .run(|event, target| {
            target.set_control_flow(ControlFlow::Poll);
            if let Err(err) = app.process_event(&event, target) {
                app.last_error = Some(err);
                target.exit();
            }
        })
        .context("event loop failed")?;

    print_final_state(&app.world);
    match app.last_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct AppState {
    renderer: Renderer,
    world: World,
    input: Arc<InputState>,
    last_frame: Instant,
    last_error: Option<anyhow::Error>,
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

impl AppState {
    fn process_event(
        &mut self,
        event: &Event<()>,
        target: &EventLoopWindowTarget<()>,
    ) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.renderer.window_id() => {
                match event {
                    WindowEvent::CloseRequested => target.exit(),
                    WindowEvent::Resized(size) => {
                        self.renderer.resize(*size);
                        self.world.set_viewport_height(size.height as f32);
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if self.handle_keyboard(event) {
                            target.exit();
                        }
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        self.handle_mouse_button(*state, *button);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let pos = Vec2::new(position.x as f32, position.y as f32);
                        self.input.set_mouse_position(pos);
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let amount = match delta {
                            MouseScrollDelta::LineDelta(_, y) => *y,
                            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 40.0,
                        };
                        self.input.add_scroll(amount);
                    }
                    WindowEvent::RedrawRequested => self.redraw()?,
                    _ => {}
                }
            }
            Event::AboutToWait => {
                self.renderer.window().request_redraw();
            }
            _ => {}
        }
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        let now = Instant::now();
        let delta = now
            .duration_since(self.last_frame)
            .as_secs_f32()
            .min(MAX_FRAME_DELTA);
        self.last_frame = now;
        self.world.tick(delta, &self.input)?;

        let camera = self.world.camera().camera_params(self.renderer.aspect());
        self.renderer
            .update_globals(&camera, &self.world.lighting());
        let objects = self.world.objects();
        if let Err(err) = self
            .renderer
            .render(&objects, self.world.scene().clear_color)
        {
            match err {
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                    let size = self.renderer.window().inner_size();
                    self.renderer.resize(size);
                }
                wgpu::SurfaceError::OutOfMemory => {
                    return Err(anyhow!("GPU is out of memory"));
                }
                wgpu::SurfaceError::Timeout => {
                    info!("Surface timeout; retrying next frame");
                }
                other => warn!("surface error: {other}"),
            }
        }
        Ok(())
    }

    /// Returns true when the user asked to quit.
    fn handle_keyboard(&mut self, event: &KeyEvent) -> bool {
        let PhysicalKey::Code(code) = event.physical_key else {
            return false;
        };
        if code == WinitKey::Escape {
            return event.state == ElementState::Pressed;
        }
        let Some(key) = map_keycode(code) else {
            return false;
        };
        match event.state {
            ElementState::Pressed => {
                if self.input.set_key_down(key) && !event.repeat {
                    self.world.handle_key_press(key);
                }
            }
            ElementState::Released => self.input.set_key_up(key),
        }
        false
    }

    fn handle_mouse_button(&self, state: ElementState, button: WinitMouseButton) {
        let index = match button {
            WinitMouseButton::Left => 0,
            WinitMouseButton::Right => 1,
            WinitMouseButton::Middle => 2,
            WinitMouseButton::Back => 3,
            WinitMouseButton::Forward => 4,
            WinitMouseButton::Other(value) => value.min(u8::MAX as u16) as u8,
        };
        let button = MouseButton::new(index);
        match state {
            ElementState::Pressed => self.input.set_mouse_button_down(button),
            ElementState::Released => self.input.set_mouse_button_up(button),
        }
    }
}

fn print_scene(scene: &Scene) {
    println!(
        "Loaded scene with {} objects ({} lights)",
        scene.objects.len(),
        scene.lights.len()
    );
    for object in &scene.objects {
        println!(" - {} ({})", object.name, object.object_type);
    }
    println!(
        "Fog {:.2}..{:.2}, graveyard seed {}",
        scene.fog.near, scene.fog.far, scene.graveyard.seed
    );
}

fn print_final_state(world: &World) {
    if let Some(controls) = world.character() {
        let position = controls.model().position;
        println!(
            "Character state={} run={} pos=({:.2}, {:.2}, {:.2})",
            controls.current_state(),
            controls.run_toggle(),
            position.x,
            position.y,
            position.z
        );
    }
    let target = world.camera().target;
    println!(
        "Camera target=({:.2}, {:.2}, {:.2})",
        target.x, target.y, target.z
    );
    println!("Ghosts:");
    for ghost in world.ghosts() {
        let position = ghost.position();
        println!(
            " - {} pos=({:.2}, {:.2}, {:.2})",
            ghost.name, position.x, position.y, position.z
        );
    }
    let panel = world.galaxy();
    let params = panel.params();
    let (points, extent) = panel
        .galaxy()
        .map_or((0, 0.0), |galaxy| (galaxy.len(), galaxy.extent()));
    println!(
        "Galaxy points={} branches={} extent={:.2} generation={}",
        points,
        params.branches,
        extent,
        panel.generation()
    );
}

fn map_keycode(code: WinitKey) -> Option<KeyCode> {
    use WinitKey as Key;
    Some(match code {
        Key::Space => KeyCode::Named(NamedKey::Space),
        Key::Enter => KeyCode::Named(NamedKey::Enter),
        Key::Tab => KeyCode::Named(NamedKey::Tab),
        Key::ArrowLeft => KeyCode::Named(NamedKey::Left),
        Key::ArrowRight => KeyCode::Named(NamedKey::Right),
        Key::ArrowUp => KeyCode::Named(NamedKey::Up),
        Key::ArrowDown => KeyCode::Named(NamedKey::Down),
        Key::Backspace => KeyCode::Named(NamedKey::Backspace),
        Key::ShiftLeft => KeyCode::Named(NamedKey::LeftShift),
        Key::ShiftRight => KeyCode::Named(NamedKey::RightShift),
        Key::ControlLeft => KeyCode::Named(NamedKey::LeftCtrl),
        Key::ControlRight => KeyCode::Named(NamedKey::RightCtrl),
        Key::AltLeft => KeyCode::Named(NamedKey::LeftAlt),
        Key::AltRight => KeyCode::Named(NamedKey::RightAlt),
        Key::Digit0 => KeyCode::Digit(0),
        Key::Digit1 => KeyCode::Digit(1),
        Key::Digit2 => KeyCode::Digit(2),
        Key::Digit3 => KeyCode::Digit(3),
        Key::Digit4 => KeyCode::Digit(4),
        Key::Digit5 => KeyCode::Digit(5),
        Key::Digit6 => KeyCode::Digit(6),
        Key::Digit7 => KeyCode::Digit(7),
        Key::Digit8 => KeyCode::Digit(8),
        Key::Digit9 => KeyCode::Digit(9),
        Key::KeyA => KeyCode::Character('A'),
        Key::KeyB => KeyCode::Character('B'),
        Key::KeyC => KeyCode::Character('C'),
        Key::KeyD => KeyCode::Character('D'),
        Key::KeyE => KeyCode::Character('E'),
        Key::KeyF => KeyCode::Character('F'),
        Key::KeyG => KeyCode::Character('G'),
        Key::KeyH => KeyCode::Character('H'),
        Key::KeyI => KeyCode::Character('I'),
        Key::KeyJ => KeyCode::Character('J'),
        Key::KeyK => KeyCode::Character('K'),
        Key::KeyL => KeyCode::Character('L'),
        Key::KeyM => KeyCode::Character('M'),
        Key::KeyN => KeyCode::Character('N'),
        Key::KeyO => KeyCode::Character('O'),
        Key::KeyP => KeyCode::Character('P'),
        Key::KeyQ => KeyCode::Character('Q'),
        Key::KeyR => KeyCode::Character('R'),
        Key::KeyS => KeyCode::Character('S'),
        Key::KeyT => KeyCode::Character('T'),
        Key::KeyU => KeyCode::Character('U'),
        Key::KeyV => KeyCode::Character('V'),
        Key::KeyW => KeyCode::Character('W'),
        Key::KeyX => KeyCode::Character('X'),
        Key::KeyY => KeyCode::Character('Y'),
        Key::KeyZ => KeyCode::Character('Z'),
        Key::F1 => KeyCode::Function(1),
        Key::F2 => KeyCode::Function(2),
        Key::F3 => KeyCode::Function(3),
        Key::F4 => KeyCode::Function(4),
        Key::F5 => KeyCode::Function(5),
        Key::F6 => KeyCode::Function(6),
        Key::F7 => KeyCode::Function(7),
        Key::F8 => KeyCode::Function(8),
        Key::F9 => KeyCode::Function(9),
        Key::F10 => KeyCode::Function(10),
        Key::F11 => KeyCode::Function(11),
        Key::F12 => KeyCode::Function(12),
        _ => return None,
    })
}

const USAGE: &str = "Usage: haunted-house [scene.xml] [--summary-only] [--frames N] [--seed N] \
[--walk] [--hold KEYS] [--tweak name=value]...";

#[derive(Debug)]
struct CliOptions {
    scene_path: Option<String>,
    summary_only: bool,
    frames: u32,
    seed: Option<u64>,
    walk: bool,
    hold: Vec<KeyCode>,
    tweaks: Vec<Tweak>,
}

impl CliOptions {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut options = Self {
            scene_path: None,
            summary_only: false,
            frames: 120,
            seed: None,
            walk: false,
            hold: Vec::new(),
            tweaks: Vec::new(),
        };
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .ok_or_else(|| anyhow!("{flag} expects a value. {USAGE}"))
            };
            match arg.as_str() {
                "--summary-only" => options.summary_only = true,
                "--walk" => options.walk = true,
                "--frames" => {
                    let raw = value("--frames")?;
                    options.frames = raw
                        .parse()
                        .with_context(|| format!("invalid frame count {raw:?}"))?;
                }
                "--seed" => {
                    let raw = value("--seed")?;
                    options.seed = Some(
                        raw.parse()
                            .with_context(|| format!("invalid seed {raw:?}"))?,
                    );
                }
                "--hold" => {
                    let raw = value("--hold")?;
                    for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                        let key = KeyCode::from_name(name)
                            .ok_or_else(|| anyhow!("unknown key {name:?} in --hold"))?;
                        options.hold.push(key);
                    }
                }
                "--tweak" => options.tweaks.push(Tweak::parse(&value("--tweak")?)?),
                other if other.starts_with("--") => {
                    return Err(anyhow!("Unknown argument: {other}. {USAGE}"));
                }
                path => {
                    if options.scene_path.is_some() {
                        return Err(anyhow!("only one scene file may be given. {USAGE}"));
                    }
                    options.scene_path = Some(path.to_string());
                }
            }
        }
        Ok(options)
    }
}

#[derive(Debug)]
struct Tweak {
    name: String,
    value: TweakValue,
}

#[derive(Debug)]
enum TweakValue {
    Number(f32),
    Color(String),
}

impl Tweak {
    fn parse(raw: &str) -> Result<Self> {
        let (name, value) = raw
            .split_once('=')
            .ok_or_else(|| anyhow!("tweak {raw:?} must look like name=value"))?;
        let value = if value.starts_with('#') {
            TweakValue::Color(value.to_string())
        } else {
            TweakValue::Number(
                value
                    .parse()
                    .with_context(|| format!("invalid value for tweak {name}"))?,
            )
        };
        Ok(Self {
            name: name.trim().to_string(),
            value,
        })
    }

    fn apply(&self, world: &mut World) -> Result<()> {
        let panel = world.galaxy_mut();
        match &self.value {
            TweakValue::Number(value) => panel.tweak(&self.name, *value)?,
            TweakValue::Color(hex) => panel.tweak_color(&self.name, hex)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliOptions> {
        CliOptions::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_every_flag() {
        let options = parse(&[
            "scene.xml",
            "--summary-only",
            "--frames",
            "30",
            "--seed",
            "7",
            "--walk",
            "--hold",
            "w,d",
            "--tweak",
            "branches=4",
            "--tweak",
            "inside_color=#ffffff",
        ])
        .unwrap();
        assert_eq!(options.scene_path.as_deref(), Some("scene.xml"));
        assert!(options.summary_only && options.walk);
        assert_eq!(options.frames, 30);
        assert_eq!(options.seed, Some(7));
        assert_eq!(
            options.hold,
            vec![KeyCode::Character('W'), KeyCode::Character('D')]
        );
        assert_eq!(options.tweaks.len(), 2);
        assert!(matches!(options.tweaks[1].value, TweakValue::Color(_)));
    }

    #[test]
    fn rejects_unknown_flag_and_key() {
        assert!(parse(&["--fly"]).is_err());
        assert!(parse(&["--hold", "w,banana"]).is_err());
        assert!(parse(&["--frames"]).is_err());
        assert!(parse(&["--tweak", "spin"]).is_err());
    }
}
