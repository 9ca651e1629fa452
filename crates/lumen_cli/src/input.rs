//! Per-frame input state and how it drives the renderer.
//!
//! The driver fills an [`InputState`] for every frame and hands it to
//! [`update`], which turns held keys and mouse motion into camera commands.
//! Headless runs script the key presses with a string, one character per
//! frame.

use anyhow::{bail, Result};
use lumen_renderer::{Renderer, Vec3};

/// Camera translation per frame for a held movement key.
pub const MOVE_STEP: f32 = 0.25;
/// Rotation per frame for a held rotation key, in radians.
pub const ROTATE_STEP: f32 = 0.05;
/// Zoom and aperture change per frame.
pub const LENS_STEP: f32 = 0.05;
/// Radians of rotation per pixel of mouse motion.
pub const MOUSE_SENSITIVITY: f32 = 0.005;

/// Inputs held or triggered during one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    pub move_left: bool,
    pub move_right: bool,
    pub move_up: bool,
    pub move_down: bool,
    pub move_forward: bool,
    pub move_backward: bool,

    pub turn_left: bool,
    pub turn_right: bool,
    pub look_up: bool,
    pub look_down: bool,
    pub roll_cw: bool,
    pub roll_ccw: bool,

    pub zoom_in: bool,
    pub zoom_out: bool,
    pub aperture_up: bool,
    pub aperture_down: bool,
    pub focus: bool,

    /// Pressed this frame, not held
    pub toggle_debug: bool,
    pub report: bool,

    /// Mouse motion in pixels since the last frame
    pub mouse_delta: (f32, f32),
}

impl InputState {
    /// Input for a single key press.
    ///
    /// ```text
    /// w/s forward/back   a/d left/right   space/c up/down
    /// j/l turn           i/k look up/down q/e roll
    /// t/g zoom in/out    z/x aperture     f focus
    /// b BVH view         r report         . idle frame
    /// ```
    pub fn from_key(key: char) -> Result<Self> {
        let mut input = Self::default();
        match key.to_ascii_lowercase() {
            'w' => input.move_forward = true,
            's' => input.move_backward = true,
            'a' => input.move_left = true,
            'd' => input.move_right = true,
            ' ' => input.move_up = true,
            'c' => input.move_down = true,
            'j' => input.turn_left = true,
            'l' => input.turn_right = true,
            'i' => input.look_up = true,
            'k' => input.look_down = true,
            'q' => input.roll_ccw = true,
            'e' => input.roll_cw = true,
            't' => input.zoom_in = true,
            'g' => input.zoom_out = true,
            'z' => input.aperture_up = true,
            'x' => input.aperture_down = true,
            'f' => input.focus = true,
            'b' => input.toggle_debug = true,
            'r' => input.report = true,
            '.' => {}
            other => bail!("unknown key '{other}' in input script"),
        }
        Ok(input)
    }

    /// One input state per character of `script`.
    pub fn parse_script(script: &str) -> Result<Vec<Self>> {
        script.chars().map(Self::from_key).collect()
    }

    /// Camera-local translation requested this frame.
    pub fn movement(&self) -> Vec3 {
        let axis = |positive: bool, negative: bool| match (positive, negative) {
            (true, false) => MOVE_STEP,
            (false, true) => -MOVE_STEP,
            _ => 0.0,
        };
        Vec3::new(
            axis(self.move_right, self.move_left),
            axis(self.move_up, self.move_down),
            axis(self.move_forward, self.move_backward),
        )
    }

    /// (yaw, pitch, roll) requested this frame, keys plus mouse.
    pub fn rotation(&self) -> Vec3 {
        let axis = |positive: bool, negative: bool| match (positive, negative) {
            (true, false) => ROTATE_STEP,
            (false, true) => -ROTATE_STEP,
            _ => 0.0,
        };
        let (dx, dy) = self.mouse_delta;
        Vec3::new(
            axis(self.turn_left, self.turn_right) - dx * MOUSE_SENSITIVITY,
            axis(self.look_up, self.look_down) - dy * MOUSE_SENSITIVITY,
            axis(self.roll_ccw, self.roll_cw),
        )
    }
}

/// Apply one frame of input to the renderer. Returns true when anything
/// changed the image, which also means the accumulation was restarted.
pub fn update(renderer: &mut Renderer, input: &InputState) -> bool {
    let mut changed = false;

    let movement = input.movement();
    if movement != Vec3::ZERO {
        renderer.move_camera(movement);
        changed = true;
    }

    let rotation = input.rotation();
    if rotation != Vec3::ZERO {
        renderer.rotate_camera(rotation);
        changed = true;
    }

    if input.zoom_in != input.zoom_out {
        renderer.zoom_camera(if input.zoom_in { LENS_STEP } else { -LENS_STEP });
        changed = true;
    }

    if input.aperture_up != input.aperture_down {
        renderer.change_aperture(if input.aperture_up { LENS_STEP } else { -LENS_STEP });
        changed = true;
    }

    if input.focus {
        renderer.focus_camera();
        changed = true;
    }

    if input.toggle_debug {
        renderer.toggle_debug();
        changed = true;
    }

    if input.report {
        renderer.report();
    }

    changed
}
