use crate::prelude::*;

use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};

/// How pointer input turns into camera orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookMode {
    /// Relative movement rotates the camera while a button is held, with the
    /// pointer captured for the duration of the drag
    #[default]
    Drag,
    /// The absolute pointer position across the viewport sets the orientation
    /// every frame, regardless of button state
    Ambient,
}

/// Starting point for the camera: it will face `target` from `eye`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LookAt {
    pub eye: [f32; 3],
    pub target: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookConfig {
    pub mode: LookMode,
    /// Radians of rotation per pixel of drag
    pub sensitivity: f32,
    /// Pitch limit in radians, applied in drag mode
    pub max_pitch: f32,
    /// Ambient yaw range as a fraction of pi on either side of center
    pub horizontal_scale: f32,
    /// Ambient pitch range as a fraction of pi on either side of center
    pub vertical_scale: f32,
    pub initial_look_at: Option<LookAt>,
}

impl Default for LookConfig {
    fn default() -> Self {
        Self {
            mode: LookMode::Drag,
            sensitivity: 0.002,
            max_pitch: FRAC_PI_2 - 0.01,
            horizontal_scale: 100.0 / 180.0,
            vertical_scale: 50.0 / 180.0,
            initial_look_at: None,
        }
    }
}

/// Camera facing as yaw about +Y followed by pitch about the yawed +X
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    pub yaw: f32,
    pub pitch: f32,
}

impl Orientation {
    /// Orientation whose forward vector points from `eye` at `target`.
    /// Coincident points give the default orientation.
    pub fn looking_at(eye: Point3<f32>, target: Point3<f32>) -> Self {
        let Some(direction) = (target - eye).try_normalize(f32::EPSILON) else {
            return Self::default();
        };

        Self {
            yaw: (-direction.x).atan2(-direction.z),
            // Rounding can push y a hair past 1, where asin is NaN
            pitch: direction.y.clamp(-1.0, 1.0).asin(),
        }
    }

    pub fn rotation(&self) -> UnitQuaternion<f32> {
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.yaw)
            * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.pitch)
    }

    /// Unit view direction; the camera looks down its local -Z
    pub fn forward(&self) -> Vector3<f32> {
        self.rotation() * -Vector3::z()
    }
}

/// Mouse look for a camera entity.
///
/// Owns the yaw and pitch outright. Drag mode is a two state machine
/// (idle/engaged) that acquires pointer capture when it engages and releases
/// it when it disengages, so acquire and release calls always pair up.
#[derive(Component, Debug, Clone)]
pub struct LookController {
    mode: LookMode,
    sensitivity: f32,
    max_pitch: f32,
    horizontal_scale: f32,
    vertical_scale: f32,
    yaw: f32,
    pitch: f32,
    engaged: bool,
}

impl LookController {
    pub fn new(config: &LookConfig) -> Self {
        let defaults = LookConfig::default();

        let sensitivity = if config.sensitivity.is_finite() {
            config.sensitivity
        } else {
            defaults.sensitivity
        };

        let max_pitch = if config.max_pitch.is_finite() {
            config.max_pitch.abs().min(FRAC_PI_2)
        } else {
            defaults.max_pitch
        };

        let initial = config
            .initial_look_at
            .map(|look_at| {
                Orientation::looking_at(Point3::from(look_at.eye), Point3::from(look_at.target))
            })
            .unwrap_or_default();

        Self {
            mode: config.mode,
            sensitivity,
            max_pitch,
            horizontal_scale: config.horizontal_scale,
            vertical_scale: config.vertical_scale,
            yaw: initial.yaw,
            pitch: initial.pitch.clamp(-max_pitch, max_pitch),
            engaged: false,
        }
    }

    pub fn orientation(&self) -> Orientation {
        Orientation {
            yaw: self.yaw,
            pitch: self.pitch,
        }
    }

    pub fn mode(&self) -> LookMode {
        self.mode
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    pub fn max_pitch(&self) -> f32 {
        self.max_pitch
    }

    /// IDLE -> ENGAGED. Returns whether a transition happened.
    pub fn engage(&mut self, capture: &mut impl PointerCapture) -> bool {
        if self.mode != LookMode::Drag || self.engaged {
            return false;
        }

        self.engaged = true;
        capture.acquire();
        log::debug!("Look drag engaged");
        true
    }

    /// ENGAGED -> IDLE. Returns whether a transition happened.
    pub fn disengage(&mut self, capture: &mut impl PointerCapture) -> bool {
        if !self.engaged {
            return false;
        }

        self.engaged = false;
        capture.release();
        log::debug!("Look drag released");
        true
    }

    /// Rotate by a relative pointer movement in pixels. Ignored unless a drag is engaged.
    pub fn apply_pointer_delta(&mut self, dx: f32, dy: f32) {
        if !self.engaged {
            return;
        }

        let dx = if dx.is_finite() { dx } else { 0.0 };
        let dy = if dy.is_finite() { dy } else { 0.0 };

        self.yaw -= dx * self.sensitivity;
        self.pitch = (self.pitch - dy * self.sensitivity).clamp(-self.max_pitch, self.max_pitch);
    }

    /// Point the camera according to where the cursor sits in the viewport.
    /// Only ambient controllers follow the cursor; pitch is not clamped.
    pub fn track_pointer(&mut self, position: (f32, f32), viewport: (f32, f32)) {
        let (x, y) = position;
        let (width, height) = viewport;

        if self.mode != LookMode::Ambient || width <= 0.0 || height <= 0.0 {
            return;
        }

        let nx = (x / width) * 2.0 - 1.0;
        let ny = (y / height) * 2.0 - 1.0;
        if !nx.is_finite() || !ny.is_finite() {
            return;
        }

        self.yaw = -nx * PI * self.horizontal_scale;
        self.pitch = -ny * PI * self.vertical_scale;
    }

    pub fn handle_event(&mut self, event: PointerEvent, capture: &mut impl PointerCapture) {
        match event {
            PointerEvent::Pressed => {
                self.engage(capture);
            }
            PointerEvent::Released | PointerEvent::CaptureLost => {
                self.disengage(capture);
            }
            PointerEvent::Motion { dx, dy } => self.apply_pointer_delta(dx, dy),
        }
    }
}
