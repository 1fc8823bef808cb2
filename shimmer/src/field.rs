use crate::noise;
use glam::{Vec2, Vec4};

/// Distance the pattern drifts along both axes per second.
pub const PAN_SPEED: f32 = 0.1;

/// Everything the color field reads besides the surface coordinate. The
/// driver rebuilds it once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldState {
    /// Seconds since the effect started.
    pub time: f32,
    /// Viewport size in device pixels. Both dimensions must be positive.
    pub resolution: Vec2,
}

impl FieldState {
    pub fn new(time: f32, width: u32, height: u32) -> Self {
        Self {
            time,
            resolution: Vec2::new(width as f32, height as f32),
        }
    }

    pub fn to_uniforms(&self) -> FieldUniforms {
        FieldUniforms {
            time: self.time,
            _padding: 0.0,
            resolution: self.resolution.to_array(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FieldUniforms {
    time: f32,            // 0
    _padding: f32,        // 4
    resolution: [f32; 2], // 8
}

/// Maps a normalized surface coordinate into a space where one unit spans the
/// shorter side of the viewport.
pub fn aspect_corrected(uv: Vec2, resolution: Vec2) -> Vec2 {
    uv * resolution / resolution.min_element()
}

pub fn panned(uv: Vec2, state: &FieldState) -> Vec2 {
    aspect_corrected(uv, state.resolution) + state.time * PAN_SPEED
}

pub fn sample_noise(state: &FieldState, uv: Vec2) -> f32 {
    noise::cnoise(panned(uv, state))
}

/// The channels are not clamped; blue reaches past 1.0 wherever the noise
/// is negative.
pub fn compose_color(time: f32, noise: f32) -> Vec4 {
    Vec4::new(0.5 + 0.5 * (time + noise).sin(), 0.5, 1.0 - noise, 1.0)
}

/// Color of the surface at `uv` for the given frame.
pub fn shade(state: &FieldState, uv: Vec2) -> Vec4 {
    compose_color(state.time, sample_noise(state, uv))
}
