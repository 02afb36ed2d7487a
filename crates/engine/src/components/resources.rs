use crate::prelude::*;

use serde::{Deserialize, Serialize};

#[derive(Resource)]
pub struct GpuDevice(pub wgpu::Device);

#[derive(Resource)]
pub struct GpuQueue(pub wgpu::Queue);

#[derive(Resource)]
pub struct CameraBindGroupLayout(pub wgpu::BindGroupLayout);

#[derive(Resource)]
pub struct TransformBindGroupLayout(pub wgpu::BindGroupLayout);

#[derive(Resource)]
pub struct EnvironmentBindGroupLayout(pub wgpu::BindGroupLayout);

/// Light and sky uniform buffers shared by every draw
#[derive(Resource)]
pub struct GpuEnvironment {
    pub light_buffer: wgpu::Buffer,
    pub sky_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

#[derive(Resource, Clone, Copy, PartialEq, Eq, Debug)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

#[derive(Resource)]
pub struct GpuSurface(pub Option<wgpu::Surface<'static>>);

#[derive(Resource)]
pub struct GpuAdapter(pub Option<wgpu::Adapter>);

/// Background color, stored in linear space
#[derive(Resource, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClearColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl ClearColor {
    /// Build from a 0xRRGGBB sRGB value
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f64 / 255.0);
        Self {
            r: channel(16),
            g: channel(8),
            b: channel(0),
        }
    }

    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r,
            g: self.g,
            b: self.b,
            a: 1.0,
        }
    }
}

impl Default for ClearColor {
    fn default() -> Self {
        Self::from_hex(0x202020)
    }
}

fn srgb_to_linear(value: f64) -> f64 {
    if value <= 0.04045 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}
