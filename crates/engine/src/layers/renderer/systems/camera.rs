use crate::layers::renderer::{DEPTH_FORMAT, RENDER_TARGET_FORMAT};
use crate::prelude::*;

use wgpu::util::DeviceExt;

pub fn initialize_camera_buffers(
    mut commands: Commands,
    device: Res<GpuDevice>,
    bind_group_layout: Res<CameraBindGroupLayout>,
    window_size: Res<WindowSize>,
    query: Query<(Entity, &Camera, &Transform), Without<GpuCamera>>,
) {
    let device = &device.0;
    let bind_group_layout = &bind_group_layout.0;
    let aspect = window_size.aspect();

    for (entity, camera, transform) in query.iter() {
        let matrix = camera.view_projection(transform, aspect);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[matrix]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        commands.entity(entity).insert(GpuCamera {
            buffer,
            bind_group,
            aspect,
        });

        log::debug!("Created GpuCamera for Entity {:?}", entity);
    }
}

fn create_target_textures(device: &wgpu::Device, window_size: &WindowSize) -> GpuRenderTarget {
    let size = wgpu::Extent3d {
        width: window_size.width.max(1),
        height: window_size.height.max(1),
        depth_or_array_layers: 1,
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Camera Render Target"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: RENDER_TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });

    let depth = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Camera Depth Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });

    GpuRenderTarget { texture, depth }
}

pub fn initialize_render_targets(
    mut commands: Commands,
    device: Res<GpuDevice>,
    window_size: Res<WindowSize>,
    query: Query<Entity, (With<RenderTarget>, Without<GpuRenderTarget>)>,
) {
    for entity in query.iter() {
        commands
            .entity(entity)
            .insert(create_target_textures(&device.0, &window_size));
    }
}

/// Recompute camera aspect and recreate render targets after a resize
pub fn update_render_targets(
    mut commands: Commands,
    device: Res<GpuDevice>,
    window_size: Res<WindowSize>,
    mut query: Query<(Entity, &mut GpuCamera, Option<&GpuRenderTarget>), With<RenderTarget>>,
) {
    if !window_size.is_changed() {
        return;
    }

    let aspect = window_size.aspect();

    for (entity, mut camera, gpu_target) in query.iter_mut() {
        // Only update aspect if it actually changed (avoid triggering change detection unnecessarily)
        if (camera.aspect - aspect).abs() > f32::EPSILON {
            camera.aspect = aspect;
        }

        if gpu_target.is_some() {
            commands
                .entity(entity)
                .insert(create_target_textures(&device.0, &window_size));
        }
    }
}

pub fn update_camera_buffers(
    queue: Res<GpuQueue>,
    query: Query<(&Camera, &Transform, &GpuCamera), Or<(Changed<GpuCamera>, Changed<Transform>, Changed<Camera>)>>,
) {
    let queue = &queue.0;

    for (camera, transform, gpu_camera) in query.iter() {
        let matrix = camera.view_projection(transform, gpu_camera.aspect);
        queue.write_buffer(&gpu_camera.buffer, 0, bytemuck::cast_slice(&[matrix]));
    }
}
