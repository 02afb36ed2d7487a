use crate::prelude::*;

use encase::UniformBuffer;
use wgpu::util::DeviceExt;

fn encode<T: ShaderType + encase::internal::WriteInto>(value: &T) -> Vec<u8> {
    let mut buffer = UniformBuffer::new(Vec::<u8>::new());
    // Writing into a growable Vec cannot run out of space
    buffer
        .write(value)
        .expect("uniform encoding into a Vec is infallible");
    buffer.into_inner()
}

fn current_lights(
    directional: &Query<&DirectionalLight>,
    ambient: &Query<&AmbientLight>,
) -> LightUniform {
    LightUniform::new(directional.iter().next(), ambient.iter().next())
}

pub fn initialize_environment(
    mut commands: Commands,
    device: Res<GpuDevice>,
    layout: Res<EnvironmentBindGroupLayout>,
    sky: Res<SkySettings>,
    environment: Option<Res<GpuEnvironment>>,
    directional: Query<&DirectionalLight>,
    ambient: Query<&AmbientLight>,
) {
    if environment.is_some() {
        return;
    }

    let device = &device.0;

    let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Buffer"),
        contents: &encode(&current_lights(&directional, &ambient)),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let sky_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Sky Buffer"),
        contents: &encode(&sky.uniforms()),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &layout.0,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: light_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: sky_buffer.as_entire_binding(),
            },
        ],
        label: Some("environment_bind_group"),
    });

    commands.insert_resource(GpuEnvironment {
        light_buffer,
        sky_buffer,
        bind_group,
    });
}

/// Re-upload lights and sky parameters when any of them change
pub fn update_environment(
    queue: Res<GpuQueue>,
    sky: Res<SkySettings>,
    environment: Option<Res<GpuEnvironment>>,
    directional: Query<&DirectionalLight>,
    ambient: Query<&AmbientLight>,
    changed_directional: Query<(), Changed<DirectionalLight>>,
    changed_ambient: Query<(), Changed<AmbientLight>>,
) {
    let Some(environment) = environment else {
        return;
    };

    if sky.is_changed() {
        log::debug!("Sky settings changed, sun at {:?}", sky.sun_position());
        queue
            .0
            .write_buffer(&environment.sky_buffer, 0, &encode(&sky.uniforms()));
    }

    if !changed_directional.is_empty() || !changed_ambient.is_empty() {
        queue.0.write_buffer(
            &environment.light_buffer,
            0,
            &encode(&current_lights(&directional, &ambient)),
        );
    }
}
