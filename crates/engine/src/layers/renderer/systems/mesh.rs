use crate::prelude::*;

use wgpu::util::DeviceExt;

fn create_mesh_buffers(device: &wgpu::Device, mesh: &Mesh) -> GpuMesh {
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Vertex Buffer"),
        contents: bytemuck::cast_slice(&mesh.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });

    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Index Buffer"),
        contents: bytemuck::cast_slice(&mesh.indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    GpuMesh {
        vertex_buffer,
        index_buffer,
        index_count: mesh.indices.len() as u32,
    }
}

pub fn initialize_mesh_buffers(
    mut commands: Commands,
    device: Res<GpuDevice>,
    query: Query<(Entity, &Mesh), Without<GpuMesh>>,
) {
    for (entity, mesh) in query.iter() {
        if mesh.indices.is_empty() {
            continue;
        }

        commands
            .entity(entity)
            .insert(create_mesh_buffers(&device.0, mesh));

        log::debug!(
            "Created GpuMesh for Entity {:?} ({} vertices)",
            entity,
            mesh.vertices.len()
        );
    }
}

pub fn update_mesh_buffers(
    device: Res<GpuDevice>,
    mut query: Query<(Entity, &Mesh, &mut GpuMesh), Changed<Mesh>>,
) {
    for (entity, mesh, mut gpu_mesh) in query.iter_mut() {
        *gpu_mesh = create_mesh_buffers(&device.0, mesh);

        log::debug!("Updated GpuMesh for Entity {:?}", entity);
    }
}
