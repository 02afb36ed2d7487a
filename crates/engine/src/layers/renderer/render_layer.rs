use crate::layers::renderer::systems::{
    initialize_camera_buffers, initialize_environment, initialize_mesh_buffers,
    initialize_render_targets, initialize_transform_buffers, update_camera_buffers,
    update_environment, update_mesh_buffers, update_render_targets, update_transform_buffers,
};
use crate::prelude::*;

/// Color format of every camera render target
pub const RENDER_TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8UnormSrgb;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Draws every mesh into each camera's render target with a single
/// directional plus ambient lighting pass.
pub struct RenderLayer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    render_pipeline: wgpu::RenderPipeline,
    schedule: Schedule,
}

fn uniform_layout(device: &wgpu::Device, label: &str, bindings: u32) -> wgpu::BindGroupLayout {
    let entries: Vec<wgpu::BindGroupLayoutEntry> = (0..bindings)
        .map(|binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        })
        .collect();

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &entries,
        label: Some(label),
    })
}

impl RenderLayer {
    pub fn new(context: &LayerContext) -> Self {
        // Retrieve device and queue from world resources (set by DeviceLayer)
        let (device, queue) = {
            let world = context.world.lock().unwrap();
            let device = world.resource::<GpuDevice>();
            let queue = world.resource::<GpuQueue>();
            (device.0.clone(), queue.0.clone())
        };

        let camera_bind_group_layout = uniform_layout(&device, "camera_bind_group_layout", 1);
        let transform_bind_group_layout = uniform_layout(&device, "transform_bind_group_layout", 1);
        // binding 0 holds the lights, binding 1 the sky parameters
        let environment_bind_group_layout =
            uniform_layout(&device, "environment_bind_group_layout", 2);

        // ecs resources
        {
            let mut world = context.world.lock().unwrap();
            world.insert_resource(CameraBindGroupLayout(camera_bind_group_layout.clone()));
            world.insert_resource(TransformBindGroupLayout(
                transform_bind_group_layout.clone(),
            ));
            world.insert_resource(EnvironmentBindGroupLayout(
                environment_bind_group_layout.clone(),
            ));
            if !world.contains_resource::<SkySettings>() {
                world.insert_resource(SkySettings::default());
            }
            if !world.contains_resource::<ClearColor>() {
                world.insert_resource(ClearColor::default());
            }
        }

        let shader = device.create_shader_module(wgpu::include_wgsl!("shader.wgsl"));
        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[
                    &camera_bind_group_layout,
                    &transform_bind_group_layout,
                    &environment_bind_group_layout,
                ],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vertex"),
                buffers: &[Vertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fragment"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: RENDER_TARGET_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Imported models are not guaranteed to be closed
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        // ecs
        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                initialize_environment,
                update_environment,
                initialize_render_targets,
                initialize_camera_buffers,
                update_render_targets,
                update_camera_buffers,
                initialize_mesh_buffers,
                update_mesh_buffers,
                initialize_transform_buffers,
                update_transform_buffers,
            )
                .chain(),
        );

        Self {
            device,
            queue,
            render_pipeline,
            schedule,
        }
    }
}

impl Layer for RenderLayer {
    fn frame(&mut self, context: &LayerContext) -> std::result::Result<(), wgpu::SurfaceError> {
        let mut world = context.world.lock().unwrap();

        // Run the schedule first before any queries
        self.schedule.run(&mut world);

        let clear_color = world.resource::<ClearColor>().to_wgpu();

        // Store cameras as a separate QueryState to avoid nested mutable borrows
        let mut camera_query = world.query::<(&GpuCamera, &GpuRenderTarget)>();
        let mut mesh_query = world.query::<(&GpuMesh, &GpuTransform)>();
        let Some(environment) = world.get_resource::<GpuEnvironment>() else {
            return Ok(());
        };

        for (camera, target) in camera_query.iter(&world) {
            let view = target
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default());
            let depth_view = target
                .depth
                .create_view(&wgpu::TextureViewDescriptor::default());

            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });

            {
                let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(clear_color),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &depth_view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });

                render_pass.set_pipeline(&self.render_pipeline);
                render_pass.set_bind_group(0, &camera.bind_group, &[]);
                render_pass.set_bind_group(2, &environment.bind_group, &[]);

                // An unloaded model simply has no meshes yet
                for (mesh, transform) in mesh_query.iter(&world) {
                    render_pass.set_bind_group(1, &transform.bind_group, &[]);
                    render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    render_pass.set_index_buffer(mesh.index_buffer.slice(..), index_format());
                    render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
                }
            };

            self.queue.submit(std::iter::once(encoder.finish()));
        }

        Ok(())
    }

    fn detach(&mut self, _context: &LayerContext) {}
}
