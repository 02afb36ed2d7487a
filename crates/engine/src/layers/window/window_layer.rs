use crate::prelude::*;

use crate::layers::renderer::RENDER_TARGET_FORMAT;

/// Presents the main camera's render target in the window and keeps the
/// surface and `WindowSize` in step with resizes.
pub struct WindowLayer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
}

impl WindowLayer {
    pub fn new(context: &LayerContext) -> Self {
        let size = context.window.inner_size();

        // Take ownership of surface and adapter since they can't be cloned
        let (device, queue, adapter, surface) = {
            let mut world = context.world.lock().unwrap();
            let device = world.resource::<GpuDevice>().0.clone();
            let queue = world.resource::<GpuQueue>().0.clone();

            let adapter = world
                .resource_mut::<GpuAdapter>()
                .0
                .take()
                .expect("Adapter already taken");

            let surface = world
                .resource_mut::<GpuSurface>()
                .0
                .take()
                .expect("Surface already taken");

            (device, queue, adapter, surface)
        };

        // Render targets are copied straight into the surface, so the formats must match
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| **f == RENDER_TARGET_FORMAT)
            .or_else(|| surface_caps.formats.iter().find(|f| f.is_srgb()))
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        if surface_format != RENDER_TARGET_FORMAT {
            log::warn!(
                "Surface does not support {:?}, presenting as {:?}",
                RENDER_TARGET_FORMAT,
                surface_format
            );
        }

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_DST,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Self {
            surface,
            device,
            queue,
            config,
        }
    }

    fn resize(&mut self, context: &LayerContext, width: u32, height: u32) {
        // Minimized windows report a zero size
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        log::debug!("Resized surface to {}x{}", width, height);

        let mut world = context.world.lock().unwrap();
        world.insert_resource(WindowSize { width, height });
    }
}

impl Layer for WindowLayer {
    fn frame(&mut self, context: &LayerContext) -> std::result::Result<(), wgpu::SurfaceError> {
        let mut world = context.world.lock().unwrap();

        // Find the main camera and its render target
        let target = world
            .query::<(&Camera, &GpuRenderTarget)>()
            .iter(&world)
            .find(|(camera, _)| camera.is_main)
            .map(|(_, target)| target);

        let Some(target) = target else {
            return Ok(());
        };

        let surface_texture = self.surface.get_current_texture()?;

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Window Blit Encoder"),
            });

        encoder.copy_texture_to_texture(
            target.texture.as_image_copy(),
            surface_texture.texture.as_image_copy(),
            wgpu::Extent3d {
                width: self.config.width.min(target.texture.width()),
                height: self.config.height.min(target.texture.height()),
                depth_or_array_layers: 1,
            },
        );

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();

        Ok(())
    }

    fn detach(&mut self, _context: &LayerContext) {}

    fn event(&mut self, context: &LayerContext, event: LayerEvent) {
        let LayerEvent::WindowEvent(window_event) = event;
        if let winit::event::WindowEvent::Resized(physical_size) = *window_event {
            self.resize(context, physical_size.width, physical_size.height);
        }
    }
}
