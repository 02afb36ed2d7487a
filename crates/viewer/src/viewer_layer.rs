use crate::prelude::*;

use bevy_ecs::schedule::Schedule;
use lookaround_engine::{Layer, LayerContext};

/// Drives the look controller and turns finished model loads into entities.
/// Sits before the render layer so the camera moves in the same frame the
/// input arrived.
pub struct ViewerLayer {
    schedule: Schedule,
}

impl ViewerLayer {
    pub fn new(context: &LayerContext, request: ModelRequest) -> Self {
        {
            let mut world = context.world.lock().unwrap();
            let loader = world.get_resource_or_insert_with(ModelLoader::new).clone();
            loader.load(request);
        }

        let mut schedule = Schedule::default();
        schedule.add_systems((
            (
                crate::systems::update_look_controllers::<CursorCapture>,
                crate::systems::apply_look_orientation,
            )
                .chain(),
            apply_loaded_models,
        ));

        Self { schedule }
    }
}

impl Layer for ViewerLayer {
    fn frame(&mut self, context: &LayerContext) -> std::result::Result<(), wgpu::SurfaceError> {
        let mut world = context.world.lock().unwrap();
        self.schedule.run(&mut world);

        Ok(())
    }

    fn detach(&mut self, context: &LayerContext) {
        let mut world = context.world.lock().unwrap();
        if !world.contains_resource::<CursorCapture>() {
            return;
        }

        world.resource_scope(|world, mut capture: Mut<CursorCapture>| {
            for mut controller in world.query::<&mut LookController>().iter_mut(world) {
                controller.disengage(&mut *capture);
            }
        });
    }
}
