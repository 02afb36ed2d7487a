use lookaround_engine::{
    ApplicationBuilder, Result,
    layers::{DeviceLayer, RenderLayer, WindowLayer},
    prelude::*,
};
use std::path::PathBuf;
use winit::event_loop::EventLoop;

mod components;
mod config;
mod prelude;
mod systems;
mod viewer_layer;

use components::LookController;
use config::ViewerConfig;
use viewer_layer::ViewerLayer;

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_module("lookaround", log::LevelFilter::Debug)
        .filter_module("lookaround_engine", log::LevelFilter::Debug)
        .parse_default_env()
        .init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = ViewerConfig::load(config_path.as_deref())?;

    let event_loop = EventLoop::new()?;

    let request = config.model_request();
    let mut app = ApplicationBuilder::new()
        .with_title(config.title.clone())
        .add_layer(|context| Box::new(DeviceLayer::new(context)))
        .add_layer(move |context| Box::new(ViewerLayer::new(context, request.clone())))
        .add_layer(|context| Box::new(RenderLayer::new(context)))
        .add_layer(|context| Box::new(WindowLayer::new(context)))
        .build();

    let controller = LookController::new(&config.look_config());
    let mut camera_transform = Transform::from_position(Point3::from(config.camera.position));
    camera_transform.rotation = controller.orientation().rotation();

    // Aspect ratio follows the window
    app.spawn(
        "Camera",
        (
            camera_transform,
            config.camera.camera(),
            RenderTarget {},
            controller,
        ),
    );

    app.spawn("Sun", config.lighting.directional.clone());
    app.spawn("Ambient", config.lighting.ambient.clone());

    app.insert_resource(config.sky.clone());
    app.insert_resource(ClearColor::from_hex(config.clear_color));

    event_loop.run_app(&mut app)?;

    Ok(())
}
