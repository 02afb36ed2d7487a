pub mod device;
pub mod renderer;
pub mod window;

pub use device::DeviceLayer;
pub use renderer::RenderLayer;
pub use window::WindowLayer;
