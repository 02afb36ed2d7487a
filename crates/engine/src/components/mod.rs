mod camera;
mod label;
mod light;
mod mesh;
mod resources;
mod sky;
mod transform;

pub use camera::*;
pub use label::*;
pub use light::*;
pub use mesh::*;
pub use resources::*;
pub use sky::*;
pub use transform::*;
