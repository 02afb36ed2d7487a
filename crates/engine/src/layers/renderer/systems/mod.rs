mod camera;
mod environment;
mod mesh;
mod transform;

pub use camera::*;
pub use environment::*;
pub use mesh::*;
pub use transform::*;
