mod render_layer;
pub mod systems;

pub use render_layer::*;
