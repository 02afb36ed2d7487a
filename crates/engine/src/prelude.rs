pub use crate::components::*;
pub use crate::input::*;
pub use crate::loader::*;
pub use crate::{Layer, LayerContext, LayerEvent, Result};

pub use bevy_ecs::prelude::*;
pub use encase::ShaderType;
pub use nalgebra::{
    Isometry3, Matrix3, Matrix4, Perspective3, Point3, Translation3, UnitQuaternion, Vector3,
};
