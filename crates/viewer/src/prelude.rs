pub use crate::components::*;
pub use lookaround_engine::prelude::*;
