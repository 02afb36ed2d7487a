mod look_controller;

pub use look_controller::*;
