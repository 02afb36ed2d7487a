mod look_controller;

pub use look_controller::*;

#[cfg(test)]
pub(crate) use look_controller::tests::RecordingCapture;
