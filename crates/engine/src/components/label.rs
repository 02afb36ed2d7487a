use crate::prelude::*;

/// Human readable name attached to every spawned entity
#[derive(Component, Clone, Debug)]
pub struct Tag {
    pub label: String,
}
