use crate::prelude::*;

use serde::{Deserialize, Serialize};

/// Light arriving from a fixed direction, positioned like a sun
#[derive(Component, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalLight {
    pub color: [f32; 3],
    pub intensity: f32,
    /// The light shines from this point towards the origin
    pub position: [f32; 3],
}

impl DirectionalLight {
    /// Unit vector pointing from the scene towards the light
    pub fn direction(&self) -> Vector3<f32> {
        Vector3::from(self.position)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::y)
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            intensity: 2.0,
            position: [1.0, 1.0, 1.0],
        }
    }
}

/// Uniform light applied to every surface regardless of orientation
#[derive(Component, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            intensity: 0.5,
        }
    }
}

/// Lighting block consumed by the mesh shader
#[derive(ShaderType, Debug, Clone, PartialEq)]
pub struct LightUniform {
    pub light_direction: Vector3<f32>,
    pub light_intensity: f32,
    pub light_color: Vector3<f32>,
    pub ambient_intensity: f32,
    pub ambient_color: Vector3<f32>,
}

impl LightUniform {
    /// Missing lights contribute nothing
    pub fn new(directional: Option<&DirectionalLight>, ambient: Option<&AmbientLight>) -> Self {
        let (light_direction, light_intensity, light_color) = match directional {
            Some(light) => (light.direction(), light.intensity, Vector3::from(light.color)),
            None => (Vector3::y(), 0.0, Vector3::zeros()),
        };

        let (ambient_intensity, ambient_color) = match ambient {
            Some(light) => (light.intensity, Vector3::from(light.color)),
            None => (0.0, Vector3::zeros()),
        };

        Self {
            light_direction,
            light_intensity,
            light_color,
            ambient_intensity,
            ambient_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_light_comes_from_the_diagonal() {
        let direction = DirectionalLight::default().direction();
        let expected = 1.0 / 3.0_f32.sqrt();
        assert!((direction.x - expected).abs() < 1e-6);
        assert!((direction.y - expected).abs() < 1e-6);
        assert!((direction.z - expected).abs() < 1e-6);
    }

    #[test]
    fn light_at_origin_falls_back_to_overhead() {
        let light = DirectionalLight {
            position: [0.0, 0.0, 0.0],
            ..Default::default()
        };
        assert_eq!(light.direction(), Vector3::y());
    }

    #[test]
    fn missing_lights_contribute_nothing() {
        let uniform = LightUniform::new(None, None);
        assert_eq!(uniform.light_intensity, 0.0);
        assert_eq!(uniform.ambient_intensity, 0.0);
    }
}
