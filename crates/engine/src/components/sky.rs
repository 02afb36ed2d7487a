use crate::prelude::*;

use serde::{Deserialize, Serialize};

/// Parameters of the atmospheric sky model. Changing this resource
/// re-uploads `SkyUniforms` on the next frame.
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkySettings {
    pub turbidity: f32,
    pub rayleigh: f32,
    pub mie_coefficient: f32,
    pub mie_directional_g: f32,
    /// Sun height above the horizon, in degrees
    pub elevation: f32,
    /// Sun bearing around the vertical axis, in degrees
    pub azimuth: f32,
    /// Tone mapping exposure applied to the final image
    pub exposure: f32,
}

impl SkySettings {
    /// Unit vector towards the sun.
    ///
    /// Spherical to Cartesian with polar angle `90 - elevation` measured from +Y
    /// and azimuth measured from +Z towards +X.
    pub fn sun_position(&self) -> Vector3<f32> {
        let phi = (90.0 - self.elevation).to_radians();
        let theta = self.azimuth.to_radians();

        Vector3::new(
            phi.sin() * theta.sin(),
            phi.cos(),
            phi.sin() * theta.cos(),
        )
    }

    pub fn uniforms(&self) -> SkyUniforms {
        SkyUniforms {
            sun_position: self.sun_position(),
            turbidity: self.turbidity,
            rayleigh: self.rayleigh,
            mie_coefficient: self.mie_coefficient,
            mie_directional_g: self.mie_directional_g,
            exposure: self.exposure,
        }
    }
}

impl Default for SkySettings {
    fn default() -> Self {
        Self {
            turbidity: 10.0,
            rayleigh: 3.0,
            mie_coefficient: 0.005,
            mie_directional_g: 0.7,
            elevation: 2.0,
            azimuth: 180.0,
            exposure: 1.0,
        }
    }
}

#[derive(ShaderType, Debug, Clone, PartialEq)]
pub struct SkyUniforms {
    pub sun_position: Vector3<f32>,
    pub turbidity: f32,
    pub rayleigh: f32,
    pub mie_coefficient: f32,
    pub mie_directional_g: f32,
    pub exposure: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sun(elevation: f32, azimuth: f32) -> Vector3<f32> {
        SkySettings {
            elevation,
            azimuth,
            ..Default::default()
        }
        .sun_position()
    }

    #[test]
    fn zenith_sun_points_straight_up() {
        assert!((sun(90.0, 37.0) - Vector3::y()).norm() < 1e-6);
    }

    #[test]
    fn horizon_sun_follows_azimuth() {
        assert!((sun(0.0, 0.0) - Vector3::z()).norm() < 1e-6);
        assert!((sun(0.0, 90.0) - Vector3::x()).norm() < 1e-6);
        assert!((sun(0.0, 180.0) + Vector3::z()).norm() < 1e-6);
    }

    #[test]
    fn default_sun_sits_just_above_the_horizon() {
        let position = SkySettings::default().sun_position();
        assert!((position.norm() - 1.0).abs() < 1e-6);
        assert!((position.y - 2.0_f32.to_radians().sin()).abs() < 1e-6);
        assert!(position.z < 0.0);
    }

    #[test]
    fn uniforms_carry_every_parameter() {
        let settings = SkySettings::default();
        let uniforms = settings.uniforms();
        assert_eq!(uniforms.turbidity, settings.turbidity);
        assert_eq!(uniforms.rayleigh, settings.rayleigh);
        assert_eq!(uniforms.mie_coefficient, settings.mie_coefficient);
        assert_eq!(uniforms.mie_directional_g, settings.mie_directional_g);
        assert_eq!(uniforms.exposure, settings.exposure);
        assert_eq!(uniforms.sun_position, settings.sun_position());
    }
}
