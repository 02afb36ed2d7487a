use crate::prelude::*;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "lookaround.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    pub scale: f32,
    pub position: [f32; 3],
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("public/models/station.glb"),
            scale: 10.0,
            position: [0.0, 0.0, 0.0],
        }
    }
}

impl ModelConfig {
    pub fn placement(&self) -> Transform {
        Transform::from_position(Point3::from(self.position)).with_uniform_scale(self.scale)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    /// Point the camera initially faces. `None` keeps the zero orientation.
    pub target: Option<[f32; 3]>,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [-2.0, 1.0, -2.0],
            target: Some([0.0, 0.0, 0.0]),
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl CameraConfig {
    pub fn camera(&self) -> Camera {
        Camera {
            is_main: true,
            fovy: self.fov_degrees.to_radians(),
            znear: self.near,
            zfar: self.far,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub directional: DirectionalLight,
    pub ambient: AmbientLight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub title: String,
    pub model: ModelConfig,
    pub camera: CameraConfig,
    pub look: LookConfig,
    pub lighting: LightingConfig,
    pub sky: SkySettings,
    /// Background as 0xRRGGBB
    pub clear_color: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: String::from("lookaround"),
            model: ModelConfig::default(),
            camera: CameraConfig::default(),
            look: LookConfig::default(),
            lighting: LightingConfig::default(),
            sky: SkySettings::default(),
            clear_color: 0x202020,
        }
    }
}

impl ViewerConfig {
    /// Read the config at `path`, or `lookaround.ron` in the working
    /// directory, falling back to the built-in scene when neither is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    log::info!("No config file given, using the built-in scene");
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_ron(&source)
            .with_context(|| format!("parsing config {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_ron(source: &str) -> Result<Self> {
        Ok(ron::from_str(source)?)
    }

    /// Look settings with the starting view taken from the camera when the
    /// look block does not set one itself.
    pub fn look_config(&self) -> LookConfig {
        let mut look = self.look.clone();
        if look.initial_look_at.is_none() {
            look.initial_look_at = self.camera.target.map(|target| LookAt {
                eye: self.camera.position,
                target,
            });
        }
        look
    }

    pub fn model_request(&self) -> ModelRequest {
        ModelRequest {
            label: String::from("Model"),
            path: self.model.path.clone(),
            placement: self.model.placement(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_station_scene() {
        let config = ViewerConfig::default();

        assert_eq!(config.model.path, PathBuf::from("public/models/station.glb"));
        assert_eq!(config.model.scale, 10.0);
        assert_eq!(config.camera.position, [-2.0, 1.0, -2.0]);
        assert_eq!(config.lighting.directional.intensity, 2.0);
        assert_eq!(config.lighting.ambient.intensity, 0.5);
        assert_eq!(config.clear_color, 0x202020);
        assert_eq!(config.look.mode, LookMode::Drag);

        let camera = config.camera.camera();
        assert!(camera.is_main);
        assert!((camera.fovy - 75f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn partial_ron_keeps_defaults_for_missing_fields() {
        let config = ViewerConfig::from_ron(
            r#"(
                model: (path: "scene.glb"),
                look: (mode: ambient, horizontal_scale: 0.25),
                lighting: (directional: (intensity: 3.0)),
                sky: (elevation: 10.0),
                clear_color: 0xff0000,
            )"#,
        )
        .unwrap();

        assert_eq!(config.model.path, PathBuf::from("scene.glb"));
        assert_eq!(config.model.scale, 10.0);
        assert_eq!(config.look.mode, LookMode::Ambient);
        assert_eq!(config.look.horizontal_scale, 0.25);
        assert_eq!(config.look.vertical_scale, LookConfig::default().vertical_scale);
        assert_eq!(config.lighting.directional.intensity, 3.0);
        assert_eq!(config.lighting.directional.position, [1.0, 1.0, 1.0]);
        assert_eq!(config.sky.elevation, 10.0);
        assert_eq!(config.sky.turbidity, 10.0);
        assert_eq!(config.clear_color, 0xff0000);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn malformed_ron_is_an_error() {
        assert!(ViewerConfig::from_ron("(model: 3)").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = std::env::temp_dir().join("lookaround-missing-config.ron");
        let _ = std::fs::remove_file(&path);
        assert!(ViewerConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn look_at_comes_from_camera_unless_overridden() {
        let config = ViewerConfig::default();
        assert_eq!(
            config.look_config().initial_look_at,
            Some(LookAt {
                eye: [-2.0, 1.0, -2.0],
                target: [0.0, 0.0, 0.0],
            })
        );

        let mut config = ViewerConfig::default();
        config.look.initial_look_at = Some(LookAt {
            eye: [0.0, 0.0, 0.0],
            target: [0.0, 0.0, -1.0],
        });
        assert_eq!(
            config.look_config().initial_look_at.map(|look_at| look_at.target),
            Some([0.0, 0.0, -1.0])
        );

        let mut config = ViewerConfig::default();
        config.camera.target = None;
        assert_eq!(config.look_config().initial_look_at, None);
    }

    #[test]
    fn model_request_carries_placement() {
        let mut config = ViewerConfig::default();
        config.model.position = [1.0, 2.0, 3.0];
        let request = config.model_request();

        assert_eq!(request.placement.position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(request.placement.scale, Vector3::new(10.0, 10.0, 10.0));
    }
}
