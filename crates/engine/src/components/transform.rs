use crate::prelude::*;

#[derive(Component, Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Point3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    pub fn from_position(position: Point3<f32>) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vector3::new(scale, scale, scale);
        self
    }

    /// Local-to-world matrix (translation * rotation * scale)
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&self.position.coords)
            * self.rotation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

#[derive(Component)]
pub struct GpuTransform {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_matrix_scales_before_translating() {
        let transform = Transform::from_position(Point3::new(1.0, 2.0, 3.0)).with_uniform_scale(10.0);
        let point = transform.model_matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((point - Point3::new(11.0, 2.0, 3.0)).norm() < 1e-5);
    }
}
