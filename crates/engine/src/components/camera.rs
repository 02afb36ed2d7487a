use crate::prelude::*;

/// Perspective camera. Position and facing come from the entity's
/// `Transform`; the camera looks down its local -Z axis.
#[derive(Component)]
pub struct Camera {
    pub is_main: bool,
    /// Vertical field of view in radians
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    /// World-to-view matrix for a camera placed at `transform`
    pub fn view_matrix(transform: &Transform) -> Matrix4<f32> {
        Isometry3::from_parts(
            Translation3::from(transform.position.coords),
            transform.rotation,
        )
        .inverse()
        .to_homogeneous()
    }

    pub fn projection_matrix(&self, aspect: f32) -> Matrix4<f32> {
        OPENGL_TO_WGPU * Perspective3::new(aspect, self.fovy, self.znear, self.zfar).to_homogeneous()
    }

    pub fn view_projection(&self, transform: &Transform, aspect: f32) -> Matrix4<f32> {
        self.projection_matrix(aspect) * Self::view_matrix(transform)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            is_main: true,
            fovy: 75.0_f32.to_radians(),
            znear: 0.1,
            zfar: 1000.0,
        }
    }
}

#[rustfmt::skip]
const OPENGL_TO_WGPU: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

#[derive(Component)]
pub struct GpuCamera {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub aspect: f32,
}

#[derive(Component)]
pub struct RenderTarget {}

#[derive(Component)]
pub struct GpuRenderTarget {
    pub texture: wgpu::Texture,
    pub depth: wgpu::Texture,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(matrix: &Matrix4<f32>, point: Point3<f32>) -> Point3<f32> {
        let clip = matrix * point.to_homogeneous();
        Point3::from(clip.xyz() / clip.w)
    }

    #[test]
    fn view_moves_camera_to_origin() {
        let transform = Transform {
            position: Point3::new(-2.0, 1.0, -2.0),
            ..Default::default()
        };

        let view = Camera::view_matrix(&transform);
        let eye = view.transform_point(&transform.position);
        assert!(eye.coords.norm() < 1e-6);
    }

    #[test]
    fn point_ahead_projects_to_screen_center() {
        let camera = Camera::default();
        let transform = Transform {
            position: Point3::new(0.0, 0.0, 5.0),
            // Quarter turn left about +Y, so forward is -X
            rotation: UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f32::consts::FRAC_PI_2),
            ..Default::default()
        };

        let ndc = project(&camera.view_projection(&transform, 16.0 / 9.0), Point3::new(-10.0, 0.0, 5.0));
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn depth_range_maps_near_and_far_to_unit_interval() {
        let camera = Camera::default();
        let transform = Transform::default();
        let matrix = camera.view_projection(&transform, 1.0);

        let near = project(&matrix, Point3::new(0.0, 0.0, -camera.znear));
        let far = project(&matrix, Point3::new(0.0, 0.0, -camera.zfar));
        assert!(near.z.abs() < 1e-4);
        assert!((far.z - 1.0).abs() < 1e-4);
    }
}
