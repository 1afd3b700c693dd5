use bytemuck;
use glam::{Mat4, Vec3};

use crate::config::Config;

/// Model/view/projection block, binding 1 of the mesh shader.
/// Rewritten every frame into the uniform buffer of the acquired swapchain image.
#[derive(Copy, Clone, Debug)]
#[repr(C)]
pub struct MeshUBO {
  pub model: Mat4,
  pub view: Mat4,
  pub projection: Mat4,
}
unsafe impl bytemuck::Zeroable for MeshUBO {}
unsafe impl bytemuck::Pod for MeshUBO {}

impl MeshUBO {
  pub fn size_bytes() -> usize {
    std::mem::size_of::<MeshUBO>()
  }
}

/// Everything needed to turn elapsed time into `MeshUBO`.
#[derive(Clone, Debug)]
pub struct MeshTransform {
  pub fov_dgr: f32,
  pub z_near: f32,
  pub z_far: f32,
  pub eye: Vec3,
  pub target: Vec3,
  pub up: Vec3,
  pub rotation_speed_dgr: f32,
  pub rotation_axis: Vec3,
}

impl MeshTransform {
  pub fn from_config(config: &Config) -> Self {
    let camera = &config.camera;
    Self {
      fov_dgr: camera.fov_dgr,
      z_near: camera.z_near,
      z_far: camera.z_far,
      eye: camera.position,
      target: camera.target,
      up: camera.up,
      rotation_speed_dgr: config.model_rotation_speed_dgr,
      rotation_axis: config.model_rotation_axis,
    }
  }

  /// - `elapsed_sec` - time since the frame loop started
  /// - `aspect_ratio` - swapchain width / height
  pub fn compute(&self, elapsed_sec: f32, aspect_ratio: f32) -> MeshUBO {
    let angle = (elapsed_sec * self.rotation_speed_dgr).to_radians();
    let axis = self.rotation_axis.try_normalize().unwrap_or(Vec3::Z);
    let model = Mat4::from_axis_angle(axis, angle);

    let view = Mat4::look_at_rh(self.eye, self.target, self.up);

    let mut projection = Mat4::perspective_rh(
      self.fov_dgr.to_radians(),
      aspect_ratio,
      self.z_near,
      self.z_far,
    );
    // Vulkan clip space has y pointing down
    projection.y_axis.y *= -1.0;

    MeshUBO {
      model,
      view,
      projection,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use glam::{vec3, Vec4};

  fn transform() -> MeshTransform {
    MeshTransform::from_config(&Config::new())
  }

  #[test]
  fn ubo_is_three_matrices() {
    assert_eq!(MeshUBO::size_bytes(), 3 * 16 * 4);
  }

  #[test]
  fn no_rotation_gives_identity_model() {
    let ubo = transform().compute(123.0, 1.0);
    assert!(ubo.model.abs_diff_eq(Mat4::IDENTITY, 1e-6));
  }

  #[test]
  fn model_rotates_with_time() {
    let mut t = transform();
    t.rotation_speed_dgr = 90.0;
    let ubo = t.compute(1.0, 1.0);
    let rotated = ubo.model.transform_point3(vec3(1.0, 0.0, 0.0));
    assert!(rotated.abs_diff_eq(vec3(0.0, 1.0, 0.0), 1e-5), "{:?}", rotated);
  }

  #[test]
  fn view_moves_eye_to_origin() {
    let ubo = transform().compute(0.0, 1.0);
    let eye = ubo.view.transform_point3(vec3(2.0, 2.0, 2.0));
    assert!(eye.abs_diff_eq(Vec3::ZERO, 1e-5), "{:?}", eye);
    // target is straight ahead, i.e. on -Z in view space
    let target = ubo.view.transform_point3(Vec3::ZERO);
    assert!(target.x.abs() < 1e-5 && target.y.abs() < 1e-5 && target.z < 0.0);
  }

  #[test]
  fn projection_flips_y() {
    let ubo = transform().compute(0.0, 1.0);
    assert!(ubo.projection.y_axis.y < 0.0);
    assert!(ubo.projection.x_axis.x > 0.0);

    // point above the view axis ends up with negative clip y
    let clip = ubo.projection * Vec4::new(0.0, 1.0, -5.0, 1.0);
    assert!(clip.y / clip.w < 0.0);
  }

  #[test]
  fn aspect_ratio_scales_x() {
    let t = transform();
    let square = t.compute(0.0, 1.0);
    let wide = t.compute(0.0, 2.0);
    let ratio = square.projection.x_axis.x / wide.projection.x_axis.x;
    assert!((ratio - 2.0).abs() < 1e-5);
  }
}
