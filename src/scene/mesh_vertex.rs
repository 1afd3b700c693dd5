use ash::vk;
use bytemuck;
use glam::Vec2;

/// Vertex layout of the animated mesh: 2D position and uv, 16 bytes.
#[derive(Copy, Clone, Debug, PartialEq)]
#[repr(C)]
pub struct MeshVertex {
  pub position: Vec2,
  pub uv: Vec2,
}
unsafe impl bytemuck::Zeroable for MeshVertex {}
unsafe impl bytemuck::Pod for MeshVertex {}

impl MeshVertex {
  /// Floats per vertex in the mesh text file
  pub const FLOAT_COUNT: usize = 4;

  pub const BINDINGS_DESC: [vk::VertexInputBindingDescription; 1] =
    [vk::VertexInputBindingDescription {
      binding: 0,
      input_rate: vk::VertexInputRate::VERTEX,
      stride: std::mem::size_of::<MeshVertex>() as u32,
    }];

  pub const ATTRIBUTES_DESC: [vk::VertexInputAttributeDescription; 2] = [
    // position
    vk::VertexInputAttributeDescription {
      binding: 0,
      location: 0,
      format: vk::Format::R32G32_SFLOAT,
      offset: 0,
    },
    // uv
    vk::VertexInputAttributeDescription {
      binding: 0,
      location: 1,
      format: vk::Format::R32G32_SFLOAT,
      // offsetted by 'position' from beginning of structure
      offset: std::mem::size_of::<Vec2>() as u32,
    },
  ];

  pub fn new(pos: (f32, f32), uv: (f32, f32)) -> MeshVertex {
    MeshVertex {
      position: Vec2::new(pos.0, pos.1),
      uv: Vec2::new(uv.0, uv.1),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn layout_matches_pipeline_description() {
    assert_eq!(std::mem::size_of::<MeshVertex>(), 16);
    assert_eq!(MeshVertex::BINDINGS_DESC[0].stride, 16);
    assert_eq!(MeshVertex::ATTRIBUTES_DESC[0].offset, 0);
    assert_eq!(MeshVertex::ATTRIBUTES_DESC[1].offset, 8);
  }

  #[test]
  fn casts_to_tightly_packed_floats() {
    let verts = [MeshVertex::new((1.0, 2.0), (3.0, 4.0))];
    let floats: &[f32] = bytemuck::cast_slice(&verts);
    assert_eq!(floats, &[1.0, 2.0, 3.0, 4.0]);
  }
}
