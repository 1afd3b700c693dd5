use log::info;

use crate::config::Config;
use crate::vk_utils::VkAppResult;

pub use self::mesh_file::*;
pub use self::mesh_vertex::MeshVertex;
pub use self::texture_file::*;

mod mesh_file;
mod mesh_vertex;
mod texture_file;

/// CPU-side copy of everything that is uploaded once before the first frame.
pub struct SceneData {
  pub vertices: Vec<MeshVertex>,
  pub indices: Vec<u16>,
  pub texture: TextureData,
}

impl SceneData {
  pub fn index_count(&self) -> u32 {
    self.indices.len() as u32
  }
}

pub fn load_scene(config: &Config) -> VkAppResult<SceneData> {
  let (vertices, indices) = load_mesh_files(&config.vertices_path, &config.indices_path)?;
  let texture = load_texture_file(&config.texture_path)?;
  info!(
    "Scene: {} vertices, {} indices, texture {}x{}",
    vertices.len(),
    indices.len(),
    texture.width,
    texture.height
  );

  Ok(SceneData {
    vertices,
    indices,
    texture,
  })
}
