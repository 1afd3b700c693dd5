use std::path::Path;
use std::str::FromStr;

use log::trace;

use super::MeshVertex;
use crate::vk_utils::{VkAppError, VkAppResult};

fn parse_tokens<T: FromStr>(path: &Path, text: &str) -> VkAppResult<Vec<T>> {
  text
    .split_whitespace()
    .enumerate()
    .map(|(i, token)| {
      token.parse::<T>().map_err(|_| {
        VkAppError::parse(path, format!("token #{} '{}' is not a valid number", i, token))
      })
    })
    .collect()
}

/// Whitespace separated floats, `MeshVertex::FLOAT_COUNT` per vertex.
pub fn parse_vertices(path: &Path, text: &str) -> VkAppResult<Vec<MeshVertex>> {
  let floats = parse_tokens::<f32>(path, text)?;
  if floats.is_empty() {
    return Err(VkAppError::parse(path, "no vertices"));
  }
  if floats.len() % MeshVertex::FLOAT_COUNT != 0 {
    return Err(VkAppError::parse(
      path,
      format!(
        "{} floats is not a multiple of {}",
        floats.len(),
        MeshVertex::FLOAT_COUNT
      ),
    ));
  }

  Ok(
    floats
      .chunks_exact(MeshVertex::FLOAT_COUNT)
      .map(|c| MeshVertex::new((c[0], c[1]), (c[2], c[3])))
      .collect(),
  )
}

/// Whitespace separated `u16`. Every index has to point into `vertex_count`.
pub fn parse_indices(path: &Path, text: &str, vertex_count: usize) -> VkAppResult<Vec<u16>> {
  let indices = parse_tokens::<u16>(path, text)?;
  if indices.is_empty() {
    return Err(VkAppError::parse(path, "no indices"));
  }
  if let Some((i, idx)) = indices
    .iter()
    .enumerate()
    .find(|(_, &idx)| idx as usize >= vertex_count)
  {
    return Err(VkAppError::parse(
      path,
      format!(
        "index #{} = {} is out of range, there are {} vertices",
        i, idx, vertex_count
      ),
    ));
  }
  Ok(indices)
}

fn read_text(path: &Path) -> VkAppResult<String> {
  std::fs::read_to_string(path).map_err(|e| VkAppError::io(path, e))
}

pub fn load_mesh_files(
  vertices_path: &Path,
  indices_path: &Path,
) -> VkAppResult<(Vec<MeshVertex>, Vec<u16>)> {
  let vertices = parse_vertices(vertices_path, &read_text(vertices_path)?)?;
  let indices = parse_indices(indices_path, &read_text(indices_path)?, vertices.len())?;
  trace!(
    "Mesh loaded: {} vertices, {} indices",
    vertices.len(),
    indices.len()
  );
  Ok((vertices, indices))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn p() -> &'static Path {
    Path::new("test.txt")
  }

  #[test]
  fn parses_vertices() {
    let text = "-0.5 -0.5 1.0 0.0\n 0.5 -0.5 0.0 0.0\n\t0.5 0.5 0.0 1.0";
    let verts = parse_vertices(p(), text).unwrap();
    assert_eq!(verts.len(), 3);
    assert_eq!(verts[0], MeshVertex::new((-0.5, -0.5), (1.0, 0.0)));
    assert_eq!(verts[2], MeshVertex::new((0.5, 0.5), (0.0, 1.0)));
  }

  #[test]
  fn rejects_partial_vertex() {
    let err = parse_vertices(p(), "1 2 3 4 5").unwrap_err();
    assert!(err.to_string().contains("not a multiple of 4"), "{}", err);
  }

  #[test]
  fn rejects_bad_token() {
    let err = parse_vertices(p(), "1 2 x 4").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("'x'"), "{}", msg);
    assert!(msg.contains("test.txt"), "{}", msg);
  }

  #[test]
  fn rejects_empty_files() {
    assert!(parse_vertices(p(), "  \n").is_err());
    assert!(parse_indices(p(), "", 4).is_err());
  }

  #[test]
  fn parses_indices() {
    let indices = parse_indices(p(), "0 1 2 2 3 0\n", 4).unwrap();
    assert_eq!(indices, vec![0, 1, 2, 2, 3, 0]);
  }

  #[test]
  fn rejects_out_of_range_index() {
    let err = parse_indices(p(), "0 1 4", 4).unwrap_err();
    assert!(err.to_string().contains("out of range"), "{}", err);
  }

  #[test]
  fn rejects_negative_or_huge_index() {
    assert!(parse_indices(p(), "0 -1 2", 4).is_err());
    assert!(parse_indices(p(), "0 70000 2", 4).is_err());
  }
}
