use jpeg_decoder::PixelFormat;
use log::{info, trace, warn};
use std::io::{BufReader, Cursor};
use std::path::Path;

use crate::vk_utils::{VkAppError, VkAppResult};

/// Decoded image, tightly packed RGBA8 rows.
pub struct TextureData {
  pub width: u32,
  pub height: u32,
  pub pixels: Vec<u8>,
}

impl TextureData {
  pub const CHECKER_SIZE: u32 = 256;
  const CHECKER_TILE: u32 = 32;

  pub fn byte_size(&self) -> usize {
    self.pixels.len()
  }

  /// Gray/green checkerboard, used when the texture file is missing.
  pub fn checker(width: u32, height: u32) -> TextureData {
    let pixel_cnt = (width * height) as usize;
    let mut pixels: Vec<u8> = Vec::with_capacity(pixel_cnt * 4);

    for y in 0..height {
      for x in 0..width {
        let odd = ((x / Self::CHECKER_TILE) + (y / Self::CHECKER_TILE)) % 2 == 1;
        let rgba: [u8; 4] = if odd {
          [60, 140, 40, 255]
        } else {
          [200, 200, 200, 255]
        };
        pixels.extend_from_slice(&rgba);
      }
    }

    TextureData {
      width,
      height,
      pixels,
    }
  }
}

/// Expand 1, 2 or 3 channel pixels to RGBA8.
pub fn expand_to_rgba(bytes: &[u8], channels: usize) -> Vec<u8> {
  match channels {
    4 => bytes.to_vec(),
    3 => bytes
      .chunks_exact(3)
      .flat_map(|c| [c[0], c[1], c[2], 255u8])
      .collect(),
    2 => bytes
      .chunks_exact(2)
      .flat_map(|c| [c[0], c[0], c[0], c[1]])
      .collect(),
    _ => bytes.iter().flat_map(|&c| [c, c, c, 255u8]).collect(),
  }
}

fn decode_png(path: &Path, bytes: Vec<u8>) -> VkAppResult<TextureData> {
  let to_err = |e: png::DecodingError| VkAppError::parse(path, format!("png: {}", e));

  let mut decoder = png::Decoder::new(Cursor::new(bytes));
  decoder.set_transformations(png::Transformations::normalize_to_color8());
  let mut reader = decoder.read_info().map_err(to_err)?;

  let (color_type, _) = reader.output_color_type();
  let (width, height) = (reader.info().width, reader.info().height);
  let channels = color_type.samples();
  trace!("PNG {}x{}, {:?}", width, height, color_type);

  let mut buf = vec![0u8; width as usize * height as usize * channels];
  reader.next_frame(&mut buf).map_err(to_err)?;

  Ok(TextureData {
    width,
    height,
    pixels: expand_to_rgba(&buf, channels),
  })
}

fn decode_jpeg(path: &Path, bytes: Vec<u8>) -> VkAppResult<TextureData> {
  let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(Cursor::new(bytes)));
  let pixel_bytes = decoder
    .decode()
    .map_err(|e| VkAppError::parse(path, format!("jpeg: {}", e)))?;
  let metadata = decoder
    .info()
    .ok_or_else(|| VkAppError::parse(path, "jpeg: missing image info"))?;
  trace!("File meta: {:?}", metadata);

  let channels = match metadata.pixel_format {
    PixelFormat::RGB24 => 3,
    PixelFormat::L8 => 1,
    other => {
      return Err(VkAppError::parse(
        path,
        format!("unsupported jpeg pixel format {:?}", other),
      ))
    }
  };

  Ok(TextureData {
    width: metadata.width as u32,
    height: metadata.height as u32,
    pixels: expand_to_rgba(&pixel_bytes, channels),
  })
}

/// PNG or JPEG, picked by extension. Missing file gives a checkerboard.
pub fn load_texture_file(path: &Path) -> VkAppResult<TextureData> {
  if !path.exists() {
    warn!(
      "Texture '{}' not found, using generated checkerboard",
      path.display()
    );
    return Ok(TextureData::checker(
      TextureData::CHECKER_SIZE,
      TextureData::CHECKER_SIZE,
    ));
  }

  info!("Loading texture from '{}'", path.display());
  let bytes = std::fs::read(path).map_err(|e| VkAppError::io(path, e))?;
  let ext = path
    .extension()
    .map(|e| e.to_string_lossy().to_lowercase())
    .unwrap_or_default();

  let texture = match ext.as_str() {
    "png" => decode_png(path, bytes)?,
    "jpg" | "jpeg" => decode_jpeg(path, bytes)?,
    other => {
      return Err(VkAppError::parse(
        path,
        format!("unsupported texture extension '{}'", other),
      ))
    }
  };

  if texture.width == 0 || texture.height == 0 {
    return Err(VkAppError::parse(path, "texture has no pixels"));
  }
  Ok(texture)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn checker_is_rgba() {
    let tex = TextureData::checker(64, 32);
    assert_eq!(tex.byte_size(), 64 * 32 * 4);
    // first tile
    assert_eq!(&tex.pixels[0..4], &[200, 200, 200, 255]);
    // second tile, same row
    let idx = 32 * 4;
    assert_eq!(&tex.pixels[idx..idx + 4], &[60, 140, 40, 255]);
  }

  #[test]
  fn expands_channels() {
    assert_eq!(expand_to_rgba(&[1, 2, 3], 3), vec![1, 2, 3, 255]);
    assert_eq!(expand_to_rgba(&[7], 1), vec![7, 7, 7, 255]);
    assert_eq!(expand_to_rgba(&[7, 9], 2), vec![7, 7, 7, 9]);
    assert_eq!(expand_to_rgba(&[1, 2, 3, 4], 4), vec![1, 2, 3, 4]);
  }

  #[test]
  fn missing_file_falls_back_to_checker() {
    let tex = load_texture_file(Path::new("./definitely/not/here.png")).unwrap();
    assert_eq!(tex.width, TextureData::CHECKER_SIZE);
    assert_eq!(tex.height, TextureData::CHECKER_SIZE);
  }

  #[test]
  fn decodes_png_from_memory() {
    // 2x1 RGB png, encoded with the same crate
    let mut bytes = Vec::new();
    {
      let mut encoder = png::Encoder::new(&mut bytes, 2, 1);
      encoder.set_color(png::ColorType::Rgb);
      encoder.set_depth(png::BitDepth::Eight);
      let mut writer = encoder.write_header().unwrap();
      writer.write_image_data(&[255, 0, 0, 0, 255, 0]).unwrap();
    }

    let tex = decode_png(Path::new("mem.png"), bytes).unwrap();
    assert_eq!((tex.width, tex.height), (2, 1));
    assert_eq!(tex.pixels, vec![255, 0, 0, 255, 0, 255, 0, 255]);
  }

  #[test]
  fn garbage_png_is_an_error() {
    let res = decode_png(Path::new("bad.png"), vec![1, 2, 3]);
    assert!(matches!(res, Err(VkAppError::ResourceParse { .. })));
  }
}
