use std::path::PathBuf;

use ash::vk;
use glam::{vec3, Vec3};
use log::LevelFilter;

use crate::vk_utils::{VkAppError, VkAppResult};

pub struct CameraConfig {
  pub fov_dgr: f32,
  pub z_near: f32,
  pub z_far: f32,
  pub position: Vec3,
  pub target: Vec3,
  pub up: Vec3,
}

impl Default for CameraConfig {
  fn default() -> Self {
    Self {
      fov_dgr: 45.0,
      z_near: 0.1,
      z_far: 10.0,
      position: vec3(2.0, 2.0, 2.0),
      target: Vec3::ZERO,
      up: Vec3::Z,
    }
  }
}

pub struct Config {
  // window
  pub window_title: String,
  pub window_width: f64,
  pub window_height: f64,
  // vulkan
  pub frames_in_flight: usize,
  /// Enable validation layers and the debug messenger
  pub validation: bool,
  /// First one that is installed wins
  pub validation_layer_candidates: Vec<String>,
  pub log_level: LevelFilter,
  // draw
  pub instance_count: u32,
  pub clear_color: [f32; 4],
  pub camera: CameraConfig,
  /// Degrees per second around `model_rotation_axis`
  pub model_rotation_speed_dgr: f32,
  pub model_rotation_axis: Vec3,
  // files
  pub vertex_shader_path: PathBuf,
  pub fragment_shader_path: PathBuf,
  pub vertices_path: PathBuf,
  pub indices_path: PathBuf,
  pub texture_path: PathBuf,
}

impl Config {
  pub const MAX_FRAMES_IN_FLIGHT: usize = 3;
  pub const ENV_VALIDATION: &'static str = "VK_DEMO_VALIDATION";
  pub const ENV_FRAMES_IN_FLIGHT: &'static str = "VK_DEMO_FRAMES_IN_FLIGHT";

  /// Diffuse texture, so sRGB
  pub const TEXTURE_FORMAT: vk::Format = vk::Format::R8G8B8A8_SRGB;

  pub fn new() -> Config {
    Config {
      window_title: String::from("Vulkan"),
      window_width: 600f64,
      window_height: 600f64,
      frames_in_flight: 2,
      validation: cfg!(debug_assertions),
      validation_layer_candidates: vec![
        String::from("VK_LAYER_KHRONOS_validation"),
        String::from("VK_LAYER_LUNARG_standard_validation"),
      ],
      log_level: if cfg!(debug_assertions) {
        LevelFilter::Trace
      } else {
        LevelFilter::Info
      },
      instance_count: 2,
      clear_color: [0.0, 0.0, 0.0, 1.0],
      camera: CameraConfig::default(),
      model_rotation_speed_dgr: 0.0,
      model_rotation_axis: Vec3::Z,
      vertex_shader_path: PathBuf::from("./src/shaders-compiled/mesh.vert.spv"),
      fragment_shader_path: PathBuf::from("./src/shaders-compiled/mesh.frag.spv"),
      vertices_path: PathBuf::from("./assets/vertex.txt"),
      indices_path: PathBuf::from("./assets/index.txt"),
      texture_path: PathBuf::from("./assets/grass-texture.png"),
    }
  }

  /// `Config::new()` with overrides from process environment.
  pub fn from_env() -> VkAppResult<Config> {
    let mut config = Config::new();
    config.apply_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
  }

  pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> VkAppResult<()> {
    if let Some(value) = lookup(Self::ENV_VALIDATION) {
      self.validation = match value.trim() {
        "1" | "true" | "on" => true,
        "0" | "false" | "off" => false,
        other => {
          return Err(VkAppError::InvalidConfig(format!(
            "{}='{}', expected 0 or 1",
            Self::ENV_VALIDATION,
            other
          )))
        }
      };
    }

    if let Some(value) = lookup(Self::ENV_FRAMES_IN_FLIGHT) {
      self.frames_in_flight = value.trim().parse::<usize>().map_err(|_| {
        VkAppError::InvalidConfig(format!(
          "{}='{}' is not a number",
          Self::ENV_FRAMES_IN_FLIGHT,
          value
        ))
      })?;
    }

    Ok(())
  }

  pub fn validate(&self) -> VkAppResult<()> {
    if self.frames_in_flight < 1 || self.frames_in_flight > Self::MAX_FRAMES_IN_FLIGHT {
      return Err(VkAppError::InvalidConfig(format!(
        "frames_in_flight must be in [1, {}], got {}",
        Self::MAX_FRAMES_IN_FLIGHT,
        self.frames_in_flight
      )));
    }
    if self.instance_count == 0 {
      return Err(VkAppError::InvalidConfig(String::from(
        "instance_count must be at least 1",
      )));
    }
    if self.validation && self.validation_layer_candidates.is_empty() {
      return Err(VkAppError::InvalidConfig(String::from(
        "validation is on, but there are no validation layers to pick from",
      )));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    move |key| map.get(key).cloned()
  }

  #[test]
  fn defaults_are_valid() {
    let config = Config::new();
    assert!(config.validate().is_ok());
    assert_eq!(config.frames_in_flight, 2);
    assert_eq!(config.instance_count, 2);
    assert_eq!(config.window_width, 600f64);
    assert_eq!(config.window_height, 600f64);
    assert_eq!(config.clear_color, [0.0, 0.0, 0.0, 1.0]);
  }

  #[test]
  fn rejects_bad_frames_in_flight() {
    let mut config = Config::new();
    config.frames_in_flight = 0;
    assert!(config.validate().is_err());
    config.frames_in_flight = 4;
    assert!(config.validate().is_err());
    config.frames_in_flight = 3;
    assert!(config.validate().is_ok());
  }

  #[test]
  fn rejects_zero_instances() {
    let mut config = Config::new();
    config.instance_count = 0;
    assert!(matches!(
      config.validate(),
      Err(VkAppError::InvalidConfig(_))
    ));
  }

  #[test]
  fn env_overrides() {
    let mut config = Config::new();
    config
      .apply_overrides(env(&[
        (Config::ENV_VALIDATION, "0"),
        (Config::ENV_FRAMES_IN_FLIGHT, "3"),
      ]))
      .unwrap();
    assert!(!config.validation);
    assert_eq!(config.frames_in_flight, 3);

    config
      .apply_overrides(env(&[(Config::ENV_VALIDATION, "1")]))
      .unwrap();
    assert!(config.validation);
    assert_eq!(config.frames_in_flight, 3);
  }

  #[test]
  fn env_overrides_reject_garbage() {
    let mut config = Config::new();
    assert!(config
      .apply_overrides(env(&[(Config::ENV_FRAMES_IN_FLIGHT, "two")]))
      .is_err());
    assert!(config
      .apply_overrides(env(&[(Config::ENV_VALIDATION, "maybe")]))
      .is_err());
  }
}
