use log::trace;
use std::ffi::CStr;
use std::path::Path;

use ash;
use ash::vk;

use super::{VkAppError, VkAppResult, VkResultExt};

// https://github.com/zeux/niagara/blob/master/src/shaders.cpp

fn load_shader_module(device: &ash::Device, path: &Path) -> VkAppResult<vk::ShaderModule> {
  trace!("Loading shader from {}", path.to_string_lossy());

  let mut file = std::fs::File::open(path).map_err(|e| VkAppError::io(path, e))?;
  let spirv_code = ash::util::read_spv(&mut file).map_err(|e| VkAppError::io(path, e))?;
  let create_info = vk::ShaderModuleCreateInfo::builder()
    .code(&spirv_code)
    .build();

  unsafe { device.create_shader_module(&create_info, None) }.on_fail("vkCreateShaderModule")
}

const SHADER_ENTRY_POINT: &[u8] = b"main\0";

/// Entry point is always `main`.
pub fn load_shader(
  device: &ash::Device,
  stage: vk::ShaderStageFlags,
  path: &Path,
) -> VkAppResult<(vk::ShaderModule, vk::PipelineShaderStageCreateInfo)> {
  let shader_fn_name = unsafe { CStr::from_bytes_with_nul_unchecked(SHADER_ENTRY_POINT) };

  let shader_module = load_shader_module(device, path)?;

  let stage_stage = vk::PipelineShaderStageCreateInfo::builder()
    .stage(stage)
    .module(shader_module)
    .name(shader_fn_name)
    .build();
  trace!("Shader {:?} loaded from {}", stage, path.to_string_lossy());

  Ok((shader_module, stage_stage))
}
