use ash;
use ash::vk;

use super::{VkAppResult, VkResultExt};

/// Linear filtering, repeat on every axis.
/// - `max_anisotropy` - `None` if the device does not support `sampler_anisotropy`
pub fn create_sampler(
  device: &ash::Device,
  max_anisotropy: Option<f32>,
) -> VkAppResult<vk::Sampler> {
  let create_info = vk::SamplerCreateInfo::builder()
    .mag_filter(vk::Filter::LINEAR)
    .min_filter(vk::Filter::LINEAR)
    .address_mode_u(vk::SamplerAddressMode::REPEAT)
    .address_mode_v(vk::SamplerAddressMode::REPEAT)
    .address_mode_w(vk::SamplerAddressMode::REPEAT)
    .anisotropy_enable(max_anisotropy.is_some())
    .max_anisotropy(max_anisotropy.unwrap_or(1.0))
    .compare_enable(false)
    .compare_op(vk::CompareOp::ALWAYS)
    .border_color(vk::BorderColor::INT_OPAQUE_BLACK)
    .unnormalized_coordinates(false) // address with [0, 1) instead of [0, tex_width)
    // mipmaps:
    .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
    .mip_lod_bias(0f32)
    .min_lod(0f32)
    .max_lod(0f32)
    .build();

  unsafe { device.create_sampler(&create_info, None) }.on_fail("vkCreateSampler")
}
