use ash::vk;

use super::{VkAppResult, VkResultExt};

/// Fences start signaled, so that the first wait on them does not block.
pub fn create_fences(device: &ash::Device, count: usize) -> VkAppResult<Vec<vk::Fence>> {
  let mut result = Vec::<vk::Fence>::with_capacity(count);

  for _ in 0..count {
    result.push(create_fence(device, vk::FenceCreateFlags::SIGNALED)?);
  }

  Ok(result)
}

pub fn create_fence(device: &ash::Device, flags: vk::FenceCreateFlags) -> VkAppResult<vk::Fence> {
  let create_info = vk::FenceCreateInfo::builder().flags(flags).build();
  unsafe { device.create_fence(&create_info, None) }.on_fail("vkCreateFence")
}
