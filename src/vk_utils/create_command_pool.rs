use ash::vk;

use super::{VkAppResult, VkResultExt};

pub fn create_command_pool(
  device: &ash::Device,
  queue_family_index: u32,
) -> VkAppResult<vk::CommandPool> {
  // Draw command buffers are recorded once and never reset,
  // so neither RESET_COMMAND_BUFFER nor TRANSIENT is needed
  let cmd_pool_create_info = vk::CommandPoolCreateInfo::builder()
    .queue_family_index(queue_family_index)
    .flags(vk::CommandPoolCreateFlags::empty())
    .build();

  unsafe { device.create_command_pool(&cmd_pool_create_info, None) }
    .on_fail("vkCreateCommandPool")
}
