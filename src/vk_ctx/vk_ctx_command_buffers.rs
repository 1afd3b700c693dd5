use ash;
use ash::vk;

pub struct VkCtxCommandBuffers {
  pub pool: vk::CommandPool,
  // one per each swapchain image, recorded once:
  pub cmd_buffers: Vec<vk::CommandBuffer>,
}

impl VkCtxCommandBuffers {
  /// Frees the command buffers too
  pub unsafe fn destroy(&self, device: &ash::Device) {
    device.destroy_command_pool(self.pool, None);
  }
}
