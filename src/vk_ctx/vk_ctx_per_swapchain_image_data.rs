use ash;
use ash::vk;

/** Handles used by one frame loop iteration */
pub struct VkCtxPerFrameData {
  /// Frame slot, range: [0, frames_in_flight)
  pub slot: usize,
  /// Index of the swapchain image, range: [0, swapchain_image_count)
  pub swapchain_image_idx: usize,
  /// Selected by `swapchain_image_idx`
  pub command_buffer: vk::CommandBuffer,

  // synchronize, selected by `slot`
  pub image_available_semaphore: vk::Semaphore,
  pub render_finished_semaphore: vk::Semaphore,
  pub in_flight_fence: vk::Fence,
}
