use std::mem::ManuallyDrop;

use ash;
use ash::vk;

pub struct VkCtxDevice {
  pub phys_device: vk::PhysicalDevice,
  pub queue_family_index: u32,
  pub device: ash::Device,
  /// Graphics and present
  pub queue: vk::Queue,
  pub mem_properties: vk::PhysicalDeviceMemoryProperties,
  /// `None` if device has no `sampler_anisotropy`
  pub max_sampler_anisotropy: Option<f32>,
  /// Every buffer and image is allocated from here. Dropped right before the device
  pub allocator: ManuallyDrop<vma::Allocator>,
}

impl VkCtxDevice {
  /// Call at most once, after all allocations were freed.
  pub unsafe fn destroy(&mut self) {
    ManuallyDrop::drop(&mut self.allocator);
    self.device.destroy_device(None);
  }
}
