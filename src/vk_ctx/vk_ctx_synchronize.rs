use ash;
use ash::vk;

use crate::vk_utils::{create_fences, create_semaphores, VkAppResult};

/**
One triple per frame slot, NOT per swapchain image.
https://www.khronos.org/assets/uploads/developers/library/2016-vulkan-devday-uk/7-Keeping-your-GPU-fed.pdf
*/
pub struct VkCtxSynchronize {
  /// Signaled by acquire, waited on by submit
  pub image_available_semaphores: Vec<vk::Semaphore>,
  /// Signaled by submit, waited on by present
  pub render_finished_semaphores: Vec<vk::Semaphore>,
  /// Signaled when the frame's submit finished on GPU. Created signaled
  pub in_flight_fences: Vec<vk::Fence>,
}

impl VkCtxSynchronize {
  pub fn new(device: &ash::Device, frames_in_flight: usize) -> VkAppResult<Self> {
    Ok(Self {
      image_available_semaphores: create_semaphores(device, frames_in_flight)?,
      render_finished_semaphores: create_semaphores(device, frames_in_flight)?,
      in_flight_fences: create_fences(device, frames_in_flight)?,
    })
  }

  pub fn frames_in_flight(&self) -> usize {
    self.in_flight_fences.len()
  }

  pub unsafe fn destroy(&self, device: &ash::Device) {
    for obj in &self.image_available_semaphores {
      device.destroy_semaphore(*obj, None)
    }

    for obj in &self.render_finished_semaphores {
      device.destroy_semaphore(*obj, None)
    }

    for obj in &self.in_flight_fences {
      device.destroy_fence(*obj, None)
    }
  }
}
