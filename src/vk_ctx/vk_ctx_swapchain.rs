use ash;
use ash::extensions::khr::{Surface, Swapchain};
use ash::vk;

pub struct VkCtxSwapchain {
  pub swapchain_loader: Swapchain,
  pub swapchain: vk::SwapchainKHR,
  pub size: vk::Extent2D,
  pub surface_format: vk::SurfaceFormatKHR,
  pub present_mode: vk::PresentModeKHR,

  // All fields below have one entry per swapchain image
  pub images: Vec<vk::Image>,
  pub image_views: Vec<vk::ImageView>,
  pub framebuffers: Vec<vk::Framebuffer>,

  // surface
  pub surface_loader: Surface,
  pub surface_khr: vk::SurfaceKHR,
}

impl VkCtxSwapchain {
  pub fn image_count(&self) -> usize {
    self.images.len()
  }

  pub unsafe fn destroy_framebuffers_and_views(&self, device: &ash::Device) {
    for &framebuffer in &self.framebuffers {
      device.destroy_framebuffer(framebuffer, None);
    }
    for &image_view in &self.image_views {
      device.destroy_image_view(image_view, None);
    }
  }

  /// Will also destroy images. From validation layers:
  /// VK_OBJECT_TYPE_IMAGE; is a presentable image and it is controlled by the implementation and is destroyed with vkDestroySwapchainKHR.
  pub unsafe fn destroy_swapchain_and_surface(&self) {
    self
      .swapchain_loader
      .destroy_swapchain(self.swapchain, None);
    self.surface_loader.destroy_surface(self.surface_khr, None);
  }
}
