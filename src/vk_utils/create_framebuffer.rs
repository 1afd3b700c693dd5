use ash;
use ash::vk;
use log::trace;

use super::{VkAppResult, VkResultExt};

/// One framebuffer per swapchain image view.
pub fn create_framebuffers_with_one_attachment(
  device: &ash::Device,
  render_pass: vk::RenderPass,
  image_views: &[vk::ImageView],
  size: &vk::Extent2D,
) -> VkAppResult<Vec<vk::Framebuffer>> {
  trace!("Will create {} framebuffers {:?}", image_views.len(), size);
  image_views
    .iter()
    .map(|&iv| create_framebuffer(device, render_pass, &[iv], size))
    .collect()
}

pub fn create_framebuffer(
  device: &ash::Device,
  render_pass: vk::RenderPass,
  image_views: &[vk::ImageView],
  size: &vk::Extent2D,
) -> VkAppResult<vk::Framebuffer> {
  let create_info = vk::FramebufferCreateInfo::builder()
    .render_pass(render_pass)
    .attachments(image_views)
    .width(size.width)
    .height(size.height)
    .layers(1)
    .build();

  unsafe { device.create_framebuffer(&create_info, None) }.on_fail("vkCreateFramebuffer")
}
