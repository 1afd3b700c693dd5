use ash;
use ash::vk;
use log::trace;

use super::{VkAppResult, VkResultExt};

/// Single color attachment that is cleared on load and presented afterwards.
pub fn create_render_pass(
  device: &ash::Device,
  image_format: vk::Format,
) -> VkAppResult<vk::RenderPass> {
  let attachments = [vk::AttachmentDescription::builder()
    .format(image_format)
    .samples(vk::SampleCountFlags::TYPE_1) // single sampled
    .load_op(vk::AttachmentLoadOp::CLEAR)
    .store_op(vk::AttachmentStoreOp::STORE)
    .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
    .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
    .initial_layout(vk::ImageLayout::UNDEFINED)
    .final_layout(vk::ImageLayout::PRESENT_SRC_KHR)
    .build()];

  let color_refs = [vk::AttachmentReference {
    attachment: 0, // from the array above
    layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
  }];

  let subpasses = [vk::SubpassDescription::builder()
    .color_attachments(&color_refs) // OUTPUT
    .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
    .build()];
  trace!("Subpass created, will be used to create render pass");

  // image-available semaphore is waited on at COLOR_ATTACHMENT_OUTPUT,
  // so the layout transition has to wait for it too
  let dependencies = [vk::SubpassDependency::builder()
    .src_subpass(vk::SUBPASS_EXTERNAL)
    .dst_subpass(0)
    .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
    .src_access_mask(vk::AccessFlags::empty())
    .dst_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
    .dst_access_mask(
      vk::AccessFlags::COLOR_ATTACHMENT_READ | vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
    )
    .build()];

  let create_info = vk::RenderPassCreateInfo::builder()
    .dependencies(&dependencies)
    .attachments(&attachments)
    .subpasses(&subpasses)
    .build();

  unsafe { device.create_render_pass(&create_info, None) }.on_fail("vkCreateRenderPass")
}
