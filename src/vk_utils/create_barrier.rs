use ash;
use ash::vk;

use super::{VkAppError, VkAppResult};

/// Access masks and pipeline stages for a single image layout transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutTransitionMasks {
  pub src_access_mask: vk::AccessFlags,
  pub dst_access_mask: vk::AccessFlags,
  pub src_stage: vk::PipelineStageFlags,
  pub dst_stage: vk::PipelineStageFlags,
}

/// Only the transitions needed to upload a sampled texture are known.
///
/// https://vulkan-tutorial.com/Texture_mapping/Images#page_Transition-barrier-masks
pub fn layout_transition_masks(
  old_layout: vk::ImageLayout,
  new_layout: vk::ImageLayout,
) -> VkAppResult<LayoutTransitionMasks> {
  match (old_layout, new_layout) {
    (vk::ImageLayout::UNDEFINED, vk::ImageLayout::TRANSFER_DST_OPTIMAL) => {
      Ok(LayoutTransitionMasks {
        src_access_mask: vk::AccessFlags::empty(),
        dst_access_mask: vk::AccessFlags::TRANSFER_WRITE,
        src_stage: vk::PipelineStageFlags::TOP_OF_PIPE,
        dst_stage: vk::PipelineStageFlags::TRANSFER,
      })
    }
    (vk::ImageLayout::TRANSFER_DST_OPTIMAL, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL) => {
      Ok(LayoutTransitionMasks {
        src_access_mask: vk::AccessFlags::TRANSFER_WRITE,
        dst_access_mask: vk::AccessFlags::SHADER_READ,
        src_stage: vk::PipelineStageFlags::TRANSFER,
        dst_stage: vk::PipelineStageFlags::FRAGMENT_SHADER,
      })
    }
    (old, new) => Err(VkAppError::UnsupportedLayoutTransition(old, new)),
  }
}

pub fn create_image_barrier(
  image: vk::Image,
  aspect_mask: vk::ImageAspectFlags,
  old_layout: vk::ImageLayout,
  new_layout: vk::ImageLayout,
  src_access_mask: vk::AccessFlags,
  dst_access_mask: vk::AccessFlags,
) -> vk::ImageMemoryBarrier {
  vk::ImageMemoryBarrier::builder()
    .old_layout(old_layout)
    .new_layout(new_layout)
    .src_access_mask(src_access_mask)
    .dst_access_mask(dst_access_mask)
    .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
    .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
    .image(image)
    .subresource_range(vk::ImageSubresourceRange {
      aspect_mask,
      base_mip_level: 0,
      level_count: 1, // vk::REMAINING_MIP_LEVELS
      base_array_layer: 0,
      layer_count: 1, // vk::REMAINING_ARRAY_LAYERS
    })
    .build()
}

/// Record the barrier that moves `image` from `old_layout` to `new_layout`.
pub unsafe fn cmd_transition_image_layout(
  device: &ash::Device,
  cmd_buf: vk::CommandBuffer,
  image: vk::Image,
  old_layout: vk::ImageLayout,
  new_layout: vk::ImageLayout,
) -> VkAppResult<()> {
  let masks = layout_transition_masks(old_layout, new_layout)?;
  let barrier = create_image_barrier(
    image,
    vk::ImageAspectFlags::COLOR,
    old_layout,
    new_layout,
    masks.src_access_mask,
    masks.dst_access_mask,
  );

  device.cmd_pipeline_barrier(
    cmd_buf,
    masks.src_stage,
    masks.dst_stage,
    vk::DependencyFlags::empty(),
    &[],
    &[],
    &[barrier],
  );
  Ok(())
}
