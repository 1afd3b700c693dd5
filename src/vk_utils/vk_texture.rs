use ash;
use ash::vk;
use log::trace;
use vma::Alloc;

use super::{
  allocation_error, cmd_transition_image_layout, create_image_view,
  determine_gpu_allocation_info, VkAppResult, VkBuffer, VkMemoryPreference,
};

const DEBUG_LAYOUT_TRANSITIONS: bool = false;

/// Device-local, optimal tiling, sampled image. Filled once from a staging buffer.
pub struct VkTexture {
  // For debugging
  name: String,
  pub width: u32,
  pub height: u32,
  pub format: vk::Format,
  /// Native Vulkan image
  pub image: vk::Image,
  pub allocation: vma::Allocation,
  image_view: vk::ImageView,
  pub layout: vk::ImageLayout,
}

impl VkTexture {
  pub fn empty(
    device: &ash::Device,
    allocator: &vma::Allocator,
    name: String,
    size: vk::Extent2D,
    format: vk::Format,
  ) -> VkAppResult<VkTexture> {
    let create_info = vk::ImageCreateInfo::builder()
      .image_type(vk::ImageType::TYPE_2D)
      .extent(vk::Extent3D {
        width: size.width,
        height: size.height,
        depth: 1,
      })
      .format(format)
      .tiling(vk::ImageTiling::OPTIMAL)
      .usage(vk::ImageUsageFlags::TRANSFER_DST | vk::ImageUsageFlags::SAMPLED)
      .initial_layout(vk::ImageLayout::UNDEFINED)
      // verbose properties, but vulkan requires
      .sharing_mode(vk::SharingMode::EXCLUSIVE)
      .samples(vk::SampleCountFlags::TYPE_1)
      .mip_levels(1)
      .array_layers(1)
      .build();

    let memory_pref = VkMemoryPreference::GpuOnly;
    let alloc_info = determine_gpu_allocation_info(memory_pref);
    let (image, mut allocation) = unsafe { allocator.create_image(&create_info, &alloc_info) }
      .map_err(|result| allocation_error("vmaCreateImage", memory_pref, result))?;

    let image_view = match create_image_view(device, image, format, vk::ImageAspectFlags::COLOR) {
      Ok(view) => view,
      Err(err) => {
        unsafe { allocator.destroy_image(image, &mut allocation) };
        return Err(err);
      }
    };

    Ok(VkTexture {
      name: create_texture_name(&name, size.width, size.height),
      width: size.width,
      height: size.height,
      format,
      image,
      allocation,
      image_view,
      layout: create_info.initial_layout,
    })
  }

  /// Records UNDEFINED -> TRANSFER_DST, buffer-to-image copy, TRANSFER_DST -> SHADER_READ_ONLY.
  pub unsafe fn cmd_upload_from_buffer(
    &mut self,
    device: &ash::Device,
    cmd_buf: vk::CommandBuffer,
    staging: &VkBuffer,
  ) -> VkAppResult<()> {
    self.cmd_transition_layout(device, cmd_buf, vk::ImageLayout::TRANSFER_DST_OPTIMAL)?;

    let region = vk::BufferImageCopy::builder()
      .buffer_offset(0)
      .buffer_row_length(0) // tightly packed
      .buffer_image_height(0)
      .image_subresource(vk::ImageSubresourceLayers {
        aspect_mask: vk::ImageAspectFlags::COLOR,
        mip_level: 0,
        base_array_layer: 0,
        layer_count: 1,
      })
      .image_offset(vk::Offset3D { x: 0, y: 0, z: 0 })
      .image_extent(vk::Extent3D {
        width: self.width,
        height: self.height,
        depth: 1,
      })
      .build();
    device.cmd_copy_buffer_to_image(
      cmd_buf,
      staging.buffer,
      self.image,
      vk::ImageLayout::TRANSFER_DST_OPTIMAL,
      &[region],
    );

    self.cmd_transition_layout(device, cmd_buf, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
  }

  unsafe fn cmd_transition_layout(
    &mut self,
    device: &ash::Device,
    cmd_buf: vk::CommandBuffer,
    new_layout: vk::ImageLayout,
  ) -> VkAppResult<()> {
    if DEBUG_LAYOUT_TRANSITIONS {
      trace!(
        "VkTexture::LayoutTransition '{}' ({:?} -> {:?})",
        self.name,
        self.layout,
        new_layout
      );
    }

    cmd_transition_image_layout(device, cmd_buf, self.image, self.layout, new_layout)?;
    self.layout = new_layout;
    Ok(())
  }

  pub fn image_view(&self) -> vk::ImageView {
    self.image_view
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub unsafe fn destroy(&mut self, device: &ash::Device, allocator: &vma::Allocator) {
    device.destroy_image_view(self.image_view, None);
    allocator.destroy_image(self.image, &mut self.allocation);
  }
}

fn create_texture_name(name: &str, width: u32, height: u32) -> String {
  format!("Texture '{}' ({}x{})", name, width, height)
}
