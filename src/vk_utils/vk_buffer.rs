use ash::vk;
use log::trace;
use vma::Alloc;

use super::{
  allocation_error, determine_gpu_allocation_info, VkAppError, VkAppResult, VkMemoryPreference,
  VkResultExt,
};

// https://gpuopen-librariesandsdks.github.io/VulkanMemoryAllocator/html/quick_start.html

pub struct VkBuffer {
  // For debugging
  pub name: String,
  /// Size in bytes
  pub size: usize,
  /// Native Vulkan buffer
  pub buffer: vk::Buffer,
  pub allocation: vma::Allocation,
  pub memory_pref: VkMemoryPreference,
}

fn fmt_buf_name(name: &str, size: usize) -> String {
  format!("Buffer '{}' ({} bytes)", name, size)
}

impl VkBuffer {
  /// Allocate empty vulkan buffer, memory is bound by the allocator.
  pub fn empty(
    allocator: &vma::Allocator,
    name: String,
    size: usize,
    usage: vk::BufferUsageFlags,
    memory_pref: VkMemoryPreference,
  ) -> VkAppResult<Self> {
    trace!("Allocating {} as {:?}", fmt_buf_name(&name, size), memory_pref);
    let buffer_info = vk::BufferCreateInfo::builder()
      .size(size as u64)
      .usage(usage)
      .sharing_mode(vk::SharingMode::EXCLUSIVE);
    let alloc_info = determine_gpu_allocation_info(memory_pref);

    let (buffer, allocation) = unsafe { allocator.create_buffer(&buffer_info, &alloc_info) }
      .map_err(|result| allocation_error("vmaCreateBuffer", memory_pref, result))?;

    Ok(Self {
      name,
      size,
      buffer,
      allocation,
      memory_pref,
    })
  }

  /// Host-visible buffer filled with `bytes`. Used as staging buffer.
  pub fn from_data(
    allocator: &vma::Allocator,
    name: String,
    bytes: &[u8],
    usage: vk::BufferUsageFlags,
  ) -> VkAppResult<Self> {
    let mut buffer = VkBuffer::empty(
      allocator,
      name,
      bytes.len(),
      usage,
      VkMemoryPreference::ScratchTransfer,
    )?;

    if let Err(err) = buffer.write_bytes(allocator, bytes) {
      unsafe { buffer.destroy(allocator) };
      return Err(err);
    }
    Ok(buffer)
  }

  /// Map, copy and unmap. Mappable memory is HOST_COHERENT so no flush is needed.
  pub fn write_bytes(&mut self, allocator: &vma::Allocator, bytes: &[u8]) -> VkAppResult<()> {
    if self.memory_pref == VkMemoryPreference::GpuOnly || bytes.len() > self.size {
      return Err(VkAppError::from_vk(
        "VkBuffer::write_bytes",
        vk::Result::ERROR_MEMORY_MAP_FAILED,
      ));
    }

    unsafe {
      let pointer = allocator
        .map_memory(&mut self.allocation)
        .on_fail("vmaMapMemory")?;
      let slice = std::slice::from_raw_parts_mut(pointer, bytes.len());
      slice.copy_from_slice(bytes);
      allocator.unmap_memory(&mut self.allocation);
    }
    Ok(())
  }

  pub fn name(&self) -> String {
    fmt_buf_name(&self.name, self.size)
  }

  pub unsafe fn destroy(&mut self, allocator: &vma::Allocator) {
    trace!("Destroying {}", self.name());
    allocator.destroy_buffer(self.buffer, &mut self.allocation);
  }
}
