use ash::vk;
use log::{info, warn};
use vma::Alloc;

use super::{VkAppError, VkAppResult};

// https://gpuopen-librariesandsdks.github.io/VulkanMemoryAllocator/html/choosing_memory_type.html

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VkMemoryPreference {
  /// Usage: vertex, index buffers, textures.
  GpuOnly,
  /// CPU-mapped memory that is read on GPU.
  ///
  /// Usage: Uniform buffers.
  GpuMappable,
  /// Temporary allocation used when copying CPU data to GPU-only memory.
  ScratchTransfer,
}

impl VkMemoryPreference {
  pub const ALL: [VkMemoryPreference; 3] = [
    VkMemoryPreference::GpuOnly,
    VkMemoryPreference::GpuMappable,
    VkMemoryPreference::ScratchTransfer,
  ];

  /// Flags the picked memory type has to have. Host writes are never flushed,
  /// so mappable memory has to be coherent.
  pub fn required_flags(&self) -> vk::MemoryPropertyFlags {
    match self {
      VkMemoryPreference::GpuOnly => vk::MemoryPropertyFlags::DEVICE_LOCAL,
      VkMemoryPreference::GpuMappable | VkMemoryPreference::ScratchTransfer => {
        vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT
      }
    }
  }
}

pub fn determine_gpu_allocation_info(memory_pref: VkMemoryPreference) -> vma::AllocationCreateInfo {
  let required_flags = memory_pref.required_flags();
  match memory_pref {
    VkMemoryPreference::GpuOnly => vma::AllocationCreateInfo {
      usage: vma::MemoryUsage::AutoPreferDevice,
      required_flags,
      ..Default::default()
    },
    VkMemoryPreference::GpuMappable => vma::AllocationCreateInfo {
      usage: vma::MemoryUsage::AutoPreferDevice,
      flags: vma::AllocationCreateFlags::HOST_ACCESS_SEQUENTIAL_WRITE,
      required_flags,
      ..Default::default()
    },
    VkMemoryPreference::ScratchTransfer => vma::AllocationCreateInfo {
      usage: vma::MemoryUsage::Auto,
      flags: vma::AllocationCreateFlags::HOST_ACCESS_SEQUENTIAL_WRITE,
      required_flags,
      ..Default::default()
    },
  }
}

/// Memory type selector. Index of the memory type VMA picks for
/// `type_bits` (from `vk::MemoryRequirements::memory_type_bits`) and `flags`.
pub fn find_memory_type(
  allocator: &vma::Allocator,
  type_bits: u32,
  flags: vk::MemoryPropertyFlags,
) -> VkAppResult<u32> {
  // no `usage` hint: VMA takes the first allowed type that has all `flags`
  let alloc_info = vma::AllocationCreateInfo {
    required_flags: flags,
    ..Default::default()
  };
  unsafe { allocator.find_memory_type_index(type_bits, &alloc_info) }
    .map_err(|_| VkAppError::NoSuitableMemoryType { type_bits, flags })
}

/// Same rule as `find_memory_type`, evaluated on raw device properties:
/// first memory type allowed by `type_bits` that has all of the `flags`.
///
/// https://registry.khronos.org/vulkan/specs/1.3-extensions/man/html/VkPhysicalDeviceMemoryProperties.html
pub fn find_memory_type_in(
  mem_props: &vk::PhysicalDeviceMemoryProperties,
  type_bits: u32,
  flags: vk::MemoryPropertyFlags,
) -> VkAppResult<u32> {
  let count = (mem_props.memory_type_count as usize).min(mem_props.memory_types.len());

  mem_props.memory_types[..count]
    .iter()
    .enumerate()
    .find(|(idx, mem_type)| {
      let allowed = (type_bits & (1 << idx)) != 0;
      allowed && mem_type.property_flags.contains(flags)
    })
    .map(|(idx, _)| idx as u32)
    .ok_or(VkAppError::NoSuitableMemoryType { type_bits, flags })
}

/// Fail early if any of the memory preferences cannot be served by this device.
pub fn check_memory_types(
  allocator: &vma::Allocator,
  mem_props: &vk::PhysicalDeviceMemoryProperties,
) -> VkAppResult<()> {
  for pref in VkMemoryPreference::ALL.iter().copied() {
    let flags = pref.required_flags();
    let picked = find_memory_type(allocator, !0, flags)?;
    let expected = find_memory_type_in(mem_props, !0, flags)?;
    if picked != expected {
      warn!(
        "Memory for {:?}: allocator picked type {}, first matching is {}",
        pref, picked, expected
      );
    }
    info!("Memory for {:?}: type {} ({:?})", pref, picked, flags);
  }
  Ok(())
}

/// `vmaCreateBuffer`/`vmaCreateImage` report "no memory type" as `ERROR_FEATURE_NOT_PRESENT`.
#[track_caller]
pub fn allocation_error(
  what: &'static str,
  memory_pref: VkMemoryPreference,
  result: vk::Result,
) -> VkAppError {
  match result {
    vk::Result::ERROR_FEATURE_NOT_PRESENT => VkAppError::NoSuitableMemoryType {
      type_bits: !0,
      flags: memory_pref.required_flags(),
    },
    result => VkAppError::from_vk(what, result),
  }
}
