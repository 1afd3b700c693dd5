use ash;
use ash::vk;

use super::{VkAppResult, VkResultExt};

/// Binding of the combined image sampler (fragment shader)
pub const BINDING_TEXTURE: u32 = 0;
/// Binding of the model/view/projection block (vertex shader)
pub const BINDING_UBO: u32 = 1;

pub fn create_descriptor_set_layout(
  device: &ash::Device,
) -> VkAppResult<vk::DescriptorSetLayout> {
  let bindings = [
    vk::DescriptorSetLayoutBinding::builder()
      .binding(BINDING_TEXTURE)
      .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
      .descriptor_count(1)
      .stage_flags(vk::ShaderStageFlags::FRAGMENT)
      .build(),
    vk::DescriptorSetLayoutBinding::builder()
      .binding(BINDING_UBO)
      .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
      .descriptor_count(1)
      .stage_flags(vk::ShaderStageFlags::VERTEX)
      .build(),
  ];

  let create_info = vk::DescriptorSetLayoutCreateInfo::builder()
    .bindings(&bindings)
    .build();
  unsafe { device.create_descriptor_set_layout(&create_info, None) }
    .on_fail("vkCreateDescriptorSetLayout")
}

/// Enough for `set_count` sets of the layout above.
pub fn create_descriptor_pool(
  device: &ash::Device,
  set_count: u32,
) -> VkAppResult<vk::DescriptorPool> {
  let pool_sizes = [
    vk::DescriptorPoolSize {
      ty: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
      descriptor_count: set_count,
    },
    vk::DescriptorPoolSize {
      ty: vk::DescriptorType::UNIFORM_BUFFER,
      descriptor_count: set_count,
    },
  ];

  let create_info = vk::DescriptorPoolCreateInfo::builder()
    .max_sets(set_count)
    .pool_sizes(&pool_sizes)
    .build();
  unsafe { device.create_descriptor_pool(&create_info, None) }.on_fail("vkCreateDescriptorPool")
}

/// One descriptor set per uniform buffer, all sharing the texture.
pub fn allocate_descriptor_sets(
  device: &ash::Device,
  pool: vk::DescriptorPool,
  layout: vk::DescriptorSetLayout,
  uniform_buffers: &[(vk::Buffer, u64)],
  image_view: vk::ImageView,
  sampler: vk::Sampler,
) -> VkAppResult<Vec<vk::DescriptorSet>> {
  let layouts = vec![layout; uniform_buffers.len()];
  let alloc_info = vk::DescriptorSetAllocateInfo::builder()
    .descriptor_pool(pool)
    .set_layouts(&layouts)
    .build();
  let sets =
    unsafe { device.allocate_descriptor_sets(&alloc_info) }.on_fail("vkAllocateDescriptorSets")?;

  for (&set, &(buffer, range)) in sets.iter().zip(uniform_buffers) {
    let image_infos = [vk::DescriptorImageInfo {
      sampler,
      image_view,
      image_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
    }];
    let buffer_infos = [vk::DescriptorBufferInfo {
      buffer,
      offset: 0,
      range,
    }];

    let writes = [
      vk::WriteDescriptorSet::builder()
        .dst_set(set)
        .dst_binding(BINDING_TEXTURE)
        .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
        .image_info(&image_infos)
        .build(),
      vk::WriteDescriptorSet::builder()
        .dst_set(set)
        .dst_binding(BINDING_UBO)
        .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
        .buffer_info(&buffer_infos)
        .build(),
    ];
    unsafe { device.update_descriptor_sets(&writes, &[]) };
  }

  Ok(sets)
}
