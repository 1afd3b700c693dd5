use ash;
use ash::vk;
use log::{info, trace};

use crate::config::Config;
use crate::renderer::MeshUBO;
use crate::scene::SceneData;
use crate::vk_utils::{
  allocate_descriptor_sets, create_descriptor_pool, create_sampler, execute_setup_cmd_buf,
  TransferComplete, VkAppResult, VkBuffer, VkMemoryPreference, VkTexture,
};

use super::VkCtxDevice;

/// Everything the draw commands read: mesh, texture, per-image uniforms and descriptors.
pub struct VkCtxResources {
  pub vertex_buffer: VkBuffer,
  pub index_buffer: VkBuffer,
  pub index_count: u32,
  pub texture: VkTexture,
  pub sampler: vk::Sampler,
  /// One per swapchain image
  pub uniform_buffers: Vec<VkBuffer>,
  pub descriptor_set_layout: vk::DescriptorSetLayout,
  pub descriptor_pool: vk::DescriptorPool,
  /// One per swapchain image, freed with the pool
  pub descriptor_sets: Vec<vk::DescriptorSet>,
}

impl VkCtxResources {
  pub unsafe fn destroy(&mut self, device: &ash::Device, allocator: &vma::Allocator) {
    device.destroy_descriptor_pool(self.descriptor_pool, None);
    device.destroy_descriptor_set_layout(self.descriptor_set_layout, None);
    for buffer in &mut self.uniform_buffers {
      buffer.destroy(allocator);
    }
    device.destroy_sampler(self.sampler, None);
    self.texture.destroy(device, allocator);
    self.index_buffer.destroy(allocator);
    self.vertex_buffer.destroy(allocator);
  }
}

/// Device-local buffer that can be filled with `cmd_copy_buffer`.
fn create_device_local_buffer(
  device: &VkCtxDevice,
  name: &str,
  size: usize,
  usage: vk::BufferUsageFlags,
) -> VkAppResult<VkBuffer> {
  VkBuffer::empty(
    &device.allocator,
    name.to_string(),
    size,
    usage | vk::BufferUsageFlags::TRANSFER_DST,
    VkMemoryPreference::GpuOnly,
  )
}

fn create_staging_buffer(device: &VkCtxDevice, name: &str, bytes: &[u8]) -> VkAppResult<VkBuffer> {
  VkBuffer::from_data(
    &device.allocator,
    format!("{}-staging", name),
    bytes,
    vk::BufferUsageFlags::TRANSFER_SRC,
  )
}

unsafe fn cmd_copy_whole_buffer(
  device: &ash::Device,
  cmd_buf: vk::CommandBuffer,
  src: &VkBuffer,
  dst: &VkBuffer,
) {
  let region = vk::BufferCopy {
    src_offset: 0,
    dst_offset: 0,
    size: src.size as u64,
  };
  device.cmd_copy_buffer(cmd_buf, src.buffer, dst.buffer, &[region]);
}

/// Creates mesh buffers and the texture, then fills them with a single
/// one-time transfer. Returns after the transfer's fence signaled.
pub fn create_mesh_resources(
  device: &VkCtxDevice,
  cmd_pool: vk::CommandPool,
  descriptor_set_layout: vk::DescriptorSetLayout,
  scene: &SceneData,
  swapchain_image_count: usize,
) -> VkAppResult<(VkCtxResources, TransferComplete)> {
  let vertex_bytes: &[u8] = bytemuck::cast_slice(&scene.vertices);
  let index_bytes: &[u8] = bytemuck::cast_slice(&scene.indices);
  info!(
    "Vertex buffer bytes={}, index buffer bytes={}",
    vertex_bytes.len(),
    index_bytes.len()
  );

  let vertex_buffer = create_device_local_buffer(
    device,
    "vertices",
    vertex_bytes.len(),
    vk::BufferUsageFlags::VERTEX_BUFFER,
  )?;
  let index_buffer = create_device_local_buffer(
    device,
    "indices",
    index_bytes.len(),
    vk::BufferUsageFlags::INDEX_BUFFER,
  )?;

  let tex_data = &scene.texture;
  let mut texture = VkTexture::empty(
    &device.device,
    &device.allocator,
    String::from("mesh-diffuse"),
    vk::Extent2D {
      width: tex_data.width,
      height: tex_data.height,
    },
    Config::TEXTURE_FORMAT,
  )?;

  // staging
  let mut staging = [
    create_staging_buffer(device, "vertices", vertex_bytes)?,
    create_staging_buffer(device, "indices", index_bytes)?,
    create_staging_buffer(device, "mesh-diffuse", &tex_data.pixels)?,
  ];

  trace!("Uploading mesh and {}", texture.name());
  let upload = unsafe {
    execute_setup_cmd_buf(&device.device, device.queue, cmd_pool, |d, cmd_buf| {
      cmd_copy_whole_buffer(d, cmd_buf, &staging[0], &vertex_buffer);
      cmd_copy_whole_buffer(d, cmd_buf, &staging[1], &index_buffer);
      texture.cmd_upload_from_buffer(d, cmd_buf, &staging[2])
    })
  };
  // transfer is finished (or failed) here, staging is no longer needed either way
  for buffer in &mut staging {
    unsafe { buffer.destroy(&device.allocator) };
  }
  let upload = upload?;

  let sampler = create_sampler(&device.device, device.max_sampler_anisotropy)?;

  let uniform_buffers = (0..swapchain_image_count)
    .map(|i| {
      VkBuffer::empty(
        &device.allocator,
        format!("mesh-ubo-{}", i),
        MeshUBO::size_bytes(),
        vk::BufferUsageFlags::UNIFORM_BUFFER,
        VkMemoryPreference::GpuMappable,
      )
    })
    .collect::<VkAppResult<Vec<_>>>()?;

  let descriptor_pool = create_descriptor_pool(&device.device, swapchain_image_count as u32)?;
  let ubo_infos: Vec<(vk::Buffer, u64)> = uniform_buffers
    .iter()
    .map(|b| (b.buffer, b.size as u64))
    .collect();
  let descriptor_sets = allocate_descriptor_sets(
    &device.device,
    descriptor_pool,
    descriptor_set_layout,
    &ubo_infos,
    texture.image_view(),
    sampler,
  )?;

  let resources = VkCtxResources {
    vertex_buffer,
    index_buffer,
    index_count: scene.index_count(),
    texture,
    sampler,
    uniform_buffers,
    descriptor_set_layout,
    descriptor_pool,
    descriptor_sets,
  };
  Ok((resources, upload))
}
