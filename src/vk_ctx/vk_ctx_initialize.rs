use log::{info, trace};
use std::mem::ManuallyDrop;

use ash;
use ash::extensions::khr::{Surface, Swapchain};
use ash::vk;
use raw_window_handle::HasRawDisplayHandle;

use crate::config::Config;
use crate::renderer::{record_draw_commands, AshCommandEncoder, DrawCommandsDesc};
use crate::scene::{MeshVertex, SceneData};
use crate::vk_utils::debug::setup_debug_reporting;
use crate::vk_utils::*;

use super::*;

fn get_window_size(window: &winit::window::Window) -> vk::Extent2D {
  let size = window.inner_size();
  vk::Extent2D {
    width: size.width,
    height: size.height,
  }
}

fn create_device(
  instance: &ash::Instance,
  surface_loader: &Surface,
  surface_khr: vk::SurfaceKHR,
) -> VkAppResult<VkCtxDevice> {
  let (phys_device, queue_family_index) =
    pick_physical_device_and_queue_family_idx(instance, surface_loader, surface_khr)?;
  let (device, queue, has_anisotropy) =
    pick_device_and_queue(instance, phys_device, queue_family_index)?;

  let mem_properties = unsafe { instance.get_physical_device_memory_properties(phys_device) };
  let max_sampler_anisotropy = if has_anisotropy {
    let props = unsafe { instance.get_physical_device_properties(phys_device) };
    Some(props.limits.max_sampler_anisotropy)
  } else {
    None
  };
  trace!("Sampler anisotropy: {:?}", max_sampler_anisotropy);

  let allocator_info = vma::AllocatorCreateInfo::new(instance, &device, phys_device);
  let allocator = vma::Allocator::new(allocator_info).on_fail("vmaCreateAllocator")?;
  check_memory_types(&allocator, &mem_properties)?;

  Ok(VkCtxDevice {
    phys_device,
    queue_family_index,
    device,
    queue,
    mem_properties,
    max_sampler_anisotropy,
    allocator: ManuallyDrop::new(allocator),
  })
}

fn create_swapchain(
  instance: &ash::Instance,
  device: &VkCtxDevice,
  surface_loader: Surface,
  surface_khr: vk::SurfaceKHR,
  window_size: vk::Extent2D,
) -> VkAppResult<VkCtxSwapchain> {
  let support = query_swapchain_support(&surface_loader, surface_khr, device.phys_device)?;
  let size = choose_extent(&support.capabilities, window_size);
  trace!("Window size {:?}, swapchain size {:?}", window_size, size);

  let swapchain_loader = Swapchain::new(instance, &device.device);
  let swapchain = create_swapchain_khr(&swapchain_loader, surface_khr, &support, &size)?;
  let (images, image_views) = create_swapchain_images(
    &swapchain_loader,
    swapchain,
    &device.device,
    support.surface_format.format,
  )?;

  Ok(VkCtxSwapchain {
    swapchain_loader,
    swapchain,
    size,
    surface_format: support.surface_format,
    present_mode: support.present_mode,
    images,
    image_views,
    framebuffers: Vec::new(), // filled once render pass exists
    surface_loader,
    surface_khr,
  })
}

fn create_pipelines(
  device: &ash::Device,
  config: &Config,
  swapchain: &VkCtxSwapchain,
  descriptor_set_layout: vk::DescriptorSetLayout,
) -> VkAppResult<VkCtxPipelines> {
  let render_pass = create_render_pass(device, swapchain.surface_format.format)?;
  let pipeline_layout = create_pipeline_layout(device, &[descriptor_set_layout])?;
  let pipeline = create_mesh_pipeline(
    device,
    render_pass,
    pipeline_layout,
    (
      config.vertex_shader_path.as_path(),
      config.fragment_shader_path.as_path(),
    ),
    VertexInputDesc {
      bindings: &MeshVertex::BINDINGS_DESC,
      attributes: &MeshVertex::ATTRIBUTES_DESC,
    },
    &swapchain.size,
  )?;

  Ok(VkCtxPipelines {
    render_pass,
    pipeline_layout,
    pipeline,
  })
}

/// One command buffer per swapchain image, each recorded once here.
fn create_draw_command_buffers(
  device: &ash::Device,
  config: &Config,
  cmd_pool: vk::CommandPool,
  swapchain: &VkCtxSwapchain,
  pipelines: &VkCtxPipelines,
  resources: &VkCtxResources,
) -> VkAppResult<Vec<vk::CommandBuffer>> {
  let cmd_buffers = create_command_buffers(device, cmd_pool, swapchain.image_count() as u32)?;

  let desc = DrawCommandsDesc {
    render_pass: pipelines.render_pass,
    framebuffers: &swapchain.framebuffers,
    pipeline: pipelines.pipeline,
    pipeline_layout: pipelines.pipeline_layout,
    vertex_buffer: resources.vertex_buffer.buffer,
    index_buffer: resources.index_buffer.buffer,
    index_count: resources.index_count,
    descriptor_sets: Some(&resources.descriptor_sets),
    instance_count: config.instance_count,
    clear_color: config.clear_color,
    extent: swapchain.size,
  };
  let mut encoder = AshCommandEncoder { device };
  record_draw_commands(&mut encoder, &desc, &cmd_buffers)?;

  Ok(cmd_buffers)
}

/// Creates every Vulkan object and finishes the one-time upload.
/// The returned `TransferComplete` is what allows the frame loop to start.
///
/// On failure already created objects are not released,
/// the caller is expected to exit.
// https://github.com/MaikKlein/ash/blob/master/examples/src/lib.rs#L332
pub fn vk_ctx_initialize(
  window: &winit::window::Window,
  config: &Config,
  scene: &SceneData,
) -> VkAppResult<(VkCtx, TransferComplete)> {
  let entry = unsafe { ash::Entry::load() }?;
  let instance = create_instance(&entry, config, window.raw_display_handle())?;
  let debug_utils = if config.validation {
    Some(setup_debug_reporting(&entry, &instance)?)
  } else {
    None
  };

  // surface data
  let surface_loader = Surface::new(&entry, &instance); // I guess some generic OS-independent thing?
  let surface_khr = create_surface_khr(&entry, &instance, window)?; // real OS-backed thing

  // devices
  let device = create_device(&instance, &surface_loader, surface_khr)?;
  let vk_device = &device.device;

  // swapchain
  let mut swapchain = create_swapchain(
    &instance,
    &device,
    surface_loader,
    surface_khr,
    get_window_size(window),
  )?;

  // pipeline
  let descriptor_set_layout = create_descriptor_set_layout(vk_device)?;
  let pipelines = create_pipelines(vk_device, config, &swapchain, descriptor_set_layout)?;
  swapchain.framebuffers = create_framebuffers_with_one_attachment(
    vk_device,
    pipelines.render_pass,
    &swapchain.image_views,
    &swapchain.size,
  )?;

  // mesh, texture, uniforms. Uploaded before any draw command buffer exists
  let cmd_pool = create_command_pool(vk_device, device.queue_family_index)?;
  let (resources, upload) = create_mesh_resources(
    &device,
    cmd_pool,
    descriptor_set_layout,
    scene,
    swapchain.image_count(),
  )?;

  let cmd_buffers =
    create_draw_command_buffers(vk_device, config, cmd_pool, &swapchain, &pipelines, &resources)?;
  let synchronize = VkCtxSynchronize::new(vk_device, config.frames_in_flight)?;

  info!(
    "Swapchain images: {}, frames in flight: {}, present mode: {:?}",
    swapchain.image_count(),
    synchronize.frames_in_flight(),
    swapchain.present_mode
  );

  let vk_ctx = VkCtx {
    entry,
    instance,
    device,
    swapchain,
    pipelines,
    command_buffers: VkCtxCommandBuffers {
      pool: cmd_pool,
      cmd_buffers,
    },
    resources,
    synchronize,
    debug_utils,
  };
  Ok((vk_ctx, upload))
}
