use log::{info, trace};

use ash;
use ash::extensions::ext::DebugUtils;
use ash::vk;

use crate::renderer::{AcquiredImage, FrameBackend, MeshUBO, TeardownBackend, TeardownStage};
use crate::vk_utils::{VkAppError, VkAppResult, VkResultExt};

use super::*;

fn index_out_of_range(what: &'static str, idx: usize, len: usize) -> VkAppError {
  log::error!("Requested {} at index {}, there are only {}", what, idx, len);
  VkAppError::IndexOutOfRange { what, idx, len }
}

fn get_resource_at_idx<T: Copy>(res_name: &'static str, arr: &[T], idx: usize) -> VkAppResult<T> {
  arr
    .get(idx)
    .copied()
    .ok_or_else(|| index_out_of_range(res_name, idx, arr.len()))
}

/** Kitchen sink for Vulkan stuff */
pub struct VkCtx {
  /// Owns the loaded library, has to outlive the instance
  pub entry: ash::Entry,
  pub instance: ash::Instance,
  pub device: VkCtxDevice,
  pub swapchain: VkCtxSwapchain,
  pub pipelines: VkCtxPipelines,
  pub command_buffers: VkCtxCommandBuffers,
  pub resources: VkCtxResources,
  pub synchronize: VkCtxSynchronize,

  // debug
  pub debug_utils: Option<(DebugUtils, vk::DebugUtilsMessengerEXT)>,
}

impl VkCtx {
  /// Sync objects come from `slot`, the command buffer from `swapchain_image_idx`.
  pub fn data_per_frame(
    &self,
    slot: usize,
    swapchain_image_idx: usize,
  ) -> VkAppResult<VkCtxPerFrameData> {
    let syncs = &self.synchronize;

    Ok(VkCtxPerFrameData {
      slot,
      swapchain_image_idx,
      command_buffer: get_resource_at_idx(
        "command_buffer",
        &self.command_buffers.cmd_buffers,
        swapchain_image_idx,
      )?,
      image_available_semaphore: get_resource_at_idx(
        "image_available_semaphore",
        &syncs.image_available_semaphores,
        slot,
      )?,
      render_finished_semaphore: get_resource_at_idx(
        "render_finished_semaphore",
        &syncs.render_finished_semaphores,
        slot,
      )?,
      in_flight_fence: get_resource_at_idx("in_flight_fence", &syncs.in_flight_fences, slot)?,
    })
  }

  fn vk_device(&self) -> &ash::Device {
    &self.device.device
  }
}

impl FrameBackend for VkCtx {
  fn frames_in_flight(&self) -> usize {
    self.synchronize.frames_in_flight()
  }

  fn swapchain_size(&self) -> (u32, u32) {
    (self.swapchain.size.width, self.swapchain.size.height)
  }

  fn wait_for_fence(&mut self, slot: usize) -> VkAppResult<()> {
    let fence = get_resource_at_idx("in_flight_fence", &self.synchronize.in_flight_fences, slot)?;
    unsafe { self.vk_device().wait_for_fences(&[fence], true, u64::MAX) }
      .on_fail("vkWaitForFences")
  }

  fn reset_fence(&mut self, slot: usize) -> VkAppResult<()> {
    let fence = get_resource_at_idx("in_flight_fence", &self.synchronize.in_flight_fences, slot)?;
    unsafe { self.vk_device().reset_fences(&[fence]) }.on_fail("vkResetFences")
  }

  fn acquire_next_image(&mut self, slot: usize) -> VkAppResult<AcquiredImage> {
    let semaphore = get_resource_at_idx(
      "image_available_semaphore",
      &self.synchronize.image_available_semaphores,
      slot,
    )?;

    let (image_idx, suboptimal) = unsafe {
      self.swapchain.swapchain_loader.acquire_next_image(
        self.swapchain.swapchain,
        u64::MAX,
        semaphore,
        vk::Fence::null(),
      )
    }
    .on_fail("vkAcquireNextImageKHR")?;

    Ok(AcquiredImage {
      image_idx: image_idx as usize,
      suboptimal,
    })
  }

  fn write_uniforms(&mut self, image_idx: usize, ubo: &MeshUBO) -> VkAppResult<()> {
    let allocator = &self.device.allocator;
    let buffers = &mut self.resources.uniform_buffers;
    let len = buffers.len();
    let buffer = buffers
      .get_mut(image_idx)
      .ok_or_else(|| index_out_of_range("uniform_buffer", image_idx, len))?;
    buffer.write_bytes(allocator, bytemuck::bytes_of(ubo))
  }

  fn submit(&mut self, slot: usize, image_idx: usize) -> VkAppResult<()> {
    let frame_data = self.data_per_frame(slot, image_idx)?;
    trace!(
      "Submit: slot {}, swapchain image {}",
      frame_data.slot,
      frame_data.swapchain_image_idx
    );

    let wait_semaphores = [frame_data.image_available_semaphore];
    let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
    let cmd_bufs = [frame_data.command_buffer];
    let signal_semaphores = [frame_data.render_finished_semaphore];
    let submit_info = vk::SubmitInfo::builder()
      .wait_semaphores(&wait_semaphores)
      .wait_dst_stage_mask(&wait_stages)
      .command_buffers(&cmd_bufs)
      .signal_semaphores(&signal_semaphores)
      .build();

    unsafe {
      self.vk_device().queue_submit(
        self.device.queue,
        &[submit_info],
        frame_data.in_flight_fence,
      )
    }
    .on_fail("vkQueueSubmit")
  }

  fn present(&mut self, slot: usize, image_idx: usize) -> VkAppResult<bool> {
    let render_finished = get_resource_at_idx(
      "render_finished_semaphore",
      &self.synchronize.render_finished_semaphores,
      slot,
    )?;

    let wait_semaphores = [render_finished];
    let swapchains = [self.swapchain.swapchain];
    let image_indices = [image_idx as u32];
    let present_info = vk::PresentInfoKHR::builder()
      .wait_semaphores(&wait_semaphores)
      .swapchains(&swapchains)
      .image_indices(&image_indices)
      .build();

    unsafe {
      self
        .swapchain
        .swapchain_loader
        .queue_present(self.device.queue, &present_info)
    }
    .on_fail("vkQueuePresentKHR")
  }
}

impl TeardownBackend for VkCtx {
  fn wait_idle(&mut self) -> VkAppResult<()> {
    unsafe { self.vk_device().device_wait_idle() }.on_fail("vkDeviceWaitIdle")
  }

  fn destroy_stage(&mut self, stage: TeardownStage) {
    trace!("VkCtx::destroy_stage({:?})", stage);
    let device = &self.device.device;

    unsafe {
      match stage {
        TeardownStage::SyncObjects => self.synchronize.destroy(device),
        TeardownStage::CommandPool => self.command_buffers.destroy(device),
        TeardownStage::Resources => self.resources.destroy(device, &self.device.allocator),
        TeardownStage::FramebuffersAndImageViews => {
          self.swapchain.destroy_framebuffers_and_views(device)
        }
        TeardownStage::Pipeline => self.pipelines.destroy(device),
        TeardownStage::SwapchainAndSurface => self.swapchain.destroy_swapchain_and_surface(),
        TeardownStage::Device => self.device.destroy(),
        TeardownStage::Instance => {
          if let Some((loader, messenger)) = &self.debug_utils {
            loader.destroy_debug_utils_messenger(*messenger, None);
          }
          self.instance.destroy_instance(None);
          info!("VkCtx destroyed");
        }
      }
    }
  }
}
