use log::{debug, trace, warn};

use super::{FrameSlot, MeshTransform, MeshUBO};
use crate::vk_utils::{TransferComplete, VkAppResult};

/// Result of `vkAcquireNextImageKHR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquiredImage {
  /// Swapchain image index, range: [0, swapchain_image_count)
  pub image_idx: usize,
  pub suboptimal: bool,
}

/// Everything the frame loop needs from the GPU side.
/// Synchronization objects are addressed by frame slot. Command buffers and
/// uniform buffers are addressed by swapchain image index.
pub trait FrameBackend {
  fn frames_in_flight(&self) -> usize;
  /// (width, height)
  fn swapchain_size(&self) -> (u32, u32);

  /// Block until the last submission that used `slot` finished.
  fn wait_for_fence(&mut self, slot: usize) -> VkAppResult<()>;
  fn reset_fence(&mut self, slot: usize) -> VkAppResult<()>;
  /// Signals the image-available semaphore of `slot`.
  fn acquire_next_image(&mut self, slot: usize) -> VkAppResult<AcquiredImage>;
  fn write_uniforms(&mut self, image_idx: usize, ubo: &MeshUBO) -> VkAppResult<()>;
  /// Waits image-available of `slot`, signals render-finished and the fence of `slot`.
  fn submit(&mut self, slot: usize, image_idx: usize) -> VkAppResult<()>;
  /// Waits render-finished of `slot`. Returns `true` if suboptimal.
  fn present(&mut self, slot: usize, image_idx: usize) -> VkAppResult<bool>;
}

/// Swapchain no longer matches the surface exactly, but can still be presented to.
/// Window is not resizable, so nothing rebuilds it. We only keep track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapchainState {
  Valid,
  NeedsRebuild,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
  Idle,
  Acquiring,
  Submitting,
  Presenting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawnFrame {
  pub slot: usize,
  pub image_idx: usize,
}

pub struct FrameLoop {
  slot: FrameSlot,
  phase: FramePhase,
  swapchain_state: SwapchainState,
  transform: MeshTransform,
  frames_drawn: u64,
}

impl FrameLoop {
  /// Requires the one-time transfer to be done, so no frame can sample
  /// half-uploaded data. Frame slots cycle over the backend's sync objects.
  pub fn new(
    backend: &impl FrameBackend,
    transform: MeshTransform,
    _upload: &TransferComplete,
  ) -> Self {
    Self {
      slot: FrameSlot::new(backend.frames_in_flight()),
      phase: FramePhase::Idle,
      swapchain_state: SwapchainState::Valid,
      transform,
      frames_drawn: 0,
    }
  }

  pub fn slot(&self) -> usize {
    self.slot.idx()
  }

  pub fn phase(&self) -> FramePhase {
    self.phase
  }

  pub fn swapchain_state(&self) -> SwapchainState {
    self.swapchain_state
  }

  pub fn frames_drawn(&self) -> u64 {
    self.frames_drawn
  }

  fn mark_suboptimal(&mut self, during: &str) {
    if self.swapchain_state == SwapchainState::Valid {
      warn!("Swapchain is suboptimal ({}), continuing", during);
    }
    self.swapchain_state = SwapchainState::NeedsRebuild;
  }

  /// One iteration: wait fence, reset fence, acquire, update uniforms, submit, present.
  /// Slot advances only after the frame was submitted.
  pub fn draw_frame<B: FrameBackend>(
    &mut self,
    backend: &mut B,
    elapsed_sec: f32,
  ) -> VkAppResult<DrawnFrame> {
    let slot = self.slot.idx();

    // throttle: the triple of this slot is free only after its fence signals
    self.phase = FramePhase::Acquiring;
    backend.wait_for_fence(slot)?;
    backend.reset_fence(slot)?;

    let acquired = backend.acquire_next_image(slot)?;
    if acquired.suboptimal {
      self.mark_suboptimal("acquire");
    }
    let image_idx = acquired.image_idx;
    trace!("Frame slot {} acquired swapchain image {}", slot, image_idx);

    self.phase = FramePhase::Submitting;
    let (width, height) = backend.swapchain_size();
    let aspect_ratio = width as f32 / height.max(1) as f32;
    let ubo = self.transform.compute(elapsed_sec, aspect_ratio);
    backend.write_uniforms(image_idx, &ubo)?;
    backend.submit(slot, image_idx)?;

    self.phase = FramePhase::Presenting;
    let suboptimal = backend.present(slot, image_idx)?;
    if suboptimal {
      self.mark_suboptimal("present");
    }

    self.phase = FramePhase::Idle;
    self.slot.advance();
    self.frames_drawn += 1;
    if self.frames_drawn == 1 {
      debug!("First frame submitted");
    }

    Ok(DrawnFrame { slot, image_idx })
  }
}
