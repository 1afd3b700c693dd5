//! GPU stand-in for frame loop tests. Records every call and simulates fences:
//! submitted work only completes when its fence is waited on (worst case for throttling).

use std::collections::VecDeque;

use ash::vk;

use super::{AcquiredImage, FrameBackend, MeshUBO, TeardownBackend, TeardownStage};
use crate::vk_utils::{submit_and_wait, TransferComplete, TransferQueue, VkAppError, VkAppResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
  UploadSubmit,
  /// Transfer fence observed signaled
  UploadDone,
  WaitFence(usize),
  ResetFence(usize),
  Acquire { slot: usize, image: usize },
  WriteUniforms(usize),
  Submit { slot: usize, image: usize },
  Present { slot: usize, image: usize },
  WaitIdle,
  Destroy(TeardownStage),
}

pub struct MockBackend {
  pub events: Vec<Event>,
  pub max_in_flight: usize,
  frames_in_flight: usize,
  image_count: usize,
  image_sequence: Vec<usize>,
  fence_signaled: Vec<bool>,
  /// Slots of submitted, not yet finished frames. Oldest first
  gpu_queue: VecDeque<usize>,
  acquire_calls: usize,
  present_calls: usize,
  wait_calls: usize,
  // failure injection, by call number
  pub suboptimal_acquire_at: Option<usize>,
  pub suboptimal_present_at: Option<usize>,
  pub out_of_date_acquire_at: Option<usize>,
  pub device_lost_on_wait_at: Option<usize>,
  pub fail_wait_idle: bool,
  pub upload_wait_result: vk::Result,
}

impl MockBackend {
  pub fn new(frames_in_flight: usize, image_count: usize) -> Self {
    Self {
      events: Vec::new(),
      max_in_flight: 0,
      frames_in_flight,
      image_count,
      image_sequence: (0..image_count).collect(),
      fence_signaled: vec![true; frames_in_flight], // created signaled
      gpu_queue: VecDeque::new(),
      acquire_calls: 0,
      present_calls: 0,
      wait_calls: 0,
      suboptimal_acquire_at: None,
      suboptimal_present_at: None,
      out_of_date_acquire_at: None,
      device_lost_on_wait_at: None,
      fail_wait_idle: false,
      upload_wait_result: vk::Result::SUCCESS,
    }
  }

  /// Acquire returns these indices, cycling.
  pub fn with_image_sequence(mut self, sequence: Vec<usize>) -> Self {
    assert!(sequence.iter().all(|&i| i < self.image_count));
    self.image_sequence = sequence;
    self
  }

  /// One-time transfer through the same path the device uses.
  pub fn upload(&mut self) -> VkAppResult<TransferComplete> {
    submit_and_wait(self)
  }

  pub fn in_flight_count(&self) -> usize {
    self.gpu_queue.len()
  }

  /// Queue executes in order, so finishing `slot` finishes everything before it.
  fn finish_until(&mut self, slot: usize) {
    while let Some(done) = self.gpu_queue.pop_front() {
      self.fence_signaled[done] = true;
      if done == slot {
        break;
      }
    }
  }
}

impl TransferQueue for MockBackend {
  fn submit_transfer(&mut self) -> VkAppResult<()> {
    self.events.push(Event::UploadSubmit);
    Ok(())
  }

  fn wait_transfer(&mut self, _timeout_ns: u64) -> VkAppResult<()> {
    match self.upload_wait_result {
      vk::Result::SUCCESS => {
        self.events.push(Event::UploadDone);
        Ok(())
      }
      result => Err(VkAppError::from_vk("vkWaitForFences (setup)", result)),
    }
  }
}

impl FrameBackend for MockBackend {
  fn frames_in_flight(&self) -> usize {
    self.frames_in_flight
  }

  fn swapchain_size(&self) -> (u32, u32) {
    (600, 600)
  }

  fn wait_for_fence(&mut self, slot: usize) -> VkAppResult<()> {
    let call = self.wait_calls;
    self.wait_calls += 1;
    self.events.push(Event::WaitFence(slot));
    if self.device_lost_on_wait_at == Some(call) {
      return Err(VkAppError::from_vk(
        "vkWaitForFences",
        vk::Result::ERROR_DEVICE_LOST,
      ));
    }

    if !self.fence_signaled[slot] {
      self.finish_until(slot);
    }
    assert!(self.fence_signaled[slot], "fence {} never signals", slot);
    Ok(())
  }

  fn reset_fence(&mut self, slot: usize) -> VkAppResult<()> {
    self.events.push(Event::ResetFence(slot));
    assert!(
      self.fence_signaled[slot],
      "reset of fence {} that is still in use by GPU",
      slot
    );
    self.fence_signaled[slot] = false;
    Ok(())
  }

  fn acquire_next_image(&mut self, slot: usize) -> VkAppResult<AcquiredImage> {
    let call = self.acquire_calls;
    self.acquire_calls += 1;
    if self.out_of_date_acquire_at == Some(call) {
      return Err(VkAppError::from_vk(
        "vkAcquireNextImageKHR",
        vk::Result::ERROR_OUT_OF_DATE_KHR,
      ));
    }

    let image = self.image_sequence[call % self.image_sequence.len()];
    self.events.push(Event::Acquire { slot, image });
    Ok(AcquiredImage {
      image_idx: image,
      suboptimal: self.suboptimal_acquire_at == Some(call),
    })
  }

  fn write_uniforms(&mut self, image_idx: usize, _ubo: &MeshUBO) -> VkAppResult<()> {
    assert!(image_idx < self.image_count);
    self.events.push(Event::WriteUniforms(image_idx));
    Ok(())
  }

  fn submit(&mut self, slot: usize, image_idx: usize) -> VkAppResult<()> {
    assert!(image_idx < self.image_count);
    assert!(
      !self.fence_signaled[slot],
      "submit with fence {} that was not reset",
      slot
    );
    assert!(
      !self.gpu_queue.contains(&slot),
      "slot {} reused while its frame is still in flight",
      slot
    );
    self.events.push(Event::Submit {
      slot,
      image: image_idx,
    });
    self.gpu_queue.push_back(slot);
    self.max_in_flight = self.max_in_flight.max(self.gpu_queue.len());
    Ok(())
  }

  fn present(&mut self, slot: usize, image_idx: usize) -> VkAppResult<bool> {
    let call = self.present_calls;
    self.present_calls += 1;
    self.events.push(Event::Present {
      slot,
      image: image_idx,
    });
    Ok(self.suboptimal_present_at == Some(call))
  }
}

impl TeardownBackend for MockBackend {
  fn wait_idle(&mut self) -> VkAppResult<()> {
    self.events.push(Event::WaitIdle);
    if self.fail_wait_idle {
      return Err(VkAppError::from_vk(
        "vkDeviceWaitIdle",
        vk::Result::ERROR_DEVICE_LOST,
      ));
    }
    while let Some(done) = self.gpu_queue.pop_front() {
      self.fence_signaled[done] = true;
    }
    Ok(())
  }

  fn destroy_stage(&mut self, stage: TeardownStage) {
    if stage == TeardownStage::SyncObjects {
      assert!(
        self.fail_wait_idle || self.gpu_queue.is_empty(),
        "sync objects destroyed while GPU still uses them"
      );
    }
    self.events.push(Event::Destroy(stage));
  }
}
