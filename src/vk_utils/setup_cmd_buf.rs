use ash;
use ash::vk;
use log::trace;

use super::{create_command_buffers, create_fence, VkAppResult, VkResultExt};

/// How long the one-time transfer may take: 100s.
pub const SETUP_FENCE_TIMEOUT_NS: u64 = 100_000_000_000;

/// Proof that a one-time transfer finished, i.e. its fence was observed signaled.
/// The frame loop cannot be created without one.
#[derive(Debug)]
pub struct TransferComplete {
  _private: (),
}

/// Submit of an already recorded transfer and the wait on its fence.
pub trait TransferQueue {
  fn submit_transfer(&mut self) -> VkAppResult<()>;
  fn wait_transfer(&mut self, timeout_ns: u64) -> VkAppResult<()>;
}

/// The only way to get a `TransferComplete`.
pub fn submit_and_wait(queue: &mut impl TransferQueue) -> VkAppResult<TransferComplete> {
  queue.submit_transfer()?;
  trace!("setup cmd buf: waiting for transfer fence");
  queue.wait_transfer(SETUP_FENCE_TIMEOUT_NS)?;
  trace!("setup cmd buf: transfer done");
  Ok(TransferComplete { _private: () })
}

struct FencedSubmit<'a> {
  device: &'a ash::Device,
  queue: vk::Queue,
  cmd_buf: vk::CommandBuffer,
  fence: vk::Fence,
}

impl TransferQueue for FencedSubmit<'_> {
  fn submit_transfer(&mut self) -> VkAppResult<()> {
    let cmd_bufs = [self.cmd_buf];
    let submit_info = vk::SubmitInfo::builder().command_buffers(&cmd_bufs).build();
    unsafe {
      self
        .device
        .queue_submit(self.queue, &[submit_info], self.fence)
    }
    .on_fail("vkQueueSubmit (setup)")
  }

  fn wait_transfer(&mut self, timeout_ns: u64) -> VkAppResult<()> {
    unsafe { self.device.wait_for_fences(&[self.fence], true, timeout_ns) }
      .on_fail("vkWaitForFences (setup)")
  }
}

/// Allocate a short-lived command buffer, record `callback` into it, submit with
/// a dedicated fence and block until done. Both command buffer and fence
/// are released before returning, also on failure.
pub unsafe fn execute_setup_cmd_buf(
  device: &ash::Device,
  queue: vk::Queue,
  cmd_pool: vk::CommandPool,
  callback: impl FnOnce(&ash::Device, vk::CommandBuffer) -> VkAppResult<()>,
) -> VkAppResult<TransferComplete> {
  let cmd_buf = create_command_buffers(device, cmd_pool, 1)?
    .into_iter()
    .next()
    .ok_or_else(|| {
      super::VkAppError::from_vk("vkAllocateCommandBuffers", vk::Result::ERROR_UNKNOWN)
    })?;

  let fence = match create_fence(device, vk::FenceCreateFlags::empty()) {
    Ok(fence) => fence,
    Err(err) => {
      device.free_command_buffers(cmd_pool, &[cmd_buf]);
      return Err(err);
    }
  };

  let mut submit = FencedSubmit {
    device,
    queue,
    cmd_buf,
    fence,
  };
  let result = record_cmd_buf(device, cmd_buf, callback).and_then(|_| submit_and_wait(&mut submit));

  device.destroy_fence(fence, None);
  device.free_command_buffers(cmd_pool, &[cmd_buf]);
  result
}

unsafe fn record_cmd_buf(
  device: &ash::Device,
  cmd_buf: vk::CommandBuffer,
  callback: impl FnOnce(&ash::Device, vk::CommandBuffer) -> VkAppResult<()>,
) -> VkAppResult<()> {
  let cmd_buf_begin_info = vk::CommandBufferBeginInfo::builder()
    .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT)
    .build();
  device
    .begin_command_buffer(cmd_buf, &cmd_buf_begin_info)
    .on_fail("vkBeginCommandBuffer (setup)")?;

  // execute
  callback(device, cmd_buf)?;

  device
    .end_command_buffer(cmd_buf)
    .on_fail("vkEndCommandBuffer (setup)")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::vk_utils::VkAppError;

  struct FakeQueue {
    submit_result: vk::Result,
    wait_result: vk::Result,
    calls: Vec<&'static str>,
    waited_ns: Option<u64>,
  }

  impl FakeQueue {
    fn new(submit_result: vk::Result, wait_result: vk::Result) -> Self {
      Self {
        submit_result,
        wait_result,
        calls: Vec::new(),
        waited_ns: None,
      }
    }
  }

  fn to_result(result: vk::Result, what: &'static str) -> VkAppResult<()> {
    match result {
      vk::Result::SUCCESS => Ok(()),
      err => Err(VkAppError::from_vk(what, err)),
    }
  }

  impl TransferQueue for FakeQueue {
    fn submit_transfer(&mut self) -> VkAppResult<()> {
      self.calls.push("submit");
      to_result(self.submit_result, "vkQueueSubmit (setup)")
    }

    fn wait_transfer(&mut self, timeout_ns: u64) -> VkAppResult<()> {
      self.calls.push("wait");
      self.waited_ns = Some(timeout_ns);
      to_result(self.wait_result, "vkWaitForFences (setup)")
    }
  }

  #[test]
  fn token_after_fence_signaled() {
    let mut queue = FakeQueue::new(vk::Result::SUCCESS, vk::Result::SUCCESS);
    assert!(submit_and_wait(&mut queue).is_ok());
    assert_eq!(queue.calls, vec!["submit", "wait"]);
    assert_eq!(queue.waited_ns, Some(SETUP_FENCE_TIMEOUT_NS));
  }

  #[test]
  fn timed_out_wait_gives_no_token() {
    let mut queue = FakeQueue::new(vk::Result::SUCCESS, vk::Result::TIMEOUT);
    let err = submit_and_wait(&mut queue).unwrap_err();
    assert!(matches!(err, VkAppError::Timeout { .. }));
  }

  #[test]
  fn device_lost_during_wait_gives_no_token() {
    let mut queue = FakeQueue::new(vk::Result::SUCCESS, vk::Result::ERROR_DEVICE_LOST);
    let err = submit_and_wait(&mut queue).unwrap_err();
    assert!(matches!(err, VkAppError::DeviceLost { .. }));
  }

  #[test]
  fn failed_submit_is_not_waited_on() {
    let mut queue = FakeQueue::new(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY, vk::Result::SUCCESS);
    assert!(submit_and_wait(&mut queue).is_err());
    assert_eq!(queue.calls, vec!["submit"]);
  }
}
