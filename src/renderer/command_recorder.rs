use ash;
use ash::vk;
use log::trace;

use crate::vk_utils::{size_to_rect_vk, VkAppError, VkAppResult, VkResultExt};

/// Inputs to record the draw commands, one command buffer per swapchain image.
pub struct DrawCommandsDesc<'a> {
  pub render_pass: vk::RenderPass,
  /// One per swapchain image
  pub framebuffers: &'a [vk::Framebuffer],
  pub pipeline: vk::Pipeline,
  pub pipeline_layout: vk::PipelineLayout,
  pub vertex_buffer: vk::Buffer,
  pub index_buffer: vk::Buffer,
  pub index_count: u32,
  /// One per swapchain image, if any
  pub descriptor_sets: Option<&'a [vk::DescriptorSet]>,
  pub instance_count: u32,
  pub clear_color: [f32; 4],
  pub extent: vk::Extent2D,
}

/// The commands the recorder emits. Implemented by `ash::Device` wrapper for real,
/// and by a recording mock in tests.
pub trait DrawCommandEncoder {
  fn begin(&mut self, cmd_buf: vk::CommandBuffer) -> VkAppResult<()>;
  fn begin_render_pass(
    &mut self,
    cmd_buf: vk::CommandBuffer,
    render_pass: vk::RenderPass,
    framebuffer: vk::Framebuffer,
    extent: vk::Extent2D,
    clear_color: [f32; 4],
  );
  fn bind_pipeline(&mut self, cmd_buf: vk::CommandBuffer, pipeline: vk::Pipeline);
  fn bind_vertex_buffer(&mut self, cmd_buf: vk::CommandBuffer, buffer: vk::Buffer);
  fn bind_index_buffer(&mut self, cmd_buf: vk::CommandBuffer, buffer: vk::Buffer);
  fn bind_descriptor_set(
    &mut self,
    cmd_buf: vk::CommandBuffer,
    layout: vk::PipelineLayout,
    set: vk::DescriptorSet,
  );
  fn draw_indexed(&mut self, cmd_buf: vk::CommandBuffer, index_count: u32, instance_count: u32);
  fn end_render_pass(&mut self, cmd_buf: vk::CommandBuffer);
  fn end(&mut self, cmd_buf: vk::CommandBuffer) -> VkAppResult<()>;
}

/// Record `cmd_bufs[i]` to draw into `framebuffers[i]`. Buffers are recorded once,
/// then resubmitted every time their swapchain image is acquired.
pub fn record_draw_commands(
  encoder: &mut impl DrawCommandEncoder,
  desc: &DrawCommandsDesc,
  cmd_bufs: &[vk::CommandBuffer],
) -> VkAppResult<()> {
  let image_count = cmd_bufs.len();
  if desc.framebuffers.len() != image_count {
    return Err(VkAppError::InvalidConfig(format!(
      "{} command buffers, but {} framebuffers",
      image_count,
      desc.framebuffers.len()
    )));
  }
  if let Some(sets) = desc.descriptor_sets {
    if sets.len() != image_count {
      return Err(VkAppError::InvalidConfig(format!(
        "{} command buffers, but {} descriptor sets",
        image_count,
        sets.len()
      )));
    }
  }

  for (image_idx, &cmd_buf) in cmd_bufs.iter().enumerate() {
    trace!("Recording draw commands for swapchain image {}", image_idx);
    encoder.begin(cmd_buf)?;
    encoder.begin_render_pass(
      cmd_buf,
      desc.render_pass,
      desc.framebuffers[image_idx],
      desc.extent,
      desc.clear_color,
    );
    encoder.bind_pipeline(cmd_buf, desc.pipeline);
    encoder.bind_vertex_buffer(cmd_buf, desc.vertex_buffer);
    encoder.bind_index_buffer(cmd_buf, desc.index_buffer);
    if let Some(sets) = desc.descriptor_sets {
      encoder.bind_descriptor_set(cmd_buf, desc.pipeline_layout, sets[image_idx]);
    }
    encoder.draw_indexed(cmd_buf, desc.index_count, desc.instance_count);
    encoder.end_render_pass(cmd_buf);
    encoder.end(cmd_buf)?;
  }

  Ok(())
}

/// Records straight into Vulkan command buffers.
pub struct AshCommandEncoder<'a> {
  pub device: &'a ash::Device,
}

impl<'a> DrawCommandEncoder for AshCommandEncoder<'a> {
  fn begin(&mut self, cmd_buf: vk::CommandBuffer) -> VkAppResult<()> {
    // no ONE_TIME_SUBMIT, these are submitted every frame
    let begin_info = vk::CommandBufferBeginInfo::builder()
      .flags(vk::CommandBufferUsageFlags::empty())
      .build();
    unsafe { self.device.begin_command_buffer(cmd_buf, &begin_info) }
      .on_fail("vkBeginCommandBuffer")
  }

  fn begin_render_pass(
    &mut self,
    cmd_buf: vk::CommandBuffer,
    render_pass: vk::RenderPass,
    framebuffer: vk::Framebuffer,
    extent: vk::Extent2D,
    clear_color: [f32; 4],
  ) {
    let clear_values = [vk::ClearValue {
      color: vk::ClearColorValue {
        float32: clear_color,
      },
    }];
    let render_pass_begin_info = vk::RenderPassBeginInfo::builder()
      .render_pass(render_pass)
      .framebuffer(framebuffer)
      .render_area(size_to_rect_vk(&extent))
      .clear_values(&clear_values)
      .build();

    unsafe {
      self.device.cmd_begin_render_pass(
        cmd_buf,
        &render_pass_begin_info,
        vk::SubpassContents::INLINE,
      )
    };
  }

  fn bind_pipeline(&mut self, cmd_buf: vk::CommandBuffer, pipeline: vk::Pipeline) {
    unsafe {
      self
        .device
        .cmd_bind_pipeline(cmd_buf, vk::PipelineBindPoint::GRAPHICS, pipeline)
    };
  }

  fn bind_vertex_buffer(&mut self, cmd_buf: vk::CommandBuffer, buffer: vk::Buffer) {
    unsafe {
      self
        .device
        .cmd_bind_vertex_buffers(cmd_buf, 0, &[buffer], &[0])
    };
  }

  fn bind_index_buffer(&mut self, cmd_buf: vk::CommandBuffer, buffer: vk::Buffer) {
    unsafe {
      self
        .device
        .cmd_bind_index_buffer(cmd_buf, buffer, 0, vk::IndexType::UINT16)
    };
  }

  fn bind_descriptor_set(
    &mut self,
    cmd_buf: vk::CommandBuffer,
    layout: vk::PipelineLayout,
    set: vk::DescriptorSet,
  ) {
    unsafe {
      self.device.cmd_bind_descriptor_sets(
        cmd_buf,
        vk::PipelineBindPoint::GRAPHICS,
        layout,
        0,
        &[set],
        &[],
      )
    };
  }

  fn draw_indexed(&mut self, cmd_buf: vk::CommandBuffer, index_count: u32, instance_count: u32) {
    unsafe {
      self
        .device
        .cmd_draw_indexed(cmd_buf, index_count, instance_count, 0, 0, 0)
    };
  }

  fn end_render_pass(&mut self, cmd_buf: vk::CommandBuffer) {
    unsafe { self.device.cmd_end_render_pass(cmd_buf) };
  }

  fn end(&mut self, cmd_buf: vk::CommandBuffer) -> VkAppResult<()> {
    unsafe { self.device.end_command_buffer(cmd_buf) }.on_fail("vkEndCommandBuffer")
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use ash::vk::Handle;

  #[derive(Debug, Clone, PartialEq)]
  enum Cmd {
    Begin(u64),
    BeginRenderPass { fbo: u64, clear: [f32; 4] },
    BindPipeline,
    BindVertexBuffer(u64),
    BindIndexBuffer(u64),
    BindDescriptorSet(u64),
    DrawIndexed { index_count: u32, instance_count: u32 },
    EndRenderPass,
    End(u64),
  }

  #[derive(Default)]
  struct RecordingEncoder {
    cmds: Vec<Cmd>,
    fail_on_end: bool,
  }

  impl DrawCommandEncoder for RecordingEncoder {
    fn begin(&mut self, cmd_buf: vk::CommandBuffer) -> VkAppResult<()> {
      self.cmds.push(Cmd::Begin(cmd_buf.as_raw()));
      Ok(())
    }
    fn begin_render_pass(
      &mut self,
      _cmd_buf: vk::CommandBuffer,
      _render_pass: vk::RenderPass,
      framebuffer: vk::Framebuffer,
      _extent: vk::Extent2D,
      clear_color: [f32; 4],
    ) {
      self.cmds.push(Cmd::BeginRenderPass {
        fbo: framebuffer.as_raw(),
        clear: clear_color,
      });
    }
    fn bind_pipeline(&mut self, _cmd_buf: vk::CommandBuffer, _pipeline: vk::Pipeline) {
      self.cmds.push(Cmd::BindPipeline);
    }
    fn bind_vertex_buffer(&mut self, _cmd_buf: vk::CommandBuffer, buffer: vk::Buffer) {
      self.cmds.push(Cmd::BindVertexBuffer(buffer.as_raw()));
    }
    fn bind_index_buffer(&mut self, _cmd_buf: vk::CommandBuffer, buffer: vk::Buffer) {
      self.cmds.push(Cmd::BindIndexBuffer(buffer.as_raw()));
    }
    fn bind_descriptor_set(
      &mut self,
      _cmd_buf: vk::CommandBuffer,
      _layout: vk::PipelineLayout,
      set: vk::DescriptorSet,
    ) {
      self.cmds.push(Cmd::BindDescriptorSet(set.as_raw()));
    }
    fn draw_indexed(&mut self, _cmd_buf: vk::CommandBuffer, index_count: u32, instance_count: u32) {
      self.cmds.push(Cmd::DrawIndexed {
        index_count,
        instance_count,
      });
    }
    fn end_render_pass(&mut self, _cmd_buf: vk::CommandBuffer) {
      self.cmds.push(Cmd::EndRenderPass);
    }
    fn end(&mut self, cmd_buf: vk::CommandBuffer) -> VkAppResult<()> {
      if self.fail_on_end {
        return Err(VkAppError::from_vk(
          "vkEndCommandBuffer",
          vk::Result::ERROR_OUT_OF_DEVICE_MEMORY,
        ));
      }
      self.cmds.push(Cmd::End(cmd_buf.as_raw()));
      Ok(())
    }
  }

  fn handles<T: Handle>(raw: &[u64]) -> Vec<T> {
    raw.iter().map(|&r| T::from_raw(r)).collect()
  }

  fn desc<'a>(
    framebuffers: &'a [vk::Framebuffer],
    sets: Option<&'a [vk::DescriptorSet]>,
  ) -> DrawCommandsDesc<'a> {
    DrawCommandsDesc {
      render_pass: vk::RenderPass::from_raw(1),
      framebuffers,
      pipeline: vk::Pipeline::from_raw(2),
      pipeline_layout: vk::PipelineLayout::from_raw(3),
      vertex_buffer: vk::Buffer::from_raw(4),
      index_buffer: vk::Buffer::from_raw(5),
      index_count: 6,
      descriptor_sets: sets,
      instance_count: 2,
      clear_color: [0.0, 0.0, 0.0, 1.0],
      extent: vk::Extent2D {
        width: 600,
        height: 600,
      },
    }
  }

  #[test]
  fn records_exact_sequence_per_image() {
    let fbos = handles::<vk::Framebuffer>(&[100, 101, 102]);
    let sets = handles::<vk::DescriptorSet>(&[200, 201, 202]);
    let cmd_bufs = handles::<vk::CommandBuffer>(&[300, 301, 302]);
    let mut encoder = RecordingEncoder::default();

    record_draw_commands(&mut encoder, &desc(&fbos, Some(&sets)), &cmd_bufs).unwrap();

    let per_image = encoder.cmds.chunks(9).collect::<Vec<_>>();
    assert_eq!(per_image.len(), 3);
    for (i, cmds) in per_image.iter().enumerate() {
      assert_eq!(
        cmds.to_vec(),
        vec![
          Cmd::Begin(300 + i as u64),
          Cmd::BeginRenderPass {
            fbo: 100 + i as u64,
            clear: [0.0, 0.0, 0.0, 1.0]
          },
          Cmd::BindPipeline,
          Cmd::BindVertexBuffer(4),
          Cmd::BindIndexBuffer(5),
          Cmd::BindDescriptorSet(200 + i as u64),
          Cmd::DrawIndexed {
            index_count: 6,
            instance_count: 2
          },
          Cmd::EndRenderPass,
          Cmd::End(300 + i as u64),
        ]
      );
    }
  }

  #[test]
  fn skips_descriptor_binding_when_absent() {
    let fbos = handles::<vk::Framebuffer>(&[100]);
    let cmd_bufs = handles::<vk::CommandBuffer>(&[300]);
    let mut encoder = RecordingEncoder::default();

    record_draw_commands(&mut encoder, &desc(&fbos, None), &cmd_bufs).unwrap();

    assert_eq!(encoder.cmds.len(), 8);
    assert!(!encoder
      .cmds
      .iter()
      .any(|c| matches!(c, Cmd::BindDescriptorSet(_))));
  }

  #[test]
  fn count_mismatch_is_an_error() {
    let fbos = handles::<vk::Framebuffer>(&[100, 101]);
    let sets = handles::<vk::DescriptorSet>(&[200]);
    let cmd_bufs = handles::<vk::CommandBuffer>(&[300, 301]);
    let mut encoder = RecordingEncoder::default();

    assert!(record_draw_commands(&mut encoder, &desc(&fbos, Some(&sets)), &cmd_bufs).is_err());
    assert!(record_draw_commands(&mut encoder, &desc(&fbos[..1], None), &cmd_bufs).is_err());
    assert!(encoder.cmds.is_empty());
  }

  #[test]
  fn recording_failure_propagates() {
    let fbos = handles::<vk::Framebuffer>(&[100]);
    let cmd_bufs = handles::<vk::CommandBuffer>(&[300]);
    let mut encoder = RecordingEncoder {
      fail_on_end: true,
      ..Default::default()
    };

    let err = record_draw_commands(&mut encoder, &desc(&fbos, None), &cmd_bufs).unwrap_err();
    assert!(matches!(err, VkAppError::SetupFailure { .. }));
  }
}
