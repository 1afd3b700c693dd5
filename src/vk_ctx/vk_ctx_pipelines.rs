use ash;
use ash::vk;

pub struct VkCtxPipelines {
  pub render_pass: vk::RenderPass,
  pub pipeline_layout: vk::PipelineLayout,
  pub pipeline: vk::Pipeline,
}

impl VkCtxPipelines {
  pub unsafe fn destroy(&self, device: &ash::Device) {
    device.destroy_pipeline(self.pipeline, None);
    device.destroy_pipeline_layout(self.pipeline_layout, None);
    device.destroy_render_pass(self.render_pass, None);
  }
}
