use ash;
use ash::vk;
use log::trace;
use std::path::Path;

use super::{
  create_viewport, load_shader, size_to_rect_vk, VkAppError, VkAppResult, VkResultExt,
};

pub fn create_pipeline_layout(
  device: &ash::Device,
  uniform_layouts: &[vk::DescriptorSetLayout],
) -> VkAppResult<vk::PipelineLayout> {
  let create_info = vk::PipelineLayoutCreateInfo::builder()
    .set_layouts(uniform_layouts)
    .build();
  unsafe { device.create_pipeline_layout(&create_info, None) }.on_fail("vkCreatePipelineLayout")
}

/// Vertex buffer layout, see `MeshVertex`
pub struct VertexInputDesc<'a> {
  pub bindings: &'a [vk::VertexInputBindingDescription],
  pub attributes: &'a [vk::VertexInputAttributeDescription],
}

/// Triangle list, static viewport/scissor covering `size`, no culling, no blending.
pub fn create_mesh_pipeline(
  device: &ash::Device,
  render_pass: vk::RenderPass,
  pipeline_layout: vk::PipelineLayout,
  shader_paths: (&Path, &Path),
  vertex_desc: VertexInputDesc,
  size: &vk::Extent2D,
) -> VkAppResult<vk::Pipeline> {
  trace!("Will create pipeline for a (device, render pass) based on shaders");
  let (module_vs, stage_vs) = load_shader(device, vk::ShaderStageFlags::VERTEX, shader_paths.0)?;
  let (module_fs, stage_fs) =
    match load_shader(device, vk::ShaderStageFlags::FRAGMENT, shader_paths.1) {
      Ok(x) => x,
      Err(err) => {
        unsafe { device.destroy_shader_module(module_vs, None) };
        return Err(err);
      }
    };

  let stages = [stage_vs, stage_fs];
  let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::builder()
    .vertex_binding_descriptions(vertex_desc.bindings)
    .vertex_attribute_descriptions(vertex_desc.attributes)
    .build();
  let input_assembly_state = ps_ia_triangle_list();

  // hardcoded size, window is not resizable
  let viewports = [create_viewport(size)];
  let scissors = [size_to_rect_vk(size)];
  let viewport_state = vk::PipelineViewportStateCreateInfo::builder()
    .viewports(&viewports)
    .scissors(&scissors)
    .build();

  let rasterization_state = ps_raster_polygons(vk::CullModeFlags::NONE);
  let multisample_state = ps_multisample_disabled();
  let color_attachments = [ps_color_attachment_write_all()];
  let color_blend_state = vk::PipelineColorBlendStateCreateInfo::builder()
    .logic_op_enable(false)
    .attachments(&color_attachments)
    .build();

  let create_info = vk::GraphicsPipelineCreateInfo::builder()
    .stages(&stages)
    .vertex_input_state(&vertex_input_state)
    .input_assembly_state(&input_assembly_state)
    .viewport_state(&viewport_state)
    .rasterization_state(&rasterization_state)
    .multisample_state(&multisample_state)
    .color_blend_state(&color_blend_state)
    .layout(pipeline_layout)
    .render_pass(render_pass)
    .subpass(0)
    .build();

  let pipelines = unsafe {
    let pipelines =
      device.create_graphics_pipelines(vk::PipelineCache::null(), &[create_info], None);
    device.destroy_shader_module(module_vs, None);
    device.destroy_shader_module(module_fs, None);
    pipelines
  };

  match pipelines {
    Ok(ps) => ps.into_iter().next().ok_or_else(|| {
      VkAppError::from_vk("vkCreateGraphicsPipelines", vk::Result::ERROR_UNKNOWN)
    }),
    Err((_, result)) => Err(VkAppError::from_vk("vkCreateGraphicsPipelines", result)),
  }
}

// Presets for `vk::GraphicsPipelineCreateInfo`.

/// PipelineInputAssembly-TRIANGLE_LIST
pub fn ps_ia_triangle_list() -> vk::PipelineInputAssemblyStateCreateInfo {
  vk::PipelineInputAssemblyStateCreateInfo::builder()
    .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
    .primitive_restart_enable(false)
    .build()
}

pub fn ps_raster_polygons(
  cull_mode: vk::CullModeFlags,
) -> vk::PipelineRasterizationStateCreateInfo {
  vk::PipelineRasterizationStateCreateInfo::builder()
    .depth_clamp_enable(false)
    .rasterizer_discard_enable(false)
    .polygon_mode(vk::PolygonMode::FILL)
    .cull_mode(cull_mode)
    .front_face(vk::FrontFace::CLOCKWISE)
    .depth_bias_enable(false)
    .line_width(1.0) // validation layers: has to be 1.0 if not dynamic
    .build()
}

pub fn ps_multisample_disabled() -> vk::PipelineMultisampleStateCreateInfo {
  vk::PipelineMultisampleStateCreateInfo::builder()
    .rasterization_samples(vk::SampleCountFlags::TYPE_1)
    .sample_shading_enable(false)
    .build()
}

/// Write RGBA, disable blending
pub fn ps_color_attachment_write_all() -> vk::PipelineColorBlendAttachmentState {
  vk::PipelineColorBlendAttachmentState::builder()
    .color_write_mask(vk::ColorComponentFlags::RGBA)
    .blend_enable(false)
    .src_color_blend_factor(vk::BlendFactor::ONE) // shader output
    .dst_color_blend_factor(vk::BlendFactor::ZERO) // existing value on destination attachment
    .src_alpha_blend_factor(vk::BlendFactor::ONE)
    .dst_alpha_blend_factor(vk::BlendFactor::ZERO)
    .build()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn raster_state_has_no_culling_and_clockwise_front() {
    let state = ps_raster_polygons(vk::CullModeFlags::NONE);
    assert_eq!(state.cull_mode, vk::CullModeFlags::NONE);
    assert_eq!(state.front_face, vk::FrontFace::CLOCKWISE);
    assert_eq!(state.line_width, 1.0);
  }

  #[test]
  fn blending_is_off() {
    let state = ps_color_attachment_write_all();
    assert_eq!(state.blend_enable, vk::FALSE);
    assert_eq!(state.color_write_mask, vk::ColorComponentFlags::RGBA);
  }
}
