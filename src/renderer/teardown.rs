use log::{error, info, trace};

use crate::vk_utils::VkAppResult;

/// Groups of Vulkan objects, destroyed strictly in `TEARDOWN_ORDER`.
/// The window is not here, `main` drops it after everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownStage {
  /// Semaphores and fences of every frame slot
  SyncObjects,
  /// Also frees the draw command buffers
  CommandPool,
  /// Vertex/index/uniform buffers, texture, sampler, descriptor pool and layout
  Resources,
  FramebuffersAndImageViews,
  /// Pipeline, pipeline layout, render pass
  Pipeline,
  SwapchainAndSurface,
  Device,
  /// Debug messenger goes with it
  Instance,
}

pub const TEARDOWN_ORDER: [TeardownStage; 8] = [
  TeardownStage::SyncObjects,
  TeardownStage::CommandPool,
  TeardownStage::Resources,
  TeardownStage::FramebuffersAndImageViews,
  TeardownStage::Pipeline,
  TeardownStage::SwapchainAndSurface,
  TeardownStage::Device,
  TeardownStage::Instance,
];

pub trait TeardownBackend {
  /// Block until the GPU finished everything that was submitted.
  fn wait_idle(&mut self) -> VkAppResult<()>;
  /// Release every object of the `stage`. Called exactly once per stage.
  fn destroy_stage(&mut self, stage: TeardownStage);
}

/// Idle wait, then release everything in reverse dependency order.
///
/// If the idle wait fails (e.g. device lost) the objects are destroyed anyway
/// and the wait error is returned afterwards.
pub fn shutdown(backend: &mut impl TeardownBackend) -> VkAppResult<()> {
  info!("Shutting down, waiting for device idle");
  let idle_result = backend.wait_idle();
  if let Err(err) = &idle_result {
    error!("Device idle wait failed, destroying objects anyway: {}", err);
  }

  for &stage in TEARDOWN_ORDER.iter() {
    trace!("Teardown: {:?}", stage);
    backend.destroy_stage(stage);
  }

  info!("Shutdown finished");
  idle_result
}
