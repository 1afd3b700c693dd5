use std::panic::Location;
use std::path::PathBuf;

use ash::vk;
use thiserror::Error;

pub type VkAppResult<T> = Result<T, VkAppError>;

/// Everything that can go wrong between `Entry::load()` and the last `vkDestroy*`.
///
/// The app treats all of these as fatal, but the kinds are kept apart so that
/// the frame loop can tell a stale swapchain from a dead device.
#[derive(Debug, Error)]
pub enum VkAppError {
  #[error("failed to load Vulkan library: {0}")]
  LoaderFailure(#[from] ash::LoadingError),

  #[error("{what} failed at {location}: {result}")]
  SetupFailure {
    what: &'static str,
    location: &'static Location<'static>,
    #[source]
    result: vk::Result,
  },

  #[error("device lost during {what} at {location}")]
  DeviceLost {
    what: &'static str,
    location: &'static Location<'static>,
  },

  #[error("timed out during {what} at {location}")]
  Timeout {
    what: &'static str,
    location: &'static Location<'static>,
  },

  #[error("swapchain is out of date ({what} at {location})")]
  StaleSwapchain {
    what: &'static str,
    location: &'static Location<'static>,
  },

  #[error("no memory type matches bits {type_bits:#b} with flags {flags:?}")]
  NoSuitableMemoryType {
    type_bits: u32,
    flags: vk::MemoryPropertyFlags,
  },

  #[error("{what} index {idx} is out of range, there are only {len}")]
  IndexOutOfRange {
    what: &'static str,
    idx: usize,
    len: usize,
  },

  #[error("none of the requested layers is available: {0:?}")]
  MissingLayer(Vec<String>),

  #[error("instance extension '{0}' is not supported")]
  MissingExtension(String),

  #[error("no physical device has a queue family with {0:?} that can present to the surface")]
  NoSuitableQueueFamily(vk::QueueFlags),

  #[error("unsupported image layout transition {0:?} -> {1:?}")]
  UnsupportedLayoutTransition(vk::ImageLayout, vk::ImageLayout),

  #[error("invalid config: {0}")]
  InvalidConfig(String),

  #[error("could not read '{path}': {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("could not parse '{path}': {reason}")]
  ResourceParse { path: PathBuf, reason: String },

  #[error("window creation failed: {0}")]
  Window(#[from] winit::error::OsError),
}

impl VkAppError {
  /// Map a raw `vk::Result` onto the matching error kind.
  #[track_caller]
  pub fn from_vk(what: &'static str, result: vk::Result) -> Self {
    let location = Location::caller();
    match result {
      vk::Result::ERROR_DEVICE_LOST => VkAppError::DeviceLost { what, location },
      vk::Result::TIMEOUT => VkAppError::Timeout { what, location },
      vk::Result::ERROR_OUT_OF_DATE_KHR => VkAppError::StaleSwapchain { what, location },
      result => VkAppError::SetupFailure {
        what,
        location,
        result,
      },
    }
  }

  pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    VkAppError::Io {
      path: path.into(),
      source,
    }
  }

  pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
    VkAppError::ResourceParse {
      path: path.into(),
      reason: reason.into(),
    }
  }

  pub fn is_stale_swapchain(&self) -> bool {
    matches!(self, VkAppError::StaleSwapchain { .. })
  }
}

/// `ash` returns bare `vk::Result` codes. This attaches the step name and
/// the source location of the call site, so errors read like
/// "vkCreateRenderPass failed at src/vk_utils/render_pass.rs:42:5: ERROR_OUT_OF_HOST_MEMORY".
pub trait VkResultExt<T> {
  fn on_fail(self, what: &'static str) -> VkAppResult<T>;
}

impl<T> VkResultExt<T> for Result<T, vk::Result> {
  #[track_caller]
  fn on_fail(self, what: &'static str) -> VkAppResult<T> {
    match self {
      Ok(v) => Ok(v),
      Err(result) => Err(VkAppError::from_vk(what, result)),
    }
  }
}
