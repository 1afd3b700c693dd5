use log::{info, trace};

use ash::extensions::khr::{Surface, Swapchain};
use ash::vk;

use super::{create_image_view, VkAppError, VkAppResult, VkResultExt};

/// Gets surface from OS window
pub fn create_surface_khr(
  entry: &ash::Entry,
  instance: &ash::Instance,
  window: &winit::window::Window,
) -> VkAppResult<vk::SurfaceKHR> {
  use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};

  unsafe {
    ash_window::create_surface(
      entry,
      instance,
      window.raw_display_handle(),
      window.raw_window_handle(),
      None,
    )
  }
  .on_fail("ash_window::create_surface")
}

/// Prefer B8G8R8A8_UNORM + SRGB_NONLINEAR, otherwise whatever is first.
///
/// https://registry.khronos.org/vulkan/specs/1.3-extensions/man/html/VkSurfaceFormatKHR.html
pub fn choose_surface_format(
  surface_formats: &[vk::SurfaceFormatKHR],
) -> Option<vk::SurfaceFormatKHR> {
  // Single VK_FORMAT_UNDEFINED means 'anything goes'
  if let [only] = surface_formats {
    if only.format == vk::Format::UNDEFINED {
      return Some(vk::SurfaceFormatKHR {
        format: vk::Format::B8G8R8A8_UNORM,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
      });
    }
  }

  let preferred = surface_formats.iter().find(|surface_fmt| {
    let fmt_ok = surface_fmt.format == vk::Format::B8G8R8A8_UNORM;
    let color_space_ok = surface_fmt.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR;
    fmt_ok && color_space_ok
  });

  preferred.or_else(|| surface_formats.first()).copied()
}

/// MAILBOX, then IMMEDIATE. FIFO is guaranteed to exist.
///
/// https://registry.khronos.org/vulkan/specs/1.3-extensions/man/html/VkPresentModeKHR.html
pub fn choose_present_mode(present_modes: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
  [vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::IMMEDIATE]
    .iter()
    .copied()
    .find(|mode| present_modes.contains(mode))
    .unwrap_or(vk::PresentModeKHR::FIFO)
}

/// `current_extent` of `u32::MAX` means the window manager lets us pick.
pub fn choose_extent(
  capabilities: &vk::SurfaceCapabilitiesKHR,
  window_size: vk::Extent2D,
) -> vk::Extent2D {
  if capabilities.current_extent.width != u32::MAX {
    return capabilities.current_extent;
  }

  let (min, max) = (capabilities.min_image_extent, capabilities.max_image_extent);
  vk::Extent2D {
    width: window_size.width.clamp(min.width, max.width),
    height: window_size.height.clamp(min.height, max.height),
  }
}

/// One more than the minimum. `max_image_count == 0` means no limit.
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
  let image_count = capabilities.min_image_count + 1;
  if capabilities.max_image_count > 0 {
    image_count.min(capabilities.max_image_count)
  } else {
    image_count
  }
}

fn get_pre_transform(
  surface_capabilities: &vk::SurfaceCapabilitiesKHR,
) -> vk::SurfaceTransformFlagsKHR {
  let can_identity = surface_capabilities
    .supported_transforms
    .contains(vk::SurfaceTransformFlagsKHR::IDENTITY);
  if can_identity {
    vk::SurfaceTransformFlagsKHR::IDENTITY
  } else {
    surface_capabilities.current_transform
  }
}

/// Everything needed to create the swapchain, queried from the surface.
pub struct SwapchainSupport {
  pub surface_format: vk::SurfaceFormatKHR,
  pub present_mode: vk::PresentModeKHR,
  pub capabilities: vk::SurfaceCapabilitiesKHR,
}

pub fn query_swapchain_support(
  surface_loader: &Surface,
  surface_khr: vk::SurfaceKHR,
  phys_device: vk::PhysicalDevice,
) -> VkAppResult<SwapchainSupport> {
  let surface_formats =
    unsafe { surface_loader.get_physical_device_surface_formats(phys_device, surface_khr) }
      .on_fail("vkGetPhysicalDeviceSurfaceFormatsKHR")?;
  let present_modes =
    unsafe { surface_loader.get_physical_device_surface_present_modes(phys_device, surface_khr) }
      .on_fail("vkGetPhysicalDeviceSurfacePresentModesKHR")?;
  let capabilities =
    unsafe { surface_loader.get_physical_device_surface_capabilities(phys_device, surface_khr) }
      .on_fail("vkGetPhysicalDeviceSurfaceCapabilitiesKHR")?;
  trace!("Surface_capabilities {:?}", capabilities);

  let surface_format = choose_surface_format(&surface_formats).ok_or_else(|| {
    VkAppError::from_vk(
      "vkGetPhysicalDeviceSurfaceFormatsKHR",
      vk::Result::ERROR_FORMAT_NOT_SUPPORTED,
    )
  })?;
  let present_mode = choose_present_mode(&present_modes);
  info!(
    "Surface format {:?}, present mode {:?}",
    surface_format, present_mode
  );

  Ok(SwapchainSupport {
    surface_format,
    present_mode,
    capabilities,
  })
}

pub fn create_swapchain_khr(
  swapchain_loader: &Swapchain,
  surface_khr: vk::SurfaceKHR,
  support: &SwapchainSupport,
  size: &vk::Extent2D,
) -> VkAppResult<vk::SwapchainKHR> {
  let create_info = vk::SwapchainCreateInfoKHR::builder()
    .surface(surface_khr)
    .min_image_count(choose_image_count(&support.capabilities))
    .image_format(support.surface_format.format)
    .image_color_space(support.surface_format.color_space)
    .image_extent(*size)
    .image_array_layers(1)
    .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
    // same queue does graphics and present
    .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
    .present_mode(support.present_mode)
    .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
    .pre_transform(get_pre_transform(&support.capabilities))
    .clipped(true)
    .build();

  let swapchain = unsafe { swapchain_loader.create_swapchain(&create_info, None) }
    .on_fail("vkCreateSwapchainKHR")?;
  trace!("Swapchain created");
  Ok(swapchain)
}

pub fn create_swapchain_images(
  swapchain_loader: &Swapchain,
  swapchain: vk::SwapchainKHR,
  device: &ash::Device,
  image_format: vk::Format,
) -> VkAppResult<(Vec<vk::Image>, Vec<vk::ImageView>)> {
  // auto destroyed with swapchain
  let swapchain_images = unsafe { swapchain_loader.get_swapchain_images(swapchain) }
    .on_fail("vkGetSwapchainImagesKHR")?;
  trace!("Will create {} swapchain images", swapchain_images.len());

  let swapchain_image_views = swapchain_images
    .iter()
    .map(|&image| create_image_view(device, image, image_format, vk::ImageAspectFlags::COLOR))
    .collect::<VkAppResult<Vec<_>>>()?;

  trace!("Swapchain images created");
  Ok((swapchain_images, swapchain_image_views))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fmt(format: vk::Format, color_space: vk::ColorSpaceKHR) -> vk::SurfaceFormatKHR {
    vk::SurfaceFormatKHR {
      format,
      color_space,
    }
  }

  fn caps(min: u32, max: u32, current: (u32, u32)) -> vk::SurfaceCapabilitiesKHR {
    vk::SurfaceCapabilitiesKHR {
      min_image_count: min,
      max_image_count: max,
      current_extent: vk::Extent2D {
        width: current.0,
        height: current.1,
      },
      min_image_extent: vk::Extent2D {
        width: 100,
        height: 100,
      },
      max_image_extent: vk::Extent2D {
        width: 1000,
        height: 500,
      },
      ..Default::default()
    }
  }

  #[test]
  fn surface_format_prefers_bgra_unorm() {
    let formats = [
      fmt(vk::Format::R8G8B8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
      fmt(vk::Format::B8G8R8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
    ];
    assert_eq!(choose_surface_format(&formats), Some(formats[1]));
  }

  #[test]
  fn surface_format_falls_back_to_first() {
    let formats = [
      fmt(vk::Format::R8G8B8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
      fmt(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
    ];
    assert_eq!(choose_surface_format(&formats), Some(formats[0]));
    assert_eq!(choose_surface_format(&[]), None);
  }

  #[test]
  fn surface_format_undefined_means_free_choice() {
    let formats = [fmt(vk::Format::UNDEFINED, vk::ColorSpaceKHR::SRGB_NONLINEAR)];
    let chosen = choose_surface_format(&formats).unwrap();
    assert_eq!(chosen.format, vk::Format::B8G8R8A8_UNORM);
  }

  #[test]
  fn present_mode_preference() {
    use vk::PresentModeKHR as P;
    assert_eq!(choose_present_mode(&[P::FIFO, P::MAILBOX]), P::MAILBOX);
    assert_eq!(choose_present_mode(&[P::IMMEDIATE, P::FIFO]), P::IMMEDIATE);
    assert_eq!(
      choose_present_mode(&[P::IMMEDIATE, P::MAILBOX]),
      P::MAILBOX
    );
    assert_eq!(choose_present_mode(&[P::FIFO_RELAXED]), P::FIFO);
  }

  #[test]
  fn extent_uses_current_when_defined() {
    let c = caps(2, 3, (640, 480));
    let window = vk::Extent2D {
      width: 600,
      height: 600,
    };
    assert_eq!(choose_extent(&c, window), c.current_extent);
  }

  #[test]
  fn extent_clamps_window_size() {
    let c = caps(2, 3, (u32::MAX, u32::MAX));
    let window = vk::Extent2D {
      width: 600,
      height: 600,
    };
    let e = choose_extent(&c, window);
    assert_eq!((e.width, e.height), (600, 500));

    let tiny = vk::Extent2D {
      width: 1,
      height: 1,
    };
    let e = choose_extent(&c, tiny);
    assert_eq!((e.width, e.height), (100, 100));
  }

  #[test]
  fn image_count_is_min_plus_one_clamped() {
    assert_eq!(choose_image_count(&caps(2, 8, (1, 1))), 3);
    assert_eq!(choose_image_count(&caps(3, 3, (1, 1))), 3);
    // 0 == unbounded
    assert_eq!(choose_image_count(&caps(3, 0, (1, 1))), 4);
  }
}
