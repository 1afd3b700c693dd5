use log::{info, trace};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use ash::extensions::{
  ext::DebugUtils,
  khr::{Surface, Swapchain},
};
use ash::vk;
use raw_window_handle::RawDisplayHandle;

use super::{VkAppError, VkAppResult, VkResultExt};
use crate::config::Config;

fn from_c_str<'a>(s: &'a [c_char]) -> &'a CStr {
  unsafe { CStr::from_ptr(s.as_ptr()) }
}

fn get_app_version() -> u32 {
  let to_u32 = |s: &str| s.parse::<u32>().unwrap_or(0);

  vk::make_api_version(
    0,
    to_u32(env!("CARGO_PKG_VERSION_MAJOR")),
    to_u32(env!("CARGO_PKG_VERSION_MINOR")),
    to_u32(env!("CARGO_PKG_VERSION_PATCH")),
  )
}

/// First of `candidates` that is in `available`.
pub fn select_validation_layer(
  candidates: &[String],
  available: &[String],
) -> VkAppResult<String> {
  candidates
    .iter()
    .find(|c| available.contains(c))
    .cloned()
    .ok_or_else(|| VkAppError::MissingLayer(candidates.to_vec()))
}

fn get_available_layers(entry: &ash::Entry) -> VkAppResult<Vec<String>> {
  let layer_props = entry
    .enumerate_instance_layer_properties()
    .on_fail("vkEnumerateInstanceLayerProperties")?;

  Ok(
    layer_props
      .iter()
      .map(|p| from_c_str(&p.layer_name).to_string_lossy().to_string())
      .collect(),
  )
}

fn ensure_extension_supported(entry: &ash::Entry, name: &CStr) -> VkAppResult<()> {
  let ext_props = entry
    .enumerate_instance_extension_properties(None)
    .on_fail("vkEnumerateInstanceExtensionProperties")?;

  let found = ext_props
    .iter()
    .any(|p| from_c_str(&p.extension_name) == name);
  if found {
    Ok(())
  } else {
    Err(VkAppError::MissingExtension(
      name.to_string_lossy().to_string(),
    ))
  }
}

fn get_layer_names(entry: &ash::Entry, config: &Config) -> VkAppResult<Vec<CString>> {
  let mut layer_names = Vec::new();
  if config.validation {
    let available = get_available_layers(entry)?;
    trace!("Available instance layers: {:?}", available);

    let layer = select_validation_layer(&config.validation_layer_candidates, &available)?;
    info!("Using validation layer '{}'", layer);
    let layer = CString::new(layer)
      .map_err(|e| VkAppError::InvalidConfig(format!("bad layer name: {}", e)))?;
    layer_names.push(layer);
  }
  Ok(layer_names)
}

fn get_extension_names(
  entry: &ash::Entry,
  display_handle: RawDisplayHandle,
  validation: bool,
) -> VkAppResult<Vec<*const c_char>> {
  let mut names = ash_window::enumerate_required_extensions(display_handle)
    .on_fail("ash_window::enumerate_required_extensions")?
    .to_vec();
  if validation {
    ensure_extension_supported(entry, DebugUtils::name())?;
    names.push(DebugUtils::name().as_ptr());
  }
  Ok(names)
}

pub fn create_instance(
  entry: &ash::Entry,
  config: &Config,
  display_handle: RawDisplayHandle,
) -> VkAppResult<ash::Instance> {
  let app_name = CString::new("Animation").unwrap_or_default();
  let engine_name = CString::new(env!("CARGO_PKG_NAME")).unwrap_or_default();

  let app_info = vk::ApplicationInfo::builder()
    .application_name(&app_name)
    .application_version(get_app_version())
    .engine_name(&engine_name)
    .engine_version(get_app_version())
    .api_version(vk::API_VERSION_1_0)
    .build();

  let layer_names = get_layer_names(entry, config)?;
  let layers_names_raw: Vec<*const c_char> = layer_names
    .iter()
    .map(|raw_name| raw_name.as_ptr())
    .collect();

  let extension_names_raw = get_extension_names(entry, display_handle, config.validation)?;

  let create_info = vk::InstanceCreateInfo::builder()
    .application_info(&app_info)
    .enabled_layer_names(&layers_names_raw)
    .enabled_extension_names(&extension_names_raw)
    .build();

  let instance = unsafe { entry.create_instance(&create_info, None) }.on_fail("vkCreateInstance")?;

  trace!("Ash instance created");
  Ok(instance)
}

fn find_queue_family(
  instance: &ash::Instance,
  surface_loader: &Surface,
  surface_khr: vk::SurfaceKHR,
  phys_device: vk::PhysicalDevice,
) -> VkAppResult<Option<u32>> {
  let q_props = unsafe { instance.get_physical_device_queue_family_properties(phys_device) };

  for (index, q) in q_props.iter().enumerate() {
    let is_gfx = q
      .queue_flags
      .contains(vk::QueueFlags::GRAPHICS | vk::QueueFlags::TRANSFER);
    if !is_gfx {
      continue;
    }

    let is_present_support = unsafe {
      surface_loader.get_physical_device_surface_support(phys_device, index as u32, surface_khr)
    }
    .on_fail("vkGetPhysicalDeviceSurfaceSupportKHR")?;

    if is_present_support {
      return Ok(Some(index as u32));
    }
  }

  Ok(None)
}

/// Picks physical device e.g. "GeForce GTX 1050 Ti" and graphic queue family index.
/// Same queue will also be used to present result.
pub fn pick_physical_device_and_queue_family_idx(
  instance: &ash::Instance,
  surface_loader: &Surface,
  surface_khr: vk::SurfaceKHR,
) -> VkAppResult<(vk::PhysicalDevice, u32)> {
  let phys_devices =
    unsafe { instance.enumerate_physical_devices() }.on_fail("vkEnumeratePhysicalDevices")?;
  info!("Found {} physical devices", phys_devices.len());

  for &phys_device in &phys_devices {
    let props = unsafe { instance.get_physical_device_properties(phys_device) };
    let device_name = from_c_str(&props.device_name);
    info!(
      "Physical device {:?} ({:?}, api {}.{}.{})",
      device_name,
      props.device_type,
      vk::api_version_major(props.api_version),
      vk::api_version_minor(props.api_version),
      vk::api_version_patch(props.api_version),
    );
  }

  for &phys_device in &phys_devices {
    if let Some(idx) = find_queue_family(instance, surface_loader, surface_khr, phys_device)? {
      let props = unsafe { instance.get_physical_device_properties(phys_device) };
      info!(
        "Using physical device: {:?}, queue family {}",
        from_c_str(&props.device_name),
        idx
      );
      return Ok((phys_device, idx));
    }
  }

  Err(VkAppError::NoSuitableQueueFamily(
    vk::QueueFlags::GRAPHICS | vk::QueueFlags::TRANSFER,
  ))
}

/// Pick logical device. Returns `true` as 3rd value if anisotropic filtering got enabled.
pub fn pick_device_and_queue(
  instance: &ash::Instance,
  phys_device: vk::PhysicalDevice,
  queue_family_index: u32,
) -> VkAppResult<(ash::Device, vk::Queue, bool)> {
  trace!("Will pick logical device");
  let queue_prio = [1.0f32]; // only one queue
  let queue_create_infos = [vk::DeviceQueueCreateInfo::builder()
    .queue_family_index(queue_family_index)
    .queue_priorities(&queue_prio)
    .build()];

  let device_extension_names_raw = [Swapchain::name().as_ptr()];

  let supported = unsafe { instance.get_physical_device_features(phys_device) };
  let has_anisotropy = supported.sampler_anisotropy != vk::FALSE;
  let features = vk::PhysicalDeviceFeatures {
    sampler_anisotropy: if has_anisotropy { vk::TRUE } else { vk::FALSE },
    ..Default::default()
  };

  let device_create_info = vk::DeviceCreateInfo::builder()
    .queue_create_infos(&queue_create_infos)
    .enabled_extension_names(&device_extension_names_raw)
    .enabled_features(&features)
    .build();

  let device: ash::Device = unsafe { instance.create_device(phys_device, &device_create_info, None) }
    .on_fail("vkCreateDevice")?;
  trace!("Logical device selected");

  let queue = unsafe { device.get_device_queue(queue_family_index, 0) }; // only one queue created above
  trace!("Queue on logical device selected");

  Ok((device, queue, has_anisotropy))
}
