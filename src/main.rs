use log::{error, info};
use winit::{
  dpi::LogicalSize,
  event::{Event, VirtualKeyCode, WindowEvent},
  event_loop::{ControlFlow, EventLoop},
  platform::run_return::EventLoopExtRunReturn,
  window::WindowBuilder,
};

use crate::{
  app_timer::AppTimer,
  config::Config,
  renderer::{shutdown, FrameLoop, MeshTransform},
  scene::load_scene,
  vk_ctx::vk_ctx_initialize,
  vk_utils::{VkAppError, VkAppResult},
};

mod app_timer;
mod config;
mod renderer;
mod scene;
mod vk_ctx;
mod vk_utils;

// glslangValidator.exe -V src/shaders/mesh.frag.glsl -o src/shaders-compiled/mesh.frag.spv
// glslangValidator.exe -V src/shaders/mesh.vert.glsl -o src/shaders-compiled/mesh.vert.spv
// spirv-dis.exe vert.spv

fn main() {
  if let Err(err) = simple_logger::SimpleLogger::new().init() {
    eprintln!("Could not init logger: {}", err);
  }
  log::set_max_level(log::LevelFilter::Info);
  info!("-- Start --");

  if let Err(err) = run() {
    error!("Fatal: {}", err);
    eprintln!("{}", err);
    std::process::exit(1);
  }
  info!("-- End --");
}

fn run() -> VkAppResult<()> {
  let config = Config::from_env()?;
  log::set_max_level(config.log_level);

  // init window
  let mut event_loop = EventLoop::new();
  let window = WindowBuilder::new()
    .with_title(config.window_title.clone())
    .with_resizable(false)
    .with_inner_size(LogicalSize::new(config.window_width, config.window_height))
    .build(&event_loop)?;

  // scene, read from disk before any GPU work
  let scene = load_scene(&config)?;

  // init renderer, returns once mesh and texture are on the GPU
  let (mut vk_app, upload) = vk_ctx_initialize(&window, &config, &scene)?;
  info!("Render init went OK!");

  let mut frame_loop = FrameLoop::new(&vk_app, MeshTransform::from_config(&config), &upload);
  let mut timer = AppTimer::new();
  let mut frame_error: Option<VkAppError> = None;

  // start event loop
  info!("Starting event loop");
  event_loop.run_return(|event, _, control_flow| {
    *control_flow = ControlFlow::Poll;

    match event {
      // on clicked 'x'
      Event::WindowEvent {
        event: WindowEvent::CloseRequested,
        ..
      } => {
        *control_flow = ControlFlow::Exit;
      }

      // on keyboard
      Event::WindowEvent {
        event: WindowEvent::KeyboardInput { input, .. },
        ..
      } => {
        if input.virtual_keycode == Some(VirtualKeyCode::Escape) {
          *control_flow = ControlFlow::Exit;
        }
      }

      Event::MainEventsCleared => match frame_loop.draw_frame(&mut vk_app, timer.elapsed_sec()) {
        Ok(_) => timer.mark_frame(),
        Err(err) => {
          error!("Frame {} failed: {}", timer.frame_count(), err);
          if err.is_stale_swapchain() {
            error!("Swapchain rebuild is not supported, the window is not resizable");
          }
          frame_error = Some(err);
          *control_flow = ControlFlow::Exit;
        }
      },

      // default
      _ => (),
    }
  });
  info!(
    "EventLoop is shutting down after {} frames",
    frame_loop.frames_drawn()
  );

  let shutdown_result = shutdown(&mut vk_app);
  // surface is gone, window can follow
  drop(window);

  match frame_error {
    Some(err) => Err(err),
    None => shutdown_result,
  }
}
