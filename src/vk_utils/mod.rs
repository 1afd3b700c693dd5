// mostly inspired by:
// - https://github.com/zeux/niagara/tree/master/src
// - https://github.com/MaikKlein/ash/blob/master/examples/src/lib.rs#L256
mod create_barrier;
mod create_command_buffers;
mod create_command_pool;
mod create_fences;
mod create_framebuffer;
mod create_image_view;
mod create_sampler;
mod create_semaphores;
mod create_viewport;
pub mod debug;
mod device;
mod error;
mod load_shader;
mod memory;
mod pipeline;
mod render_pass;
mod setup_cmd_buf;
mod swapchain;
mod uniforms;
mod vk_buffer;
mod vk_texture;

pub use self::create_barrier::*;
pub use self::create_command_buffers::*;
pub use self::create_command_pool::*;
pub use self::create_fences::*;
pub use self::create_framebuffer::*;
pub use self::create_image_view::*;
pub use self::create_sampler::*;
pub use self::create_semaphores::*;
pub use self::create_viewport::*;
pub use self::device::*;
pub use self::error::*;
pub use self::load_shader::*;
pub use self::memory::*;
pub use self::pipeline::*;
pub use self::render_pass::*;
pub use self::setup_cmd_buf::*;
pub use self::swapchain::*;
pub use self::uniforms::*;
pub use self::vk_buffer::*;
pub use self::vk_texture::*;
