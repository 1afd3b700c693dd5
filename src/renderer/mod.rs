mod command_recorder;
mod frame_loop;
mod frame_slot;
mod mesh_ubo;
#[cfg(test)]
mod mock_backend;
mod teardown;

pub use self::command_recorder::*;
pub use self::frame_loop::*;
pub use self::frame_slot::*;
pub use self::mesh_ubo::*;
pub use self::teardown::*;
