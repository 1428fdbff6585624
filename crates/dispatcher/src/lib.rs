//! Command Dispatcher: `dispatch(Request) -> String`, the one function that
//! turns a parsed wire command into the exact response text the protocol
//! expects. Always called on the render thread.

mod dispatch;
mod memory;
mod real_memory;

pub mod fake_memory;

pub use dispatch::Dispatcher;
pub use memory::HostMemory;
pub use real_memory::RealHostMemory;
