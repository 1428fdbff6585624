//! Cross-thread hand-off: the request queue (IPC thread → render thread),
//! the response queue (render thread → IPC thread), and the shutdown flag
//! both threads watch.

mod request_queue;
mod response_queue;
mod shutdown;

pub use request_queue::{Overloaded, RequestQueue, DEFAULT_CAPACITY};
pub use response_queue::ResponseQueue;
pub use shutdown::ShutdownFlag;
