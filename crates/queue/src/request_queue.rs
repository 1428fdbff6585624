use parking_lot::Mutex;
use std::collections::VecDeque;
use wowbridge_protocol::Request;

/// Default cap on in-flight requests. §9 adopts a bounded queue as a
/// refinement over the distilled design's unbounded one.
pub const DEFAULT_CAPACITY: usize = 256;

/// The IPC thread pushes onto this queue; the render thread drains it once
/// per frame tick. Guarded by a single uncontended `parking_lot::Mutex`;
/// the critical section is a `push`/`drain_all`, never more.
pub struct RequestQueue {
    inner: Mutex<VecDeque<Request>>,
    capacity: usize,
}

/// Returned when a request cannot be admitted because the queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overloaded;

impl RequestQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
            capacity,
        }
    }

    /// Enqueues a request, rejecting it if the queue is already at capacity.
    pub fn push(&self, request: Request) -> Result<(), Overloaded> {
        let mut guard = self.inner.lock();
        if guard.len() >= self.capacity {
            return Err(Overloaded);
        }
        guard.push_back(request);
        Ok(())
    }

    /// Drains every currently-queued request in FIFO order. Called once per
    /// frame tick by the frame hook; the lock is held only for the swap.
    pub fn drain_all(&self) -> Vec<Request> {
        let mut guard = self.inner.lock();
        guard.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RequestQueue {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
