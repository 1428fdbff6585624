use std::collections::HashMap;

use parking_lot::Mutex;

use crate::memory::HookMemory;

/// A scripted stand-in for process memory, so the anchor-chain resolver can
/// be exercised one null-check at a time without a live host.
#[derive(Default)]
pub struct FakeHookMemory {
    cells: Mutex<HashMap<usize, usize>>,
}

impl FakeHookMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_usize(&self, addr: usize, value: usize) {
        self.cells.lock().insert(addr, value);
    }
}

impl HookMemory for FakeHookMemory {
    fn read_usize(&self, addr: usize) -> usize {
        self.cells.lock().get(&addr).copied().unwrap_or(0)
    }

    fn write_usize(&self, addr: usize, value: usize) -> usize {
        self.cells.lock().insert(addr, value).unwrap_or(0)
    }
}
