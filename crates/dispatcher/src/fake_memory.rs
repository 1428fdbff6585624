use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;

use crate::memory::HostMemory;

#[derive(Default)]
struct FakeInner {
    cells: HashMap<usize, u64>,
    objects: HashMap<u64, usize>,
    in_front_results: VecDeque<bool>,
    cast_result: u8,
    cast_calls: Vec<(i32, u64)>,
}

/// A scripted stand-in for raw process memory and the two behind-target
/// native calls, so `IsBehindTarget`/`GetTargetGuid`/`GetComboPoints`/
/// `CastSpell` can be exercised without touching a real address space.
#[derive(Default)]
pub struct FakeHostMemory {
    inner: Mutex<FakeInner>,
}

impl FakeHostMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_cell(&self, addr: usize, value: u64) {
        self.inner.lock().cells.insert(addr, value);
    }

    pub fn set_object(&self, guid: u64, addr: usize) {
        self.inner.lock().objects.insert(guid, addr);
    }

    /// Queues the result of the next `in_front` call; the behind-target
    /// check makes exactly two calls per request, consumed in order.
    pub fn queue_in_front(&self, result: bool) {
        self.inner.lock().in_front_results.push_back(result);
    }

    pub fn set_cast_result(&self, byte: u8) {
        self.inner.lock().cast_result = byte;
    }

    pub fn cast_calls(&self) -> Vec<(i32, u64)> {
        self.inner.lock().cast_calls.clone()
    }
}

impl HostMemory for FakeHostMemory {
    fn read_u8(&self, addr: usize) -> u8 {
        self.inner.lock().cells.get(&addr).copied().unwrap_or(0) as u8
    }

    fn read_u64(&self, addr: usize) -> u64 {
        self.inner.lock().cells.get(&addr).copied().unwrap_or(0)
    }

    fn read_usize(&self, addr: usize) -> usize {
        self.inner.lock().cells.get(&addr).copied().unwrap_or(0) as usize
    }

    fn find_object_by_guid(&self, guid: u64, _flags: i32) -> usize {
        self.inner.lock().objects.get(&guid).copied().unwrap_or(0)
    }

    fn in_front(&self, _observer: usize, _observed: usize) -> bool {
        self.inner.lock().in_front_results.pop_front().unwrap_or(false)
    }

    fn cast_local_player_spell(&self, spell_id: i32, target_guid: u64) -> u8 {
        let mut guard = self.inner.lock();
        guard.cast_calls.push((spell_id, target_guid));
        guard.cast_result
    }
}
