use crate::memory::HookMemory;

/// `HookMemory` backed by real process memory. The install path patches a
/// live vtable entry, which on Windows sits in a page the host may have
/// mapped read-only, so writes go through `VirtualProtect` around the patch.
pub struct RealHookMemory;

impl RealHookMemory {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealHookMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl HookMemory for RealHookMemory {
    fn read_usize(&self, addr: usize) -> usize {
        // SAFETY: `addr` is always derived from the offsets table's anchor
        // chain; the host's layout is the contract, not something checked
        // here.
        unsafe { std::ptr::read(addr as *const usize) }
    }

    #[cfg(windows)]
    fn write_usize(&self, addr: usize, value: usize) -> usize {
        use winapi::um::memoryapi::VirtualProtect;
        use winapi::um::winnt::PAGE_EXECUTE_READWRITE;

        unsafe {
            let ptr = addr as *mut usize;
            let mut old_protect: u32 = 0;
            VirtualProtect(
                ptr as *mut _,
                std::mem::size_of::<usize>(),
                PAGE_EXECUTE_READWRITE,
                &mut old_protect,
            );
            let previous = std::ptr::read(ptr);
            std::ptr::write(ptr, value);
            VirtualProtect(ptr as *mut _, std::mem::size_of::<usize>(), old_protect, &mut old_protect);
            previous
        }
    }

    #[cfg(not(windows))]
    fn write_usize(&self, addr: usize, value: usize) -> usize {
        unsafe {
            let ptr = addr as *mut usize;
            let previous = std::ptr::read(ptr);
            std::ptr::write(ptr, value);
            previous
        }
    }
}
