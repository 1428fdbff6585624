/// Raw pointer access the install/uninstall path needs: walking the anchor
/// indirections, reading/patching the vtable slot. Separate from
/// `wowbridge_dispatcher::HostMemory`: a different component with a
/// different concern, even though both ultimately read process memory.
pub trait HookMemory: Send + Sync {
    fn read_usize(&self, addr: usize) -> usize;

    /// Writes `value` at `addr`, returning what was there before (the
    /// uninstall path restores this). Implementations are responsible for
    /// making the page writable first if the host mapped it read-only.
    fn write_usize(&self, addr: usize, value: usize) -> usize;
}
