use wowbridge_dispatcher::{Dispatcher, HostMemory};
use wowbridge_offsets::OffsetsTable;
use wowbridge_queue::{RequestQueue, ResponseQueue, ShutdownFlag};
use wowbridge_scripting::ScriptHost;

use crate::error::HookError;
use crate::memory::HookMemory;
use crate::resolver::{resolve_present_slot, ResolvedSlot};

/// Owns the dispatcher and the two queues on the render-thread side of the
/// bridge. `pump` is the testable heart of the per-frame callback; the real
/// `extern "system"` trampoline (not unit-tested, since it calls into a live
/// Direct3D device) always calls `pump` and then the original function.
pub struct FrameHook<H: ScriptHost, M: HostMemory> {
    dispatcher: Dispatcher<H, M>,
    requests: &'static RequestQueue,
    responses: &'static ResponseQueue,
    shutdown: &'static ShutdownFlag,
    original_fn: usize,
}

impl<H: ScriptHost, M: HostMemory> FrameHook<H, M> {
    pub fn new(
        dispatcher: Dispatcher<H, M>,
        requests: &'static RequestQueue,
        responses: &'static ResponseQueue,
        shutdown: &'static ShutdownFlag,
        original_fn: usize,
    ) -> Self {
        Self {
            dispatcher,
            requests,
            responses,
            shutdown,
            original_fn,
        }
    }

    pub fn original_fn(&self) -> usize {
        self.original_fn
    }

    /// Drains the request queue, dispatches each request, and pushes
    /// responses in the same order. Does nothing once shutdown has been
    /// signaled; callers still chain to the original present function
    /// afterward regardless of what `pump` did.
    pub fn pump(&self) {
        if self.shutdown.is_signaled() {
            return;
        }

        let drained = self.requests.drain_all();
        if drained.is_empty() {
            return;
        }

        let responses: Vec<String> = drained
            .into_iter()
            .map(|request| self.dispatcher.dispatch(request))
            .collect();
        self.responses.push_all(responses);
    }
}

/// Resolves the present vtable slot and patches it to point at `hook_fn`,
/// returning what was there before so the caller can restore it on teardown.
pub fn install(
    mem: &dyn HookMemory,
    offsets: &OffsetsTable,
    hook_fn: usize,
) -> Result<ResolvedSlot, HookError> {
    let resolved = resolve_present_slot(mem, offsets)?;
    mem.write_usize(resolved.slot_addr, hook_fn);
    Ok(resolved)
}

/// Reverses `install`, writing the original function pointer back into the
/// slot that was patched.
pub fn uninstall(mem: &dyn HookMemory, resolved: ResolvedSlot) {
    mem.write_usize(resolved.slot_addr, resolved.original_fn);
}

#[cfg(test)]
mod tests {
    use super::*;
    use wowbridge_dispatcher::fake_memory::FakeHostMemory;
    use wowbridge_protocol::Request;
    use wowbridge_scripting::fake::FakeScriptHost;
    use wowbridge_scripting::ScriptingAdapter;

    fn test_offsets() -> &'static OffsetsTable {
        Box::leak(Box::new(OffsetsTable {
            script_execute: 1,
            pcall: 2,
            load_buffer: 3,
            get_top: 4,
            set_top: 5,
            to_number: 6,
            to_integer: 7,
            to_boolean: 8,
            to_lstring: 9,
            is_number: 10,
            is_string: 11,
            lua_type: 12,
            push_integer: 13,
            push_string: 14,
            push_nil: 15,
            get_field: 16,
            state_pointer_anchor: 17,
            native_spell_info: 18,
            native_cast_spell: 19,
            find_object_by_guid: 20,
            in_front_check: 21,
            client_connection_anchor: 22,
            object_manager_offset: 23,
            local_guid_offset: 24,
            combo_points_anchor: 25,
            current_target_guid_anchor: 26,
            present_function_anchor: 0x1000,
            present_anchor_indirection_1: 0x10,
            present_anchor_indirection_2: 0x20,
            present_vtable_slot: 0x4c,
        }))
    }

    fn build_hook() -> (
        FrameHook<FakeScriptHost, FakeHostMemory>,
        &'static RequestQueue,
        &'static ResponseQueue,
        &'static ShutdownFlag,
    ) {
        let offsets = test_offsets();
        let host = FakeScriptHost::new();
        let adapter = ScriptingAdapter::new(host);
        let memory = FakeHostMemory::new();
        let dispatcher = Dispatcher::new(adapter, memory, offsets);

        let requests: &'static RequestQueue = Box::leak(Box::new(RequestQueue::new(16)));
        let responses: &'static ResponseQueue = Box::leak(Box::new(ResponseQueue::new()));
        let shutdown: &'static ShutdownFlag = Box::leak(Box::new(ShutdownFlag::new()));

        let hook = FrameHook::new(dispatcher, requests, responses, shutdown, 0xABCDEF);
        (hook, requests, responses, shutdown)
    }

    #[test]
    fn pump_skips_entirely_when_shutdown_signaled() {
        let (hook, requests, responses, shutdown) = build_hook();
        requests.push(Request::Ping).unwrap();
        shutdown.signal();

        hook.pump();

        assert_eq!(requests.len(), 1, "drain must not run once shutdown is signaled");
        assert!(responses.is_empty());
    }

    #[test]
    fn pump_is_a_noop_when_queue_is_empty() {
        let (hook, _requests, responses, _shutdown) = build_hook();
        hook.pump();
        assert!(responses.is_empty());
    }

    #[test]
    fn pump_drains_and_dispatches_in_order() {
        let (hook, requests, responses, _shutdown) = build_hook();
        requests.push(Request::Ping).unwrap();
        requests.push(Request::GetTargetGuid).unwrap();

        hook.pump();

        assert_eq!(responses.try_pop().as_deref(), Some("PONG"));
        assert_eq!(responses.try_pop().as_deref(), Some("TARGET_GUID:0"));
        assert_eq!(responses.try_pop(), None);
    }

    #[test]
    fn install_then_uninstall_round_trips_original_pointer() {
        let offsets = test_offsets();
        let mem = crate::fake_memory::FakeHookMemory::new();
        mem.set_usize(offsets.present_function_anchor, 0x2000);
        mem.set_usize(0x2000 + offsets.present_anchor_indirection_1, 0x3000);
        mem.set_usize(0x3000 + offsets.present_anchor_indirection_2, 0x4000);
        mem.set_usize(0x4000, 0x5000);
        mem.set_usize(0x5000 + offsets.present_vtable_slot, 0xDEADBEEF);

        let resolved = install(&mem, offsets, 0x1111_2222).unwrap();
        assert_eq!(resolved.original_fn, 0xDEADBEEF);
        assert_eq!(mem.read_usize(resolved.slot_addr), 0x1111_2222);

        uninstall(&mem, resolved);
        assert_eq!(mem.read_usize(resolved.slot_addr), 0xDEADBEEF);
    }

    #[test]
    fn install_propagates_null_chain_errors() {
        let offsets = test_offsets();
        let mem = crate::fake_memory::FakeHookMemory::new();
        assert_eq!(install(&mem, offsets, 0x1234), Err(HookError::NullAnchor));
    }
}
