use std::path::Path;
use std::sync::Mutex;
use std::thread::JoinHandle;

use once_cell::sync::OnceCell;

use wowbridge_dispatcher::{Dispatcher, RealHostMemory};
use wowbridge_hook::{install, uninstall, FrameHook, RealHookMemory, ResolvedSlot};
use wowbridge_ipc::{IpcServer, RealPipeListener};
use wowbridge_queue::{RequestQueue, ResponseQueue, ShutdownFlag};
use wowbridge_scripting::{RealScriptHost, ScriptingAdapter};

static REQUESTS: OnceCell<RequestQueue> = OnceCell::new();
static RESPONSES: OnceCell<ResponseQueue> = OnceCell::new();
static SHUTDOWN: OnceCell<ShutdownFlag> = OnceCell::new();
static RESOLVED_SLOT: OnceCell<ResolvedSlot> = OnceCell::new();
static FRAME_HOOK: OnceCell<FrameHook<RealScriptHost, RealHostMemory>> = OnceCell::new();
static IPC_THREAD: OnceCell<Mutex<Option<JoinHandle<()>>>> = OnceCell::new();

/// Brings up the five singletons in the order the design calls for: Offsets,
/// Scripting Adapter, Dispatcher, Frame Hook, IPC Server. `hook_fn` is the
/// address of this crate's own present trampoline, already cast to `usize`
/// by the caller (DLL attach has no other reasonable place to do that cast).
pub fn startup(offsets_path: &Path, hook_fn: usize) -> anyhow::Result<()> {
    crate::logging::init();

    let offsets = wowbridge_offsets::init_from_file(offsets_path)?;
    tracing::info!(path = %offsets_path.display(), "offsets table loaded");

    let requests = REQUESTS.get_or_init(RequestQueue::default);
    let responses = RESPONSES.get_or_init(ResponseQueue::new);
    let shutdown = SHUTDOWN.get_or_init(ShutdownFlag::new);

    let adapter = ScriptingAdapter::new(RealScriptHost::new(offsets));
    let memory = RealHostMemory::new(offsets);
    let dispatcher = Dispatcher::new(adapter, memory, offsets);

    let hook_memory = RealHookMemory::new();
    let resolved = install(&hook_memory, offsets, hook_fn)?;
    RESOLVED_SLOT
        .set(resolved)
        .map_err(|_| anyhow::anyhow!("bridge already started"))?;
    tracing::info!(slot = resolved.slot_addr, "present hook installed");

    let frame_hook = FrameHook::new(dispatcher, requests, responses, shutdown, resolved.original_fn);
    FRAME_HOOK
        .set(frame_hook)
        .map_err(|_| anyhow::anyhow!("frame hook already started"))?;

    let listener = RealPipeListener::new(wowbridge_protocol::PIPE_NAME)?;
    let mut server = IpcServer::new(listener, requests, responses, shutdown);
    let handle = std::thread::Builder::new()
        .name("wowbridge-ipc".to_string())
        .spawn(move || server.serve())?;
    IPC_THREAD
        .get_or_init(|| Mutex::new(None))
        .lock()
        .unwrap()
        .replace(handle);

    tracing::info!("bridge started");
    Ok(())
}

/// The render-thread side of the bridge. `None` before `startup` completes
/// or after a failed install; callers (the present trampoline) must treat
/// that as "run unhooked," never as an error to propagate into the host.
pub fn frame_hook() -> Option<&'static FrameHook<RealScriptHost, RealHostMemory>> {
    FRAME_HOOK.get()
}

/// Reverses `startup`: signal shutdown, unblock and join the IPC thread,
/// then uninstall the present hook. Safe to call even if `startup` never
/// ran or only partially completed.
pub fn shutdown() {
    let Some(shutdown) = SHUTDOWN.get() else {
        return;
    };
    shutdown.signal();
    unblock_accept();

    if let Some(cell) = IPC_THREAD.get() {
        if let Some(handle) = cell.lock().unwrap().take() {
            let _ = handle.join();
        }
    }

    if let Some(resolved) = RESOLVED_SLOT.get() {
        let hook_memory = RealHookMemory::new();
        uninstall(&hook_memory, *resolved);
    }

    tracing::info!("bridge stopped");
}

fn unblock_accept() {
    use std::ffi::CString;
    use std::ptr;

    use winapi::um::fileapi::{CreateFileA, WriteFile, OPEN_EXISTING};
    use winapi::um::handleapi::{CloseHandle, INVALID_HANDLE_VALUE};
    use winapi::um::winnt::{FILE_SHARE_READ, FILE_SHARE_WRITE, GENERIC_WRITE};

    let Ok(name) = CString::new(wowbridge_protocol::PIPE_NAME) else {
        return;
    };
    let handle = unsafe {
        CreateFileA(
            name.as_ptr(),
            GENERIC_WRITE,
            FILE_SHARE_READ | FILE_SHARE_WRITE,
            ptr::null_mut(),
            OPEN_EXISTING,
            0,
            ptr::null_mut(),
        )
    };
    if handle == INVALID_HANDLE_VALUE {
        return;
    }
    let dummy = [0u8];
    let mut written = 0u32;
    unsafe {
        WriteFile(handle, dummy.as_ptr() as *const _, 1, &mut written, ptr::null_mut());
        CloseHandle(handle);
    }
}
