#![cfg(windows)]

use std::ffi::c_void;
use std::os::raw::c_long;

use winapi::shared::windef::{HWND, RECT};
use winapi::um::d3d9::IDirect3DDevice9;

type HResult = c_long;
type PresentFn = unsafe extern "system" fn(
    *mut IDirect3DDevice9,
    *const RECT,
    *const RECT,
    HWND,
    *const c_void,
) -> HResult;

/// Installed at `present_vtable_slot`. Always pumps the frame hook, then
/// chains to the host's own `Present`, regardless of whether the pump found
/// anything to do: the host must never see a different `Present` than the
/// one it shipped with, just one with extra work in front of it.
pub unsafe extern "system" fn hooked_present(
    device: *mut IDirect3DDevice9,
    source_rect: *const RECT,
    dest_rect: *const RECT,
    dest_window_override: HWND,
    dirty_region: *const c_void,
) -> HResult {
    if let Some(hook) = crate::orchestration::frame_hook() {
        hook.pump();
        let original: PresentFn = std::mem::transmute(hook.original_fn());
        return original(device, source_rect, dest_rect, dest_window_override, dirty_region);
    }

    // No hook installed (startup failed or hasn't run yet): there is no
    // original pointer to chain to, so this path should be unreachable in
    // practice since the vtable slot is only ever patched after a
    // successful install.
    0
}
