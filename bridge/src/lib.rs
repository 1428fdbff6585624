//! DLL entry point and singleton orchestration. Everything observable about
//! the bridge (the wire protocol, the dispatcher contracts, the frame-hook
//! pump loop) lives in the lower crates; this crate only wires them
//! together in the order the design calls for and tears them down in
//! reverse.

mod logging;

#[cfg(windows)]
mod orchestration;

#[cfg(windows)]
mod present_hook;

#[cfg(windows)]
mod dll_main {
    use std::ffi::OsString;
    use std::path::PathBuf;

    use winapi::shared::minwindef::{BOOL, DWORD, HINSTANCE, LPVOID, TRUE};
    use winapi::um::winnt::{DLL_PROCESS_ATTACH, DLL_PROCESS_DETACH};

    use crate::{orchestration, present_hook};

    /// Offsets file lives next to the DLL, named after the module itself
    /// with a `.toml` extension (`wowbridge.dll` → `wowbridge.toml`).
    fn offsets_path_next_to_module(module: HINSTANCE) -> Option<PathBuf> {
        use std::os::windows::ffi::OsStringExt;
        use winapi::um::libloaderapi::GetModuleFileNameW;

        let mut buf = vec![0u16; 1024];
        let len = unsafe { GetModuleFileNameW(module as *mut _, buf.as_mut_ptr(), buf.len() as DWORD) };
        if len == 0 {
            return None;
        }
        buf.truncate(len as usize);
        let dll_path = PathBuf::from(OsString::from_wide(&buf));
        let mut path = dll_path.clone();
        path.set_extension("toml");
        Some(path)
    }

    /// # Safety
    /// Called by the Windows loader per the `DllMain` contract. Must not
    /// call back into the loader (`LoadLibrary`, most of the CRT) directly;
    /// the real work is deferred to a spawned thread for exactly that
    /// reason.
    #[no_mangle]
    pub unsafe extern "system" fn DllMain(module: HINSTANCE, reason: DWORD, _reserved: LPVOID) -> BOOL {
        match reason {
            DLL_PROCESS_ATTACH => {
                std::thread::spawn(move || {
                    let Some(path) = offsets_path_next_to_module(module) else {
                        log::error!("could not resolve module path for offsets file");
                        return;
                    };
                    let hook_fn = present_hook::hooked_present as usize;
                    if let Err(err) = orchestration::startup(&path, hook_fn) {
                        log::error!("bridge startup failed: {err:#}");
                    }
                });
            }
            DLL_PROCESS_DETACH => {
                orchestration::shutdown();
            }
            _ => {}
        }
        TRUE
    }
}
