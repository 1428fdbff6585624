use std::ffi::CString;
use std::os::raw::c_char;

use wowbridge_offsets::OffsetsTable;

use crate::host::ScriptHost;
use crate::lua_state::{LuaState, LuaType};

// The embedded engine exposes a C API over the host's own calling
// convention. The host binary is a 32-bit cdecl build, so every function
// pointer below is typed accordingly.
type ScriptExecuteFn = unsafe extern "C" fn(code: *const c_char, source_name: *const c_char);
type GetTopFn = unsafe extern "C" fn(state: usize) -> i32;
type SetTopFn = unsafe extern "C" fn(state: usize, index: i32);
type PushIntegerFn = unsafe extern "C" fn(state: usize, value: i64);
type PushStringFn = unsafe extern "C" fn(state: usize, value: *const c_char);
type PushNilFn = unsafe extern "C" fn(state: usize);
type ToNumberFn = unsafe extern "C" fn(state: usize, index: i32) -> f64;
type ToIntegerFn = unsafe extern "C" fn(state: usize, index: i32) -> i64;
type ToBooleanFn = unsafe extern "C" fn(state: usize, index: i32) -> i32;
type ToLStringFn = unsafe extern "C" fn(state: usize, index: i32, len: *mut usize) -> *const c_char;
type LuaTypeFn = unsafe extern "C" fn(state: usize, index: i32) -> i32;
type LoadBufferFn =
    unsafe extern "C" fn(state: usize, buf: *const c_char, size: usize, chunk_name: *const c_char) -> i32;
type PcallFn = unsafe extern "C" fn(state: usize, nargs: i32, nresults: i32, errfunc: i32) -> i32;
type NativeSpellInfoFn = unsafe extern "C" fn(state: usize) -> i32;

/// `ScriptHost` backed by the real offsets table: every call resolves a
/// function pointer out of `offsets` and invokes it against the host's
/// actual process memory.
///
/// The table also carries `is_number`/`is_string` addresses (part of the
/// offsets contract); this host doesn't call them separately since
/// `lua_type_of` is a strict superset of what they report.
pub struct RealScriptHost {
    offsets: &'static OffsetsTable,
}

impl RealScriptHost {
    pub fn new(offsets: &'static OffsetsTable) -> Self {
        Self { offsets }
    }

    fn cstring_lossy(value: &str) -> CString {
        CString::new(value).unwrap_or_else(|e| {
            let truncated = &value.as_bytes()[..e.nul_position()];
            CString::new(truncated).unwrap_or_default()
        })
    }
}

impl ScriptHost for RealScriptHost {
    fn state_pointer(&self) -> Option<LuaState> {
        // SAFETY: `state_pointer_anchor` is contractually a pointer-sized
        // slot in the host's address space (offsets §6.2); reading it is
        // the one raw memory access outside of a function-pointer call.
        let value = unsafe { std::ptr::read(self.offsets.state_pointer_anchor as *const usize) };
        if value == 0 {
            None
        } else {
            Some(LuaState(value))
        }
    }

    fn get_top(&self, state: LuaState) -> i32 {
        unsafe {
            let f: GetTopFn = self.offsets.as_fn(self.offsets.get_top);
            f(state.0)
        }
    }

    fn set_top(&self, state: LuaState, index: i32) {
        unsafe {
            let f: SetTopFn = self.offsets.as_fn(self.offsets.set_top);
            f(state.0, index)
        }
    }

    fn push_integer(&self, state: LuaState, value: i64) {
        unsafe {
            let f: PushIntegerFn = self.offsets.as_fn(self.offsets.push_integer);
            f(state.0, value)
        }
    }

    fn push_string(&self, state: LuaState, value: &str) {
        let c_value = Self::cstring_lossy(value);
        unsafe {
            let f: PushStringFn = self.offsets.as_fn(self.offsets.push_string);
            f(state.0, c_value.as_ptr())
        }
    }

    fn push_nil(&self, state: LuaState) {
        unsafe {
            let f: PushNilFn = self.offsets.as_fn(self.offsets.push_nil);
            f(state.0)
        }
    }

    fn lua_type_of(&self, state: LuaState, index: i32) -> LuaType {
        let raw = unsafe {
            let f: LuaTypeFn = self.offsets.as_fn(self.offsets.lua_type);
            f(state.0, index)
        };
        LuaType::from_raw(raw)
    }

    fn to_number(&self, state: LuaState, index: i32) -> f64 {
        unsafe {
            let f: ToNumberFn = self.offsets.as_fn(self.offsets.to_number);
            f(state.0, index)
        }
    }

    fn to_integer(&self, state: LuaState, index: i32) -> i64 {
        unsafe {
            let f: ToIntegerFn = self.offsets.as_fn(self.offsets.to_integer);
            f(state.0, index)
        }
    }

    fn to_boolean(&self, state: LuaState, index: i32) -> bool {
        let raw = unsafe {
            let f: ToBooleanFn = self.offsets.as_fn(self.offsets.to_boolean);
            f(state.0, index)
        };
        raw != 0
    }

    fn to_lstring(&self, state: LuaState, index: i32) -> Option<String> {
        let mut len: usize = 0;
        let ptr = unsafe {
            let f: ToLStringFn = self.offsets.as_fn(self.offsets.to_lstring);
            f(state.0, index, &mut len as *mut usize)
        };
        if ptr.is_null() {
            return None;
        }
        let bytes = unsafe { std::slice::from_raw_parts(ptr as *const u8, len) };
        Some(String::from_utf8_lossy(bytes).into_owned())
    }

    fn load_buffer(&self, state: LuaState, code: &[u8], chunk_name: &str) -> i32 {
        let c_name = Self::cstring_lossy(chunk_name);
        unsafe {
            let f: LoadBufferFn = self.offsets.as_fn(self.offsets.load_buffer);
            f(state.0, code.as_ptr() as *const c_char, code.len(), c_name.as_ptr())
        }
    }

    fn pcall(&self, state: LuaState, nargs: i32, nresults: i32) -> i32 {
        unsafe {
            let f: PcallFn = self.offsets.as_fn(self.offsets.pcall);
            // errfunc = 0: no message handler, matching the host's own
            // in-engine console error reporting path.
            f(state.0, nargs, nresults, 0)
        }
    }

    fn script_execute(&self, code: &[u8], source_name: &str) {
        let c_code = match CString::new(code) {
            Ok(c) => c,
            Err(_) => return,
        };
        let c_name = Self::cstring_lossy(source_name);
        unsafe {
            let f: ScriptExecuteFn = self.offsets.as_fn(self.offsets.script_execute);
            f(c_code.as_ptr(), c_name.as_ptr())
        }
    }

    fn call_native_spell_info(&self, state: LuaState) -> i32 {
        unsafe {
            let f: NativeSpellInfoFn = self.offsets.as_fn(self.offsets.native_spell_info);
            f(state.0)
        }
    }
}
