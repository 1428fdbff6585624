#![cfg(windows)]

use std::ffi::CString;
use std::ptr;

use winapi::shared::minwindef::DWORD;
use winapi::shared::winerror::ERROR_BROKEN_PIPE;
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::fileapi::{ReadFile, WriteFile};
use winapi::um::handleapi::{CloseHandle, INVALID_HANDLE_VALUE};
use winapi::um::namedpipeapi::{ConnectNamedPipe, DisconnectNamedPipe};
use winapi::um::winbase::{
    CreateNamedPipeA, PIPE_ACCESS_DUPLEX, PIPE_READMODE_MESSAGE, PIPE_TYPE_MESSAGE,
    PIPE_UNLIMITED_INSTANCES, PIPE_WAIT,
};
use winapi::um::winnt::HANDLE;

use crate::error::IpcError;
use crate::transport::{PipeConnection, PipeListener, ReadOutcome};

const BUFFER_SIZE: DWORD = 4096;

/// A single named-pipe instance, re-created after every client disconnect so
/// the server can accept a fresh connection (P10).
pub struct RealPipeListener {
    name: CString,
}

unsafe impl Send for RealPipeListener {}

impl RealPipeListener {
    pub fn new(pipe_name: &str) -> Result<Self, IpcError> {
        let name = CString::new(pipe_name)
            .map_err(|e| IpcError::CreateFailed(format!("pipe name contains NUL: {e}")))?;
        Ok(Self { name })
    }
}

impl PipeListener for RealPipeListener {
    type Connection = RealPipeConnection;

    fn accept(&mut self) -> Result<Self::Connection, IpcError> {
        let handle = unsafe {
            CreateNamedPipeA(
                self.name.as_ptr(),
                PIPE_ACCESS_DUPLEX,
                PIPE_TYPE_MESSAGE | PIPE_READMODE_MESSAGE | PIPE_WAIT,
                PIPE_UNLIMITED_INSTANCES,
                BUFFER_SIZE,
                BUFFER_SIZE,
                0,
                ptr::null_mut(),
            )
        };
        if handle == INVALID_HANDLE_VALUE {
            return Err(IpcError::CreateFailed(format!(
                "CreateNamedPipeA failed: {}",
                unsafe { GetLastError() }
            )));
        }

        // Blocks until a client connects, or until the shutdown self-connect
        // dummy write unblocks it.
        let connected = unsafe { ConnectNamedPipe(handle, ptr::null_mut()) };
        if connected == 0 {
            let err = unsafe { GetLastError() };
            // ERROR_PIPE_CONNECTED (535) means a client raced in between
            // creation and the connect call; that's a success, not a failure.
            const ERROR_PIPE_CONNECTED: DWORD = 535;
            if err != ERROR_PIPE_CONNECTED {
                unsafe { CloseHandle(handle) };
                return Err(IpcError::ConnectFailed(format!(
                    "ConnectNamedPipe failed: {err}"
                )));
            }
        }

        Ok(RealPipeConnection { handle })
    }
}

pub struct RealPipeConnection {
    handle: HANDLE,
}

unsafe impl Send for RealPipeConnection {}

impl PipeConnection for RealPipeConnection {
    fn read_message(&mut self) -> Result<ReadOutcome, IpcError> {
        let mut buf = vec![0u8; BUFFER_SIZE as usize];
        let mut read: DWORD = 0;
        let ok = unsafe {
            ReadFile(
                self.handle,
                buf.as_mut_ptr() as *mut _,
                buf.len() as DWORD,
                &mut read,
                ptr::null_mut(),
            )
        };
        if ok == 0 {
            let err = unsafe { GetLastError() };
            if err == ERROR_BROKEN_PIPE {
                return Ok(ReadOutcome::Disconnected);
            }
            return Err(IpcError::ReadFailed(format!("ReadFile failed: {err}")));
        }
        if read == 0 {
            return Ok(ReadOutcome::Disconnected);
        }
        buf.truncate(read as usize);
        Ok(ReadOutcome::Message(buf))
    }

    fn write_message(&mut self, body: &[u8]) -> Result<(), IpcError> {
        let mut framed = body.to_vec();
        framed.push(0);

        let mut written: DWORD = 0;
        let ok = unsafe {
            WriteFile(
                self.handle,
                framed.as_ptr() as *const _,
                framed.len() as DWORD,
                &mut written,
                ptr::null_mut(),
            )
        };
        if ok == 0 {
            let err = unsafe { GetLastError() };
            return Err(IpcError::WriteFailed(format!("WriteFile failed: {err}")));
        }
        Ok(())
    }
}

impl Drop for RealPipeConnection {
    fn drop(&mut self) {
        unsafe {
            DisconnectNamedPipe(self.handle);
            CloseHandle(self.handle);
        }
    }
}
