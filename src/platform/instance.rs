use windows::Win32::Foundation::{CloseHandle, ERROR_ALREADY_EXISTS, GetLastError, HANDLE};
use windows::Win32::System::Threading::CreateMutexW;
use windows::core::PCWSTR;

use super::to_wide;
use crate::error::Result;

/// Named mutex held for the lifetime of the process.
pub struct SingleInstance(HANDLE);

impl SingleInstance {
    /// `None` when another process already holds `name`.
    pub fn acquire(name: &str) -> Result<Option<Self>> {
        let wide = to_wide(name);
        let handle = unsafe { CreateMutexW(None, true, PCWSTR(wide.as_ptr()))? };
        if unsafe { GetLastError() } == ERROR_ALREADY_EXISTS {
            unsafe {
                let _ = CloseHandle(handle);
            }
            return Ok(None);
        }
        Ok(Some(Self(handle)))
    }
}

impl Drop for SingleInstance {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}
