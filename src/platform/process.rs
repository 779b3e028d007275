use std::mem::size_of;

use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW, TH32CS_SNAPPROCESS,
};
use windows::Win32::System::Threading::{OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION};

use super::wide_to_string;

/// Closes the wrapped handle when dropped.
struct HandleGuard(HANDLE);

impl Drop for HandleGuard {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

/// Number of running processes whose executable name matches
/// `exe_name` (case-insensitive) and that we are allowed to open.
pub fn count_processes(exe_name: &str) -> usize {
    let snapshot = match unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) } {
        Ok(handle) => HandleGuard(handle),
        Err(e) => {
            tracing::warn!("could not snapshot processes: {e}");
            return 0;
        }
    };

    let mut entry = PROCESSENTRY32W {
        dwSize: size_of::<PROCESSENTRY32W>() as u32,
        ..Default::default()
    };

    let mut count = 0;
    unsafe {
        if Process32FirstW(snapshot.0, &mut entry).is_err() {
            return 0;
        }
        loop {
            if wide_to_string(&entry.szExeFile).eq_ignore_ascii_case(exe_name)
                && let Ok(handle) =
                    OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, entry.th32ProcessID)
            {
                drop(HandleGuard(handle));
                count += 1;
            }
            if Process32NextW(snapshot.0, &mut entry).is_err() {
                break;
            }
        }
    }

    tracing::debug!(exe_name, count, "process probe");
    count
}
