use std::mem::size_of;

use windows::Win32::Devices::Display::{
    DISPLAYCONFIG_DEVICE_INFO_GET_TARGET_NAME, DISPLAYCONFIG_DEVICE_INFO_HEADER,
    DISPLAYCONFIG_MODE_INFO, DISPLAYCONFIG_PATH_INFO, DISPLAYCONFIG_TARGET_DEVICE_NAME,
    DisplayConfigGetDeviceInfo, GetDisplayConfigBufferSizes, QDC_ONLY_ACTIVE_PATHS,
    QDC_VIRTUAL_MODE_AWARE, QUERY_DISPLAY_CONFIG_FLAGS, QueryDisplayConfig,
};
use windows::Win32::Foundation::{ERROR_INSUFFICIENT_BUFFER, ERROR_SUCCESS, LPARAM, RECT};
use windows::Win32::Graphics::Gdi::{
    EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFOEXW, MONITORINFOF_PRIMARY,
};
use windows::Win32::System::Registry::{HKEY_LOCAL_MACHINE, RRF_RT_REG_BINARY, RegGetValueW};
use windows::core::{BOOL, PCWSTR, w};

use super::{to_wide, wide_to_string};
use crate::edid;
use crate::error::{Error, Result};
use crate::monitor::{DisplayPath, DisplaySource, MonitorGeometry};

// QueryDisplayConfig can race with topology changes; retry a few times.
const MAX_QUERY_ATTEMPTS: usize = 8;

// Friendly name when the driver did not take it from the EDID.
const UNKNOWN_FRIENDLY_NAME: &str = "Unknown";

/// Reads monitors, display-config paths and EDID blobs from Win32.
#[derive(Clone, Copy, Debug, Default)]
pub struct Win32DisplaySource;

impl DisplaySource for Win32DisplaySource {
    fn monitors(&self) -> Result<Vec<MonitorGeometry>> {
        let mut monitors: Vec<MonitorGeometry> = Vec::new();
        unsafe {
            let _ = EnumDisplayMonitors(
                None,
                None,
                Some(enum_monitor_callback),
                LPARAM(&mut monitors as *mut _ as isize),
            );
        }
        Ok(monitors)
    }

    fn display_paths(&self) -> Result<Vec<DisplayPath>> {
        query_active_paths()?
            .iter()
            .map(target_name)
            .collect()
    }

    fn read_edid(&self, device_path: &str) -> Option<Vec<u8>> {
        let key = to_wide(&edid::device_parameters_key(device_path)?);
        let mut size = 0u32;
        unsafe {
            let status = RegGetValueW(
                HKEY_LOCAL_MACHINE,
                PCWSTR(key.as_ptr()),
                w!("EDID"),
                RRF_RT_REG_BINARY,
                None,
                None,
                Some(&mut size),
            );
            if status != ERROR_SUCCESS || size == 0 {
                tracing::debug!(device_path, status = status.0, "no EDID in registry");
                return None;
            }

            let mut data = vec![0u8; size as usize];
            let status = RegGetValueW(
                HKEY_LOCAL_MACHINE,
                PCWSTR(key.as_ptr()),
                w!("EDID"),
                RRF_RT_REG_BINARY,
                None,
                Some(data.as_mut_ptr().cast()),
                Some(&mut size),
            );
            if status != ERROR_SUCCESS {
                return None;
            }
            data.truncate(size as usize);
            Some(data)
        }
    }
}

unsafe extern "system" fn enum_monitor_callback(
    hmon: HMONITOR,
    _: HDC,
    _: *mut RECT,
    lparam: LPARAM,
) -> BOOL {
    unsafe {
        let monitors = &mut *(lparam.0 as *mut Vec<MonitorGeometry>);
        let mut info = MONITORINFOEXW::default();
        info.monitorInfo.cbSize = size_of::<MONITORINFOEXW>() as u32;
        if GetMonitorInfoW(hmon, &mut info.monitorInfo).as_bool() {
            monitors.push(MonitorGeometry {
                monitor_rect: info.monitorInfo.rcMonitor.into(),
                work_rect: info.monitorInfo.rcWork.into(),
                is_primary: info.monitorInfo.dwFlags & MONITORINFOF_PRIMARY != 0,
                device_name: wide_to_string(&info.szDevice),
            });
        }
        BOOL(1)
    }
}

fn query_active_paths() -> Result<Vec<DISPLAYCONFIG_PATH_INFO>> {
    let flags = QUERY_DISPLAY_CONFIG_FLAGS(QDC_ONLY_ACTIVE_PATHS.0 | QDC_VIRTUAL_MODE_AWARE.0);

    for _ in 0..MAX_QUERY_ATTEMPTS {
        let mut path_count = 0u32;
        let mut mode_count = 0u32;
        let status = unsafe { GetDisplayConfigBufferSizes(flags, &mut path_count, &mut mode_count) };
        if status != ERROR_SUCCESS {
            return Err(Error::DisplayConfig {
                call: "GetDisplayConfigBufferSizes",
                status: status.0,
            });
        }

        let mut paths = vec![DISPLAYCONFIG_PATH_INFO::default(); path_count as usize];
        let mut modes = vec![DISPLAYCONFIG_MODE_INFO::default(); mode_count as usize];
        let status = unsafe {
            QueryDisplayConfig(
                flags,
                &mut path_count,
                paths.as_mut_ptr(),
                &mut mode_count,
                modes.as_mut_ptr(),
                None,
            )
        };
        if status == ERROR_SUCCESS {
            paths.truncate(path_count as usize);
            return Ok(paths);
        }
        if status != ERROR_INSUFFICIENT_BUFFER {
            return Err(Error::DisplayConfig {
                call: "QueryDisplayConfig",
                status: status.0,
            });
        }
        tracing::debug!("display topology changed during query, retrying");
    }

    Err(Error::DisplayConfig {
        call: "QueryDisplayConfig",
        status: ERROR_INSUFFICIENT_BUFFER.0,
    })
}

fn target_name(path: &DISPLAYCONFIG_PATH_INFO) -> Result<DisplayPath> {
    let mut target = DISPLAYCONFIG_TARGET_DEVICE_NAME {
        header: DISPLAYCONFIG_DEVICE_INFO_HEADER {
            r#type: DISPLAYCONFIG_DEVICE_INFO_GET_TARGET_NAME,
            size: size_of::<DISPLAYCONFIG_TARGET_DEVICE_NAME>() as u32,
            adapterId: path.targetInfo.adapterId,
            id: path.targetInfo.id,
        },
        ..Default::default()
    };

    let status = unsafe { DisplayConfigGetDeviceInfo(&mut target.header) };
    if status != ERROR_SUCCESS.0 as i32 {
        return Err(Error::DisplayConfig {
            call: "DisplayConfigGetDeviceInfo",
            status: status as u32,
        });
    }

    // Bit 0 of the flags union is `friendlyNameFromEdid`.
    let from_edid = unsafe { target.flags.Anonymous.value } & 1 != 0;
    let friendly_name = if from_edid {
        wide_to_string(&target.monitorFriendlyDeviceName)
    } else {
        UNKNOWN_FRIENDLY_NAME.to_string()
    };

    Ok(DisplayPath {
        id: path.targetInfo.id,
        friendly_name,
        device_path: wide_to_string(&target.monitorDevicePath),
    })
}
