//! Elevation check. The teacher's `repositories/elevation.rs` only relaunches
//! as admin (`run_as_admin`); `is_elevated` — what the Control Service and
//! Scanner actually need (spec §4.3: "check elevation before any HKLM or
//! Services mutation") — is grounded on the same token-query pattern used by
//! `repositories/windows_service.rs` for other Advapi32 calls.

use crate::platform::elevation::ElevationCheck;
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::Security::{GetTokenInformation, TokenElevation, TOKEN_ELEVATION, TOKEN_QUERY};
use windows::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};

pub struct WindowsElevationCheck;

impl ElevationCheck for WindowsElevationCheck {
    fn is_elevated(&self) -> bool {
        unsafe { query_elevation().unwrap_or(false) }
    }
}

unsafe fn query_elevation() -> Option<bool> {
    let mut token = HANDLE::default();
    OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token).ok()?;

    let mut elevation = TOKEN_ELEVATION::default();
    let mut returned = 0u32;
    let result = GetTokenInformation(
        token,
        TokenElevation,
        Some(&mut elevation as *mut _ as *mut _),
        std::mem::size_of::<TOKEN_ELEVATION>() as u32,
        &mut returned,
    );
    let _ = CloseHandle(token);
    result.ok()?;
    Some(elevation.TokenIsElevated != 0)
}
