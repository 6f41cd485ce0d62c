//! `.lnk` resolution via `IShellLinkW`/`IPersistFile`. Spec §9 flags the COM
//! apartment as a design note: every call initializes its own STA apartment
//! on the calling thread rather than assuming one was set up by the caller,
//! since collectors may run on a worker thread pool.

use crate::error::{EngineError, Result};
use crate::platform::shortcut::{ResolvedShortcut, ShortcutResolver};
use std::path::Path;
use windows::core::{Interface, PCWSTR};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoUninitialize, CLSCTX_INPROC_SERVER, COINIT_APARTMENTTHREADED,
    STGM_READ,
};
use windows::Win32::System::Com::IPersistFile;
use windows::Win32::UI::Shell::{IShellLinkW, ShellLink, SLGP_UNCPRIORITY};

struct ComGuard {
    owns: bool,
}

impl ComGuard {
    fn enter() -> Self {
        let hr = unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) };
        ComGuard { owns: hr.is_ok() }
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        if self.owns {
            unsafe { CoUninitialize() };
        }
    }
}

pub struct WindowsShortcutResolver;

impl ShortcutResolver for WindowsShortcutResolver {
    fn resolve(&self, lnk_path: &Path) -> Result<ResolvedShortcut> {
        let _com = ComGuard::enter();
        unsafe { resolve_inner(lnk_path) }
    }
}

unsafe fn resolve_inner(lnk_path: &Path) -> Result<ResolvedShortcut> {
    let link: IShellLinkW = CoCreateInstance(&ShellLink, None, CLSCTX_INPROC_SERVER)
        .map_err(|e| EngineError::Platform(format!("CoCreateInstance(ShellLink): {e}")))?;
    let persist: IPersistFile = link
        .cast()
        .map_err(|e| EngineError::Platform(format!("IPersistFile cast: {e}")))?;

    let path_wide: Vec<u16> = lnk_path.as_os_str().to_string_lossy().encode_utf16().chain(Some(0)).collect();
    persist
        .Load(PCWSTR(path_wide.as_ptr()), STGM_READ.0 as u32)
        .map_err(|e| EngineError::Platform(format!("IPersistFile::Load {}: {e}", lnk_path.display())))?;

    let mut target_buf = [0u16; 1024];
    link.GetPath(&mut target_buf, std::ptr::null_mut(), SLGP_UNCPRIORITY.0 as u32)
        .map_err(|e| EngineError::Platform(format!("IShellLinkW::GetPath: {e}")))?;
    let target_path = pwstr_buf_to_string(&target_buf);

    let mut args_buf = [0u16; 1024];
    link.GetArguments(&mut args_buf)
        .map_err(|e| EngineError::Platform(format!("IShellLinkW::GetArguments: {e}")))?;
    let raw_args = pwstr_buf_to_string(&args_buf);

    Ok(ResolvedShortcut {
        target_path,
        arguments: if raw_args.is_empty() { None } else { Some(raw_args) },
    })
}

fn pwstr_buf_to_string(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}
