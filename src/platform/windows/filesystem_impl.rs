//! Filesystem + well-known-folder contract, generalized from
//! `repositories/file_system.rs`'s single `scan_folder` helper to the full
//! contract the collectors need.

use crate::error::{EngineError, Result};
use crate::platform::filesystem::{DirEntryInfo, FileMetadata, FileSystemAdapter, KnownFolder};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use windows::core::{GUID, PCWSTR, PWSTR};
use windows::Win32::Foundation::{CloseHandle, HANDLE, HLOCAL};
use windows::Win32::Security::Authorization::ConvertSidToStringSidW;
use windows::Win32::Security::{GetTokenInformation, TokenUser, TOKEN_QUERY, TOKEN_USER};
use windows::Win32::Storage::FileSystem::{
    GetFileVersionInfoSizeW, GetFileVersionInfoW, VerQueryValueW,
};
use windows::Win32::System::Memory::LocalFree;
use windows::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};
use windows::Win32::UI::Shell::{
    FOLDERID_CommonStartup, FOLDERID_ProgramData, FOLDERID_Profile, FOLDERID_RoamingAppData,
    FOLDERID_Startup, SHGetKnownFolderPath, KF_FLAG_DEFAULT,
};

pub struct WindowsFileSystem;

fn known_folder_path(id: GUID) -> Result<PathBuf> {
    unsafe {
        let raw = SHGetKnownFolderPath(&id, KF_FLAG_DEFAULT, None)
            .map_err(|e| EngineError::Platform(format!("SHGetKnownFolderPath: {e}")))?;
        let path = raw.to_string().map_err(|e| EngineError::Platform(e.to_string()))?;
        LocalFree(Some(HLOCAL(raw.0 as *mut _)));
        Ok(PathBuf::from(path))
    }
}

impl FileSystemAdapter for WindowsFileSystem {
    fn known_folder(&self, folder: KnownFolder) -> Result<PathBuf> {
        match folder {
            KnownFolder::UserStartup => known_folder_path(FOLDERID_Startup),
            KnownFolder::CommonStartup => known_folder_path(FOLDERID_CommonStartup),
            KnownFolder::UserProfile => known_folder_path(FOLDERID_Profile),
            KnownFolder::AppData => known_folder_path(FOLDERID_RoamingAppData),
            KnownFolder::CommonAppData => known_folder_path(FOLDERID_ProgramData),
            KnownFolder::SystemRoot => std::env::var("SystemRoot")
                .map(PathBuf::from)
                .map_err(|_| EngineError::Platform("SystemRoot not set".into())),
            KnownFolder::System32 => std::env::var("SystemRoot")
                .map(|root| PathBuf::from(root).join("System32"))
                .map_err(|_| EngineError::Platform("SystemRoot not set".into())),
        }
    }

    fn current_user_sid(&self) -> Result<String> {
        unsafe {
            let mut token = HANDLE::default();
            OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token)
                .map_err(|e| EngineError::Platform(format!("OpenProcessToken: {e}")))?;

            let mut needed = 0u32;
            let _ = GetTokenInformation(token, TokenUser, None, 0, &mut needed);
            let mut buf = vec![0u8; needed as usize];
            let ok = GetTokenInformation(
                token,
                TokenUser,
                Some(buf.as_mut_ptr() as *mut _),
                needed,
                &mut needed,
            );
            let _ = CloseHandle(token);
            ok.map_err(|e| EngineError::Platform(format!("GetTokenInformation: {e}")))?;

            let user = &*(buf.as_ptr() as *const TOKEN_USER);
            let mut sid_str = PWSTR::null();
            ConvertSidToStringSidW(user.User.Sid, &mut sid_str)
                .map_err(|e| EngineError::Platform(format!("ConvertSidToStringSidW: {e}")))?;
            let s = sid_str.to_string().map_err(|e| EngineError::Platform(e.to_string()))?;
            LocalFree(Some(HLOCAL(sid_str.0 as *mut _)));
            Ok(s)
        }
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<DirEntryInfo>> {
        let entries = std::fs::read_dir(path).map_err(|e| EngineError::Io(e.to_string()))?;
        Ok(entries
            .filter_map(|e| e.ok())
            .map(|e| DirEntryInfo {
                file_name: e.file_name().to_string_lossy().into_owned(),
                full_path: e.path(),
            })
            .collect())
    }

    fn metadata(&self, path: &Path) -> Option<FileMetadata> {
        let meta = std::fs::metadata(path).ok()?;
        let modified_utc = meta.modified().ok().map(DateTime::<Utc>::from);
        Some(FileMetadata {
            size_bytes: Some(meta.len()),
            modified_utc,
            company_name: read_company_name(path),
        })
    }

    fn expand_env_vars(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut chars = raw.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            let mut name = String::new();
            let mut closed = false;
            for c2 in chars.by_ref() {
                if c2 == '%' {
                    closed = true;
                    break;
                }
                name.push(c2);
            }
            if closed {
                match std::env::var(&name) {
                    Ok(value) => out.push_str(&value),
                    Err(_) => {
                        out.push('%');
                        out.push_str(&name);
                        out.push('%');
                    }
                }
            } else {
                out.push('%');
                out.push_str(&name);
            }
        }
        out
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// `VERSIONINFO\StringFileInfo\*\CompanyName`, read via the classic
/// `version.dll` triad. Best-effort: most binaries carry this, some don't.
fn read_company_name(path: &Path) -> Option<String> {
    let wide: Vec<u16> = path.as_os_str().encode_wide_nul();
    unsafe {
        let pcwstr = PCWSTR(wide.as_ptr());
        let size = GetFileVersionInfoSizeW(pcwstr, None);
        if size == 0 {
            return None;
        }
        let mut buffer = vec![0u8; size as usize];
        GetFileVersionInfoW(pcwstr, 0, size, buffer.as_mut_ptr() as *mut _).ok()?;

        let mut translation_ptr: *mut std::ffi::c_void = std::ptr::null_mut();
        let mut translation_len = 0u32;
        let query_translation: Vec<u16> = "\\VarFileInfo\\Translation".encode_utf16().chain(Some(0)).collect();
        VerQueryValueW(
            buffer.as_ptr() as *const _,
            PCWSTR(query_translation.as_ptr()),
            &mut translation_ptr,
            &mut translation_len,
        )
        .as_bool()
        .then_some(())?;

        let langcp = std::slice::from_raw_parts(translation_ptr as *const u16, 2);
        let (lang, codepage) = (langcp[0], langcp[1]);
        let sub_block = format!("\\StringFileInfo\\{lang:04x}{codepage:04x}\\CompanyName");
        let sub_block_wide: Vec<u16> = sub_block.encode_utf16().chain(Some(0)).collect();

        let mut value_ptr: *mut std::ffi::c_void = std::ptr::null_mut();
        let mut value_len = 0u32;
        VerQueryValueW(
            buffer.as_ptr() as *const _,
            PCWSTR(sub_block_wide.as_ptr()),
            &mut value_ptr,
            &mut value_len,
        )
        .as_bool()
        .then_some(())?;
        if value_len == 0 {
            return None;
        }
        let slice = std::slice::from_raw_parts(value_ptr as *const u16, (value_len - 1) as usize);
        Some(String::from_utf16_lossy(slice))
    }
}

trait EncodeWideNul {
    fn encode_wide_nul(&self) -> Vec<u16>;
}

impl EncodeWideNul for std::ffi::OsStr {
    fn encode_wide_nul(&self) -> Vec<u16> {
        use std::os::windows::ffi::OsStrExt;
        self.encode_wide().chain(std::iter::once(0)).collect()
    }
}
