//! Authenticode verification via `WinVerifyTrust`, publisher name via the
//! signer certificate chain (`CryptQueryObject` + `CertGetNameStringW`).
//! Best-effort: a missing or unreadable signature yields
//! [`SignatureStatus::Unsigned`], never an error — classification (spec
//! §4.2) treats "unsigned" as just another signal, not a failure.

use crate::domain::SignatureStatus;
use crate::platform::signature::{SignatureInfo, SignatureVerifier};
use windows::core::{GUID, PCWSTR};
use windows::Win32::Security::Cryptography::{
    CertCloseStore, CertFreeCertificateContext, CertGetNameStringW, CryptMsgClose,
    CryptQueryObject, CERT_NAME_SIMPLE_DISPLAY_TYPE, CERT_QUERY_CONTENT_FLAG_ALL,
    CERT_QUERY_FORMAT_FLAG_BINARY, CERT_QUERY_OBJECT_FILE, HCERTSTORE, HCRYPTMSG,
};
use windows::Win32::Security::WinTrust::{
    WinVerifyTrust, WINTRUST_ACTION_GENERIC_VERIFY_V2, WINTRUST_DATA, WINTRUST_FILE_INFO,
    WTD_CHOICE_FILE, WTD_REVOKE_NONE, WTD_STATEACTION_CLOSE, WTD_STATEACTION_VERIFY,
    WTD_UI_NONE,
};
use windows::Win32::UI::WindowsAndMessaging::HWND;

pub struct WindowsSignatureVerifier;

impl SignatureVerifier for WindowsSignatureVerifier {
    fn verify(&self, executable_path: &str) -> SignatureInfo {
        let status = unsafe { verify_trust(executable_path) };
        let publisher = unsafe { read_publisher(executable_path) };
        SignatureInfo { publisher, status }
    }
}

unsafe fn verify_trust(path: &str) -> SignatureStatus {
    let wide: Vec<u16> = path.encode_utf16().chain(Some(0)).collect();
    let mut file_info = WINTRUST_FILE_INFO {
        cbStruct: std::mem::size_of::<WINTRUST_FILE_INFO>() as u32,
        pcwszFilePath: PCWSTR(wide.as_ptr()),
        hFile: Default::default(),
        pgKnownSubject: std::ptr::null(),
    };
    let mut data = WINTRUST_DATA {
        cbStruct: std::mem::size_of::<WINTRUST_DATA>() as u32,
        dwUIChoice: WTD_UI_NONE,
        fdwRevocationChecks: WTD_REVOKE_NONE,
        dwUnionChoice: WTD_CHOICE_FILE,
        dwStateAction: WTD_STATEACTION_VERIFY,
        ..Default::default()
    };
    data.Anonymous.pFile = &mut file_info;

    let mut guid: GUID = WINTRUST_ACTION_GENERIC_VERIFY_V2;
    let result = WinVerifyTrust(HWND::default(), &mut guid, &mut data as *mut _ as *mut _);

    data.dwStateAction = WTD_STATEACTION_CLOSE;
    let _ = WinVerifyTrust(HWND::default(), &mut guid, &mut data as *mut _ as *mut _);

    match result {
        0 => SignatureStatus::SignedTrusted,
        _ if has_embedded_signature(path) => SignatureStatus::Signed,
        _ => SignatureStatus::Unsigned,
    }
}

/// `WinVerifyTrust` failing doesn't distinguish "no signature" from
/// "signature present but untrusted"; re-query via `CryptQueryObject` to
/// tell the two apart so an unsigned file doesn't get reported as merely
/// distrustful.
unsafe fn has_embedded_signature(path: &str) -> bool {
    read_publisher(path).is_some()
}

unsafe fn read_publisher(path: &str) -> Option<String> {
    let wide: Vec<u16> = path.encode_utf16().chain(Some(0)).collect();
    let mut store: HCERTSTORE = Default::default();
    let mut msg: HCRYPTMSG = Default::default();
    let mut cert_ctx = std::ptr::null_mut();

    CryptQueryObject(
        CERT_QUERY_OBJECT_FILE,
        &PCWSTR(wide.as_ptr()) as *const _ as *const _,
        CERT_QUERY_CONTENT_FLAG_ALL,
        CERT_QUERY_FORMAT_FLAG_BINARY,
        0,
        None,
        None,
        None,
        Some(&mut store),
        Some(&mut msg),
        Some(&mut cert_ctx as *mut _ as *mut _),
    )
    .ok()?;

    let mut name_buf = [0u16; 256];
    let len = CertGetNameStringW(
        cert_ctx as *const _,
        CERT_NAME_SIMPLE_DISPLAY_TYPE,
        0,
        None,
        Some(&mut name_buf),
    );

    if !msg.is_invalid() {
        let _ = CryptMsgClose(msg);
    }
    if !store.is_invalid() {
        let _ = CertCloseStore(store, 0);
    }
    if !cert_ctx.is_null() {
        let _ = CertFreeCertificateContext(Some(cert_ctx as *const _));
    }

    if len <= 1 {
        return None;
    }
    let end = name_buf.iter().position(|&c| c == 0).unwrap_or(name_buf.len());
    Some(String::from_utf16_lossy(&name_buf[..end]))
}
