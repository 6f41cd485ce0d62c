//! Single source of truth for the publisher/path/driver/security word lists
//! that the classifier and several extended collectors need (spec §9
//! "Heuristic drift": "Keep the publisher/path/driver/security word-lists
//! in §4.2 in one place; they appear in multiple collectors' skip-lists").

/// Known driver vendors whose machine-scope services are treated as
/// system-critical (spec §4.2 critical rules).
pub const KNOWN_DRIVER_VENDORS: &[&str] =
    &["intel", "amd", "nvidia", "realtek", "qualcomm", "mediatek"];

/// Path/name fragments that mark a security product (spec §4.2 critical
/// rules: "path contains a security marker").
pub const SECURITY_MARKERS: &[&str] = &["defender", "security", "antimal", "msmpeng", "sense"];

/// Program Files subdirectories treated as system-critical regardless of
/// publisher (spec §4.2).
pub const CRITICAL_PROGRAM_DIRS: &[&str] = &[
    r"\program files\windows defender",
    r"\program files\windows security",
    r"\program files\common files\microsoft shared",
];

/// LSA package names to skip — ordinary Windows security packages, not
/// third-party additions (spec §4.1 extended collectors).
pub const KNOWN_LSA_PACKAGES: &[&str] = &[
    "msv1_0", "kerberos", "schannel", "wdigest", "tspkg", "pku2u", "cloudap", "negoexts", "rassfm",
];

/// Print monitors shipped with Windows (spec §4.1 extended collectors).
pub const KNOWN_PRINT_MONITORS: &[&str] = &[
    "local port",
    "standard tcp/ip port",
    "winprint",
    "microsoft shared fax monitor",
    "usbmon",
    "wsd port",
];

/// Svchost group names shipped with Windows (spec §4.1 extended collectors).
pub const KNOWN_SVCHOST_GROUPS: &[&str] = &[
    "netsvcs", "localservice", "networkservice", "localsystemnetworkrestricted", "lockdown",
];

/// KnownDLLs shipped with Windows (spec §4.1 extended collectors).
pub const KNOWN_SAFE_DLLS: &[&str] = &[
    "kernel32.dll",
    "ntdll.dll",
    "user32.dll",
    "gdi32.dll",
    "advapi32.dll",
    "ole32.dll",
    "shell32.dll",
    "comctl32.dll",
    "combase.dll",
    "rpcrt4.dll",
    "msvcrt.dll",
];

pub fn is_known_driver_vendor(publisher: &str) -> bool {
    let lower = publisher.to_lowercase();
    KNOWN_DRIVER_VENDORS.iter().any(|v| lower.contains(v))
}

pub fn has_security_marker(path: &str) -> bool {
    let lower = path.to_lowercase();
    SECURITY_MARKERS.iter().any(|m| lower.contains(m))
}

pub fn is_under_critical_program_dir(path: &str) -> bool {
    let lower = path.to_lowercase();
    CRITICAL_PROGRAM_DIRS.iter().any(|d| lower.contains(d))
}

pub fn is_microsoft_publisher(publisher: &str) -> bool {
    publisher.to_lowercase().contains("microsoft")
}

pub fn is_known_lsa_package(name: &str) -> bool {
    let lower = name.to_lowercase();
    KNOWN_LSA_PACKAGES.iter().any(|p| *p == lower)
}

pub fn is_known_print_monitor(name: &str) -> bool {
    let lower = name.to_lowercase();
    KNOWN_PRINT_MONITORS.iter().any(|p| *p == lower)
}

pub fn is_known_svchost_group(name: &str) -> bool {
    let lower = name.to_lowercase();
    KNOWN_SVCHOST_GROUPS.iter().any(|g| *g == lower)
}

pub fn is_known_safe_dll(name: &str) -> bool {
    let lower = name.to_lowercase();
    KNOWN_SAFE_DLLS.iter().any(|d| *d == lower)
}
