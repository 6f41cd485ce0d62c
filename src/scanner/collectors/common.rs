//! Shared parsing helpers used by more than one collector (spec §9
//! "Heuristic drift" — the quoted-path rule and approval-byte semantics
//! live here once rather than being reimplemented per collector).

/// `(exe, args)` from a raw command string: a leading `"` means the path
/// runs to the next `"` with the remainder as arguments; otherwise split on
/// the first space (spec §4.1 "quoted-path rule").
pub fn parse_command_line(raw: &str) -> (String, Option<String>) {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix('"') {
        if let Some(end) = rest.find('"') {
            let exe = rest[..end].to_string();
            let args = rest[end + 1..].trim();
            return (exe, if args.is_empty() { None } else { Some(args.to_string()) });
        }
    }
    match trimmed.split_once(' ') {
        Some((exe, args)) => {
            let args = args.trim();
            (exe.to_string(), if args.is_empty() { None } else { Some(args.to_string()) })
        }
        None => (trimmed.to_string(), None),
    }
}

/// `StartupApproved` 12-byte blob → enabled. Byte 0 is `2` ⇒ enabled, `3` ⇒
/// disabled, anything else is unknown and treated as enabled (spec §4.1).
pub fn approved_blob_is_enabled(blob: Option<&[u8]>) -> bool {
    match blob.and_then(|b| b.first()) {
        Some(3) => false,
        _ => true,
    }
}

/// Decode a `REG_MULTI_SZ` raw value (UTF-16LE, null-terminated strings,
/// double-null terminated list) into its component strings. Read through
/// [`crate::platform::registry::RegistryAdapter::read_binary`] since the
/// adapter contract has no dedicated multi-string read.
pub fn parse_multi_sz(bytes: &[u8]) -> Vec<String> {
    let units: Vec<u16> = bytes.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect();
    units
        .split(|&u| u == 0)
        .map(String::from_utf16_lossy)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_path_splits_at_closing_quote() {
        let (exe, args) = parse_command_line(r#""C:\Program Files\App\app.exe" --flag value"#);
        assert_eq!(exe, r"C:\Program Files\App\app.exe");
        assert_eq!(args.as_deref(), Some("--flag value"));
    }

    #[test]
    fn unquoted_path_splits_on_first_space() {
        let (exe, args) = parse_command_line(r"C:\App\app.exe --flag");
        assert_eq!(exe, r"C:\App\app.exe");
        assert_eq!(args.as_deref(), Some("--flag"));
    }

    #[test]
    fn approved_byte_3_disables() {
        assert!(!approved_blob_is_enabled(Some(&[3, 0, 0])));
    }

    #[test]
    fn missing_blob_defaults_enabled() {
        assert!(approved_blob_is_enabled(None));
    }

    #[test]
    fn unknown_byte_defaults_enabled() {
        assert!(approved_blob_is_enabled(Some(&[9, 0, 0])));
    }

    #[test]
    fn multi_sz_splits_on_null_units() {
        let mut bytes = Vec::new();
        for unit in "autocheck autochk *".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes.extend_from_slice(&0u16.to_le_bytes());
        for unit in "memtest.exe".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes());

        assert_eq!(parse_multi_sz(&bytes), vec!["autocheck autochk *", "memtest.exe"]);
    }
}
