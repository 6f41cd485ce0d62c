//! Hierarchical key/value store contract (spec §6: "Hierarchical key/value
//! store with the byte-for-byte semantics of the Windows registry including
//! the 32-bit redirection view and the `StartupApproved` binary blob").

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hive {
    CurrentUser,
    LocalMachine,
}

impl Hive {
    pub fn label(self) -> &'static str {
        match self {
            Hive::CurrentUser => "HKCU",
            Hive::LocalMachine => "HKLM",
        }
    }
}

/// Native view vs. the WOW64 32-bit-redirected view (spec §4.1: "both
/// native and 32-bit-redirected views").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryView {
    Native,
    Wow64_32,
}

/// Registry access abstraction. The real implementation
/// ([`crate::platform::windows::registry_impl::WindowsRegistry`]) wraps
/// `winreg`; `test-support` provides an in-memory fake with identical
/// semantics so collector/control logic can be unit tested off-Windows.
pub trait RegistryAdapter: Send + Sync {
    fn read_dword(&self, hive: Hive, view: RegistryView, sub_key: &str, value: &str) -> Option<u32>;
    fn read_string(&self, hive: Hive, view: RegistryView, sub_key: &str, value: &str) -> Option<String>;
    fn read_binary(&self, hive: Hive, view: RegistryView, sub_key: &str, value: &str) -> Option<Vec<u8>>;

    fn write_dword(&self, hive: Hive, view: RegistryView, sub_key: &str, value: &str, data: u32) -> Result<()>;
    fn write_string(&self, hive: Hive, view: RegistryView, sub_key: &str, value: &str, data: &str) -> Result<()>;
    fn write_binary(&self, hive: Hive, view: RegistryView, sub_key: &str, value: &str, data: &[u8]) -> Result<()>;

    fn delete_value(&self, hive: Hive, view: RegistryView, sub_key: &str, value: &str) -> Result<()>;

    fn enumerate_value_names(&self, hive: Hive, view: RegistryView, sub_key: &str) -> Vec<String>;
    fn enumerate_subkey_names(&self, hive: Hive, view: RegistryView, sub_key: &str) -> Vec<String>;
    fn subkey_exists(&self, hive: Hive, view: RegistryView, sub_key: &str) -> bool;
}
