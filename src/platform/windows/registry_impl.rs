//! `winreg`-backed [`RegistryAdapter`]. Grounded on
//! `repositories/registry.rs`, generalized from a handful of free
//! functions to the full read/write/enumerate contract and to the
//! WOW64 32-bit-redirected view (spec §4.1).

use crate::error::{EngineError, Result};
use crate::platform::registry::{Hive, RegistryAdapter, RegistryView};
use winreg::enums::*;
use winreg::RegKey;

fn predef(hive: Hive) -> winreg::HKEY {
    match hive {
        Hive::CurrentUser => HKEY_CURRENT_USER,
        Hive::LocalMachine => HKEY_LOCAL_MACHINE,
    }
}

fn view_flag(view: RegistryView) -> u32 {
    match view {
        RegistryView::Native => KEY_WOW64_64KEY,
        RegistryView::Wow64_32 => KEY_WOW64_32KEY,
    }
}

fn open(hive: Hive, view: RegistryView, sub_key: &str, sam: u32) -> Option<RegKey> {
    RegKey::predef(predef(hive))
        .open_subkey_with_flags(sub_key, sam | view_flag(view))
        .ok()
}

fn open_or_create(hive: Hive, view: RegistryView, sub_key: &str, sam: u32) -> Result<RegKey> {
    let (key, _) = RegKey::predef(predef(hive))
        .create_subkey_with_flags(sub_key, sam | view_flag(view))
        .map_err(|e| EngineError::Platform(format!("create_subkey {sub_key}: {e}")))?;
    Ok(key)
}

pub struct WindowsRegistry;

impl RegistryAdapter for WindowsRegistry {
    fn read_dword(&self, hive: Hive, view: RegistryView, sub_key: &str, value: &str) -> Option<u32> {
        open(hive, view, sub_key, KEY_READ)?.get_value::<u32, _>(value).ok()
    }

    fn read_string(&self, hive: Hive, view: RegistryView, sub_key: &str, value: &str) -> Option<String> {
        open(hive, view, sub_key, KEY_READ)?.get_value::<String, _>(value).ok()
    }

    fn read_binary(&self, hive: Hive, view: RegistryView, sub_key: &str, value: &str) -> Option<Vec<u8>> {
        open(hive, view, sub_key, KEY_READ)?.get_raw_value(value).ok().map(|v| v.bytes)
    }

    fn write_dword(&self, hive: Hive, view: RegistryView, sub_key: &str, value: &str, data: u32) -> Result<()> {
        open_or_create(hive, view, sub_key, KEY_WRITE)?
            .set_value(value, &data)
            .map_err(|e| EngineError::Platform(format!("write_dword {sub_key}\\{value}: {e}")))
    }

    fn write_string(&self, hive: Hive, view: RegistryView, sub_key: &str, value: &str, data: &str) -> Result<()> {
        open_or_create(hive, view, sub_key, KEY_WRITE)?
            .set_value(value, &data)
            .map_err(|e| EngineError::Platform(format!("write_string {sub_key}\\{value}: {e}")))
    }

    fn write_binary(&self, hive: Hive, view: RegistryView, sub_key: &str, value: &str, data: &[u8]) -> Result<()> {
        let raw = winreg::RegValue {
            bytes: data.to_vec(),
            vtype: REG_BINARY,
        };
        open_or_create(hive, view, sub_key, KEY_WRITE)?
            .set_raw_value(value, &raw)
            .map_err(|e| EngineError::Platform(format!("write_binary {sub_key}\\{value}: {e}")))
    }

    fn delete_value(&self, hive: Hive, view: RegistryView, sub_key: &str, value: &str) -> Result<()> {
        match open(hive, view, sub_key, KEY_WRITE) {
            Some(key) => key
                .delete_value(value)
                .map_err(|e| EngineError::Platform(format!("delete_value {sub_key}\\{value}: {e}"))),
            None => Ok(()),
        }
    }

    fn enumerate_value_names(&self, hive: Hive, view: RegistryView, sub_key: &str) -> Vec<String> {
        let Some(key) = open(hive, view, sub_key, KEY_READ) else {
            return Vec::new();
        };
        key.enum_values().filter_map(|r| r.ok()).map(|(name, _)| name).collect()
    }

    fn enumerate_subkey_names(&self, hive: Hive, view: RegistryView, sub_key: &str) -> Vec<String> {
        let Some(key) = open(hive, view, sub_key, KEY_READ) else {
            return Vec::new();
        };
        key.enum_keys().filter_map(|r| r.ok()).collect()
    }

    fn subkey_exists(&self, hive: Hive, view: RegistryView, sub_key: &str) -> bool {
        open(hive, view, sub_key, KEY_READ).is_some()
    }
}
