//! In-memory registry with the same `(hive, view, subkey)` addressing and
//! binary/string/dword value kinds as the real `winreg`-backed adapter, so
//! collector and Control Service tests can seed `StartupApproved` blobs and
//! service `Start`/`DelayedAutoStart` values directly.

use crate::error::Result;
use crate::platform::registry::{Hive, RegistryAdapter, RegistryView};
use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum RegData {
    Dword(u32),
    Str(String),
    Binary(Vec<u8>),
}

type KeyId = (Hive, RegistryView, String);

#[derive(Default)]
struct RegistryState {
    keys: HashMap<KeyId, HashMap<String, RegData>>,
}

#[derive(Clone)]
pub struct FakeRegistry {
    state: Arc<Mutex<RegistryState>>,
}

fn norm(sub_key: &str) -> String {
    sub_key.trim_matches('\\').to_lowercase()
}

fn key_id(hive: Hive, view: RegistryView, sub_key: &str) -> KeyId {
    (hive, view, norm(sub_key))
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(RegistryState::default())),
        }
    }

    /// Seed helpers, used by test setup to avoid going through the trait's
    /// `Result`-returning `write_*` for data that should already exist.
    pub fn seed_dword(&self, hive: Hive, view: RegistryView, sub_key: &str, value: &str, data: u32) {
        self.ensure_key(hive, view, sub_key)
            .insert(value.to_string(), RegData::Dword(data));
    }

    pub fn seed_string(&self, hive: Hive, view: RegistryView, sub_key: &str, value: &str, data: &str) {
        self.ensure_key(hive, view, sub_key)
            .insert(value.to_string(), RegData::Str(data.to_string()));
    }

    pub fn seed_binary(&self, hive: Hive, view: RegistryView, sub_key: &str, value: &str, data: &[u8]) {
        self.ensure_key(hive, view, sub_key)
            .insert(value.to_string(), RegData::Binary(data.to_vec()));
    }

    fn ensure_key(&self, hive: Hive, view: RegistryView, sub_key: &str) -> MappedMutexGuard<'_, HashMap<String, RegData>> {
        MutexGuard::map(self.state.lock(), move |s| {
            s.keys.entry(key_id(hive, view, sub_key)).or_default()
        })
    }
}

impl RegistryAdapter for FakeRegistry {
    fn read_dword(&self, hive: Hive, view: RegistryView, sub_key: &str, value: &str) -> Option<u32> {
        match self.state.lock().keys.get(&key_id(hive, view, sub_key))?.get(value)? {
            RegData::Dword(v) => Some(*v),
            _ => None,
        }
    }

    fn read_string(&self, hive: Hive, view: RegistryView, sub_key: &str, value: &str) -> Option<String> {
        match self.state.lock().keys.get(&key_id(hive, view, sub_key))?.get(value)? {
            RegData::Str(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn read_binary(&self, hive: Hive, view: RegistryView, sub_key: &str, value: &str) -> Option<Vec<u8>> {
        match self.state.lock().keys.get(&key_id(hive, view, sub_key))?.get(value)? {
            RegData::Binary(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn write_dword(&self, hive: Hive, view: RegistryView, sub_key: &str, value: &str, data: u32) -> Result<()> {
        self.ensure_key(hive, view, sub_key)
            .insert(value.to_string(), RegData::Dword(data));
        Ok(())
    }

    fn write_string(&self, hive: Hive, view: RegistryView, sub_key: &str, value: &str, data: &str) -> Result<()> {
        self.ensure_key(hive, view, sub_key)
            .insert(value.to_string(), RegData::Str(data.to_string()));
        Ok(())
    }

    fn write_binary(&self, hive: Hive, view: RegistryView, sub_key: &str, value: &str, data: &[u8]) -> Result<()> {
        self.ensure_key(hive, view, sub_key)
            .insert(value.to_string(), RegData::Binary(data.to_vec()));
        Ok(())
    }

    fn delete_value(&self, hive: Hive, view: RegistryView, sub_key: &str, value: &str) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(key) = state.keys.get_mut(&key_id(hive, view, sub_key)) {
            key.remove(value);
        }
        Ok(())
    }

    fn enumerate_value_names(&self, hive: Hive, view: RegistryView, sub_key: &str) -> Vec<String> {
        self.state
            .lock()
            .keys
            .get(&key_id(hive, view, sub_key))
            .map(|key| key.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn enumerate_subkey_names(&self, hive: Hive, view: RegistryView, sub_key: &str) -> Vec<String> {
        let prefix = norm(sub_key);
        let state = self.state.lock();
        let mut names: Vec<String> = state
            .keys
            .keys()
            .filter(|(h, v, path)| *h == hive && *v == view && path != &prefix)
            .filter_map(|(_, _, path)| {
                let rest = if prefix.is_empty() {
                    Some(path.as_str())
                } else {
                    path.strip_prefix(&prefix).and_then(|r| r.strip_prefix('\\'))
                };
                rest.and_then(|r| r.split('\\').next()).map(|s| s.to_string())
            })
            .collect();
        names.sort();
        names.dedup();
        names
    }

    fn subkey_exists(&self, hive: Hive, view: RegistryView, sub_key: &str) -> bool {
        let prefix = norm(sub_key);
        self.state
            .lock()
            .keys
            .keys()
            .any(|(h, v, path)| *h == hive && *v == view && (path == &prefix || path.starts_with(&format!("{prefix}\\"))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_value_round_trips() {
        let registry = FakeRegistry::new();
        registry.seed_binary(
            Hive::CurrentUser,
            RegistryView::Native,
            r"Software\Microsoft\Windows\CurrentVersion\Explorer\StartupApproved\Run",
            "Notepad",
            &[2u8; 12],
        );
        let blob = registry
            .read_binary(
                Hive::CurrentUser,
                RegistryView::Native,
                r"Software\Microsoft\Windows\CurrentVersion\Explorer\StartupApproved\Run",
                "Notepad",
            )
            .unwrap();
        assert_eq!(blob[0], 2);
    }

    #[test]
    fn enumerate_subkey_names_returns_immediate_children() {
        let registry = FakeRegistry::new();
        registry.seed_dword(Hive::LocalMachine, RegistryView::Native, r"SYSTEM\CurrentControlSet\Services\Spooler", "Start", 2);
        registry.seed_dword(Hive::LocalMachine, RegistryView::Native, r"SYSTEM\CurrentControlSet\Services\WinDefend", "Start", 2);
        let names = registry.enumerate_subkey_names(Hive::LocalMachine, RegistryView::Native, r"SYSTEM\CurrentControlSet\Services");
        assert_eq!(names, vec!["spooler".to_string(), "windefend".to_string()]);
    }
}
