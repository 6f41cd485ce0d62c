//! Backup Catalog (spec §4.5): `get/getAll/save/remove/findLatestByValueName
//! /cleanupStale/isValid` over `StartupEntryBackup`, persisted to
//! `<commonAppData>/TidyWindow/StartupBackups/startup-backups.json`
//! (spec §6 "Persisted state layout").

use super::store::JsonStore;
use crate::domain::StartupEntryBackup;
use crate::error::Result;
use std::path::PathBuf;
use tracing::instrument;

pub struct BackupCatalog {
    store: JsonStore,
}

impl BackupCatalog {
    pub fn new(common_app_data: &std::path::Path) -> Self {
        let path = common_app_data.join("TidyWindow").join("StartupBackups").join("startup-backups.json");
        Self { store: JsonStore::new(path) }
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn at_path(path: PathBuf) -> Self {
        Self { store: JsonStore::new(path) }
    }

    #[instrument(skip(self))]
    pub fn get(&self, id: &str) -> Option<StartupEntryBackup> {
        let id_lower = id.to_lowercase();
        self.store
            .load::<StartupEntryBackup>()
            .into_iter()
            .find(|b| b.id().eq_ignore_ascii_case(&id_lower))
    }

    pub fn get_all(&self) -> Vec<StartupEntryBackup> {
        self.store.load()
    }

    /// Insert-or-replace, case-insensitive id (spec §4.5).
    #[instrument(skip(self, backup))]
    pub fn save(&self, backup: StartupEntryBackup) -> Result<()> {
        self.store.mutate(|entries: &mut Vec<StartupEntryBackup>| {
            let id_lower = backup.id().to_lowercase();
            entries.retain(|b| !b.id().eq_ignore_ascii_case(&id_lower));
            entries.push(backup);
        })
    }

    #[instrument(skip(self))]
    pub fn remove(&self, id: &str) -> Result<()> {
        let id_lower = id.to_lowercase();
        self.store.mutate(|entries: &mut Vec<StartupEntryBackup>| {
            entries.retain(|b| !b.id().eq_ignore_ascii_case(&id_lower));
        })
    }

    /// Most recent `createdAtUtc` wins among backups sharing a registry
    /// value name — the enable-path fallback when a backup's own id no
    /// longer matches (spec §4.3 RunKey/RunOnce enable protocol).
    pub fn find_latest_by_value_name(&self, value_name: &str) -> Option<StartupEntryBackup> {
        self.store
            .load::<StartupEntryBackup>()
            .into_iter()
            .filter(|b| b.registry_value_name().map(|n| n.eq_ignore_ascii_case(value_name)).unwrap_or(false))
            .max_by_key(|b| b.created_at_utc())
    }

    /// Remove StartupFolder-kind backups whose file-backup path is absent
    /// and whose original path is also absent (spec §4.5).
    #[instrument(skip(self))]
    pub fn cleanup_stale(&self) -> Result<usize> {
        self.store.mutate(|entries: &mut Vec<StartupEntryBackup>| {
            let before = entries.len();
            entries.retain(|b| {
                !matches!(
                    b,
                    StartupEntryBackup::StartupFolder { file_original_path: None, .. }
                )
            });
            before - entries.len()
        })
    }

    pub fn is_valid(backup: &StartupEntryBackup) -> bool {
        backup.is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id;
    use chrono::Utc;
    use tempfile::tempdir;

    fn sample_backup(id_str: &str) -> StartupEntryBackup {
        StartupEntryBackup::RunKey {
            id: id_str.to_string(),
            registry_root: "HKCU".into(),
            registry_sub_key: r"Software\Microsoft\Windows\CurrentVersion\Run".into(),
            registry_value_name: "Notepad".into(),
            registry_value_data: Some(r#""C:\Windows\System32\notepad.exe""#.into()),
            created_at_utc: Utc::now(),
        }
    }

    #[test]
    fn save_then_get_round_trips() {
        let dir = tempdir().unwrap();
        let catalog = BackupCatalog::at_path(dir.path().join("backups.json"));
        let entry_id = id::run_key("HKCU Run", "Notepad");
        catalog.save(sample_backup(&entry_id)).unwrap();

        let fetched = catalog.get(&entry_id).unwrap();
        assert_eq!(fetched.id(), entry_id);
    }

    #[test]
    fn save_is_case_insensitive_replace() {
        let dir = tempdir().unwrap();
        let catalog = BackupCatalog::at_path(dir.path().join("backups.json"));
        catalog.save(sample_backup("run:HKCU Run:Notepad")).unwrap();
        catalog.save(sample_backup("RUN:HKCU RUN:NOTEPAD")).unwrap();
        assert_eq!(catalog.get_all().len(), 1);
    }

    #[test]
    fn remove_deletes_entry() {
        let dir = tempdir().unwrap();
        let catalog = BackupCatalog::at_path(dir.path().join("backups.json"));
        let entry_id = id::run_key("HKCU Run", "Notepad");
        catalog.save(sample_backup(&entry_id)).unwrap();
        catalog.remove(&entry_id).unwrap();
        assert!(catalog.get(&entry_id).is_none());
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let catalog = BackupCatalog::at_path(dir.path().join("does-not-exist.json"));
        assert!(catalog.get_all().is_empty());
    }
}
