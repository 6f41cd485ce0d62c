//! Control Service (spec §4.3): `enable`/`disable` per entry, dispatching on
//! `sourceKind` to one of the per-kind reversible protocols. Every call
//! asserts administrator rights first; backups are saved only after the
//! live mutation succeeds, and deleted only after a live restore succeeds,
//! so a failure never leaves the catalog and the live registry disagreeing.

use crate::catalog::BackupCatalog;
use crate::domain::backup::StartupEntryBackup;
use crate::domain::enums::SourceKind;
use crate::domain::item::StartupItem;
use crate::error::{EngineError, Result};
use crate::platform::registry::{Hive, RegistryView};
use crate::platform::Platform;
use crate::scanner::collectors::{run_keys, startup_folder};
use chrono::Utc;
use std::path::Path;
use tracing::instrument;

const SERVICES_KEY: &str = r"SYSTEM\CurrentControlSet\Services";
const SYSTEM_APP_DATA_KEY: &str = r"Software\Classes\Local Settings\Software\Microsoft\Windows\CurrentVersion\AppModel\SystemAppData";

const APPROVAL_ENABLED: [u8; 12] = [2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
const APPROVAL_DISABLED: [u8; 12] = [3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];

pub struct ControlService {
    platform: Platform,
    backups: BackupCatalog,
}

impl ControlService {
    pub fn new(platform: Platform, common_app_data: &Path) -> Self {
        Self {
            platform,
            backups: BackupCatalog::new(common_app_data),
        }
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn with_backups(platform: Platform, backups: BackupCatalog) -> Self {
        Self { platform, backups }
    }

    #[instrument(skip(self, item))]
    pub fn disable(&self, item: &StartupItem) -> Result<StartupItem> {
        self.assert_elevated()?;
        match item.source_kind {
            SourceKind::RunKey | SourceKind::RunOnce => self.disable_run_key(item),
            SourceKind::StartupFolder => self.disable_startup_folder(item),
            SourceKind::ScheduledTask => self.disable_scheduled_task(item),
            SourceKind::Service => self.disable_service(item),
            SourceKind::PackagedTask => self.disable_packaged_task(item),
            other => Err(EngineError::UnsupportedSource(other.to_string())),
        }
    }

    #[instrument(skip(self, item))]
    pub fn enable(&self, item: &StartupItem) -> Result<StartupItem> {
        self.assert_elevated()?;
        match item.source_kind {
            SourceKind::RunKey | SourceKind::RunOnce => self.enable_run_key(item),
            SourceKind::StartupFolder => self.enable_startup_folder(item),
            SourceKind::ScheduledTask => self.enable_scheduled_task(item),
            SourceKind::Service => self.enable_service(item),
            SourceKind::PackagedTask => self.enable_packaged_task(item),
            other => Err(EngineError::UnsupportedSource(other.to_string())),
        }
    }

    fn assert_elevated(&self) -> Result<()> {
        if self.platform.elevation.is_elevated() {
            Ok(())
        } else {
            Err(EngineError::NotElevated)
        }
    }

    fn parse_run_tag(&self, item: &StartupItem) -> Result<(Hive, RegistryView, &'static run_keys::RunLocation)> {
        let tag = item.source_tag.as_str();
        let (hive, rest) = if let Some(rest) = tag.strip_prefix("HKCU ") {
            (Hive::CurrentUser, rest)
        } else if let Some(rest) = tag.strip_prefix("HKLM ") {
            (Hive::LocalMachine, rest)
        } else {
            return Err(EngineError::InvalidEntry(format!("unrecognized run-key tag {tag}")));
        };
        let (view, short_name) = match rest.strip_suffix(" (32-bit)") {
            Some(rest) => (RegistryView::Wow64_32, rest),
            None => (RegistryView::Native, rest),
        };
        let location = run_keys::find_location(short_name).ok_or_else(|| EngineError::InvalidEntry(format!("unknown run-key location {short_name}")))?;
        Ok((hive, view, location))
    }

    fn disable_run_key(&self, item: &StartupItem) -> Result<StartupItem> {
        let (hive, view, location) = self.parse_run_tag(item)?;
        let current_data = self.platform.registry.read_string(hive, view, location.sub_key, &item.name);
        if current_data.is_none() {
            return Ok(with_enabled(item, false));
        }

        if let Some(approved_key) = run_keys::approved_key_for(location, view) {
            self.platform.registry.write_binary(hive, view, &approved_key, &item.name, &APPROVAL_DISABLED)?;
        } else {
            self.platform.registry.delete_value(hive, view, location.sub_key, &item.name)?;
        }

        self.backups.save(StartupEntryBackup::RunKey {
            id: item.id.clone(),
            registry_root: hive.label().to_string(),
            registry_sub_key: location.sub_key.to_string(),
            registry_value_name: item.name.clone(),
            registry_value_data: current_data,
            created_at_utc: Utc::now(),
        })?;

        Ok(with_enabled(item, false))
    }

    fn enable_run_key(&self, item: &StartupItem) -> Result<StartupItem> {
        let (hive, view, location) = self.parse_run_tag(item)?;

        let backup = self.backups.get(&item.id).or_else(|| self.backups.find_latest_by_value_name(&item.name));
        let data = backup
            .as_ref()
            .and_then(|b| match b {
                StartupEntryBackup::RunKey { registry_value_data, .. } => registry_value_data.clone(),
                _ => None,
            })
            .or_else(|| item.raw_command.clone());
        let Some(data) = data else {
            return Err(EngineError::LiveNotFound(item.id.clone()));
        };

        self.platform.registry.write_string(hive, view, location.sub_key, &item.name, &data)?;
        if let Some(approved_key) = run_keys::approved_key_for(location, view) {
            self.platform.registry.write_binary(hive, view, &approved_key, &item.name, &APPROVAL_ENABLED)?;
        }
        self.backups.remove(&item.id)?;

        Ok(with_enabled(item, true))
    }

    fn disable_startup_folder(&self, item: &StartupItem) -> Result<StartupItem> {
        let hive = startup_folder_hive(item);
        self.platform
            .registry
            .write_binary(hive, RegistryView::Native, startup_folder::APPROVED_SUB_KEY, &item.name, &APPROVAL_DISABLED)?;

        self.backups.save(StartupEntryBackup::StartupFolder {
            id: item.id.clone(),
            entry_location: item.entry_location.clone(),
            registry_value_name: item.name.clone(),
            file_original_path: None,
            created_at_utc: Utc::now(),
        })?;

        Ok(with_enabled(item, false))
    }

    fn enable_startup_folder(&self, item: &StartupItem) -> Result<StartupItem> {
        let hive = startup_folder_hive(item);
        self.platform
            .registry
            .write_binary(hive, RegistryView::Native, startup_folder::APPROVED_SUB_KEY, &item.name, &APPROVAL_ENABLED)?;
        self.backups.remove(&item.id)?;

        Ok(with_enabled(item, true))
    }

    fn disable_scheduled_task(&self, item: &StartupItem) -> Result<StartupItem> {
        let task_path = &item.entry_location;
        let current_enabled = self.platform.task_scheduler.is_enabled(task_path).unwrap_or(true);
        self.platform.task_scheduler.set_enabled(task_path, false)?;

        self.backups.save(StartupEntryBackup::ScheduledTask {
            id: item.id.clone(),
            task_path: task_path.clone(),
            task_enabled: current_enabled,
            created_at_utc: Utc::now(),
        })?;

        Ok(with_enabled(item, false))
    }

    fn enable_scheduled_task(&self, item: &StartupItem) -> Result<StartupItem> {
        let task_path = &item.entry_location;
        let backup = self.backups.get(&item.id);
        let target = backup
            .as_ref()
            .and_then(|b| match b {
                StartupEntryBackup::ScheduledTask { task_enabled, .. } => Some(*task_enabled),
                _ => None,
            })
            .unwrap_or(true);

        self.platform.task_scheduler.set_enabled(task_path, target)?;
        self.backups.remove(&item.id)?;

        Ok(with_enabled(item, target))
    }

    fn service_name(item: &StartupItem) -> Result<&str> {
        item.id.strip_prefix("svc:").ok_or_else(|| EngineError::InvalidEntry(format!("not a service id: {}", item.id)))
    }

    fn disable_service(&self, item: &StartupItem) -> Result<StartupItem> {
        let service_name = Self::service_name(item)?;
        let sub_key = format!("{SERVICES_KEY}\\{service_name}");

        let current_start = self.platform.registry.read_dword(Hive::LocalMachine, RegistryView::Native, &sub_key, "Start").unwrap_or(2);
        let current_delayed = self
            .platform
            .registry
            .read_dword(Hive::LocalMachine, RegistryView::Native, &sub_key, "DelayedAutoStart")
            .unwrap_or(0)
            == 1;

        self.platform.registry.write_dword(Hive::LocalMachine, RegistryView::Native, &sub_key, "Start", 4)?;
        self.platform.registry.write_dword(Hive::LocalMachine, RegistryView::Native, &sub_key, "DelayedAutoStart", 0)?;

        self.backups.save(StartupEntryBackup::Service {
            id: item.id.clone(),
            service_name: service_name.to_string(),
            service_start_value: current_start,
            service_delayed_auto_start: current_delayed,
            created_at_utc: Utc::now(),
        })?;

        Ok(with_enabled(item, false))
    }

    fn enable_service(&self, item: &StartupItem) -> Result<StartupItem> {
        let service_name = Self::service_name(item)?;
        let sub_key = format!("{SERVICES_KEY}\\{service_name}");

        let backup = self.backups.get(&item.id);
        let (start, delayed) = backup
            .as_ref()
            .and_then(|b| match b {
                StartupEntryBackup::Service {
                    service_start_value,
                    service_delayed_auto_start,
                    ..
                } => Some((*service_start_value, *service_delayed_auto_start)),
                _ => None,
            })
            .unwrap_or((2, false));

        self.platform.registry.write_dword(Hive::LocalMachine, RegistryView::Native, &sub_key, "Start", start)?;
        self.platform
            .registry
            .write_dword(Hive::LocalMachine, RegistryView::Native, &sub_key, "DelayedAutoStart", delayed as u32)?;
        self.backups.remove(&item.id)?;

        Ok(with_enabled(item, start != 4))
    }

    fn packaged_task_state_key(item: &StartupItem) -> Result<String> {
        let rest = item.id.strip_prefix("appx:").ok_or_else(|| EngineError::InvalidEntry(format!("not a packaged-task id: {}", item.id)))?;
        let (family, task_id) = rest.split_once('!').ok_or_else(|| EngineError::InvalidEntry(format!("malformed packaged-task id: {}", item.id)))?;
        Ok(format!("{SYSTEM_APP_DATA_KEY}\\{family}\\{task_id}"))
    }

    fn disable_packaged_task(&self, item: &StartupItem) -> Result<StartupItem> {
        let state_key = Self::packaged_task_state_key(item)?;
        let current_state = self.platform.registry.read_dword(Hive::CurrentUser, RegistryView::Native, &state_key, "State");

        self.platform.registry.write_dword(Hive::CurrentUser, RegistryView::Native, &state_key, "State", 1)?;

        self.backups.save(StartupEntryBackup::PackagedTask {
            id: item.id.clone(),
            registry_sub_key: state_key,
            registry_value_name: "State".to_string(),
            registry_value_data: current_state.map(|v| v.to_string()),
            created_at_utc: Utc::now(),
        })?;

        Ok(with_enabled(item, false))
    }

    fn enable_packaged_task(&self, item: &StartupItem) -> Result<StartupItem> {
        let state_key = Self::packaged_task_state_key(item)?;
        let backup = self.backups.get(&item.id);
        let restore_value = backup
            .as_ref()
            .and_then(|b| match b {
                StartupEntryBackup::PackagedTask { registry_value_data, .. } => registry_value_data.as_ref(),
                _ => None,
            })
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(2);

        self.platform.registry.write_dword(Hive::CurrentUser, RegistryView::Native, &state_key, "State", restore_value)?;
        self.backups.remove(&item.id)?;

        Ok(with_enabled(item, matches!(restore_value, 2 | 4 | 5)))
    }
}

fn startup_folder_hive(item: &StartupItem) -> Hive {
    if item.user_context.is_current_user() {
        Hive::CurrentUser
    } else {
        Hive::LocalMachine
    }
}

fn with_enabled(item: &StartupItem, is_enabled: bool) -> StartupItem {
    let mut updated = item.clone();
    updated.is_enabled = is_enabled;
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::enums::{Impact, SignatureStatus, UserContext};
    use crate::domain::id;
    use crate::platform::fake::FakePlatform;

    fn run_key_item() -> StartupItem {
        StartupItem {
            id: id::run_key("HKCU Run", "Notepad"),
            name: "Notepad".into(),
            source_tag: "HKCU Run".into(),
            source_kind: SourceKind::RunKey,
            executable_path: r"C:\Windows\System32\notepad.exe".into(),
            arguments: None,
            raw_command: Some(r#""C:\Windows\System32\notepad.exe""#.into()),
            is_enabled: true,
            entry_location: r"HKCU\Software\Microsoft\Windows\CurrentVersion\Run".into(),
            publisher: None,
            signature_status: SignatureStatus::Unknown,
            impact: Impact::Low,
            file_size_bytes: None,
            last_modified_utc: None,
            user_context: UserContext::CurrentUser,
        }
    }

    fn service() -> (FakePlatform, ControlService, tempfile::TempDir) {
        let fake = FakePlatform::new();
        let dir = tempfile::tempdir().unwrap();
        let svc = ControlService::new(fake.platform(), dir.path());
        (fake, svc, dir)
    }

    #[test]
    fn disable_then_enable_run_key_round_trips() {
        let (fake, svc, _dir) = service();
        fake.registry.seed_string(
            Hive::CurrentUser,
            RegistryView::Native,
            r"Software\Microsoft\Windows\CurrentVersion\Run",
            "Notepad",
            r#""C:\Windows\System32\notepad.exe""#,
        );
        let item = run_key_item();

        let disabled = svc.disable(&item).unwrap();
        assert!(!disabled.is_enabled);
        assert_eq!(
            fake.registry.read_string(Hive::CurrentUser, RegistryView::Native, r"Software\Microsoft\Windows\CurrentVersion\Run", "Notepad"),
            None
        );

        let enabled = svc.enable(&disabled).unwrap();
        assert!(enabled.is_enabled);
        assert_eq!(
            fake.registry.read_string(Hive::CurrentUser, RegistryView::Native, r"Software\Microsoft\Windows\CurrentVersion\Run", "Notepad"),
            Some(r#""C:\Windows\System32\notepad.exe""#.to_string())
        );
    }

    #[test]
    fn disable_without_elevation_fails() {
        let (fake, svc, _dir) = service();
        fake.elevation.set_elevated(false);
        let item = run_key_item();
        assert!(matches!(svc.disable(&item), Err(EngineError::NotElevated)));
    }

    #[test]
    fn service_disable_sets_start_disabled() {
        let (fake, svc, _dir) = service();
        let sub_key = r"SYSTEM\CurrentControlSet\Services\WinDefend";
        fake.registry.seed_dword(Hive::LocalMachine, RegistryView::Native, sub_key, "Start", 2);

        let item = StartupItem {
            id: id::service("WinDefend"),
            name: "Windows Defender".into(),
            source_tag: "Services".into(),
            source_kind: SourceKind::Service,
            executable_path: r"C:\Program Files\Windows Defender\MsMpEng.exe".into(),
            arguments: None,
            raw_command: None,
            is_enabled: true,
            entry_location: format!(r"HKLM\{sub_key}"),
            publisher: Some("Microsoft Corporation".into()),
            signature_status: SignatureStatus::SignedTrusted,
            impact: Impact::High,
            file_size_bytes: None,
            last_modified_utc: None,
            user_context: UserContext::Machine,
        };

        let disabled = svc.disable(&item).unwrap();
        assert!(!disabled.is_enabled);
        assert_eq!(fake.registry.read_dword(Hive::LocalMachine, RegistryView::Native, sub_key, "Start"), Some(4));

        let enabled = svc.enable(&disabled).unwrap();
        assert!(enabled.is_enabled);
        assert_eq!(fake.registry.read_dword(Hive::LocalMachine, RegistryView::Native, sub_key, "Start"), Some(2));
    }

    #[test]
    fn unsupported_source_is_rejected() {
        let (_fake, svc, _dir) = service();
        let mut item = run_key_item();
        item.source_kind = SourceKind::Winlogon;
        assert!(matches!(svc.disable(&item), Err(EngineError::UnsupportedSource(_))));
    }
}
