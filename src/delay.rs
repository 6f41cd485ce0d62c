//! Delay Service (spec §4.4): converts an eligible user-scope entry into a
//! logon-triggered replacement task with a delay, disables the original via
//! the Control Service, and records a `StartupDelayPlan`. Mutation is not
//! cancellable mid-flight — cancellation is honored only before it begins
//! (spec §5 "Suspension and blocking").

use crate::catalog::{sanitize_id, DelayPlanCatalog};
use crate::control::ControlService;
use crate::domain::enums::SourceKind;
use crate::domain::item::StartupItem;
use crate::domain::StartupDelayPlan;
use crate::error::{EngineError, Result};
use crate::platform::task_scheduler::LogonTaskSpec;
use crate::platform::Platform;
use crate::scanner::cancel::CancellationToken;
use chrono::Utc;
use std::path::Path;
use std::time::Duration;
use tracing::instrument;

const MIN_DELAY: Duration = Duration::from_secs(15);
const MAX_DELAY: Duration = Duration::from_secs(10 * 60);
const TASK_FOLDER: &str = r"\TidyWindow\DelayedStartup";

pub struct DelayService {
    platform: Platform,
    control: ControlService,
    plans: DelayPlanCatalog,
}

impl DelayService {
    pub fn new(platform: Platform, common_app_data: &Path) -> Self {
        Self {
            control: ControlService::new(platform.clone(), common_app_data),
            plans: DelayPlanCatalog::new(common_app_data),
            platform,
        }
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn with_catalogs(platform: Platform, control: ControlService, plans: DelayPlanCatalog) -> Self {
        Self { platform, control, plans }
    }

    /// Clamp `duration` to [15s, 10min] (spec §4.4).
    fn clamp_delay(duration: Duration) -> Duration {
        duration.clamp(MIN_DELAY, MAX_DELAY)
    }

    #[instrument(skip(self, item, cancel))]
    pub fn delay(&self, item: &StartupItem, duration: Duration, cancel: &CancellationToken) -> Result<StartupItem> {
        if !matches!(item.source_kind, SourceKind::RunKey | SourceKind::RunOnce | SourceKind::StartupFolder) {
            return Err(EngineError::UnsupportedSource(item.source_kind.to_string()));
        }
        if !item.user_context.is_current_user() {
            return Err(EngineError::UnsupportedSource(item.source_kind.to_string()));
        }
        if cancel.is_cancelled() {
            return Err(EngineError::LiveNotFound(item.id.clone()));
        }

        let delay = Self::clamp_delay(duration);
        let task_name = sanitize_id(&item.id);
        let spec = LogonTaskSpec {
            folder: TASK_FOLDER,
            task_name: &task_name,
            command: &item.executable_path,
            arguments: item.arguments.as_deref(),
            delay_seconds: delay.as_secs() as u32,
        };

        let replacement_task_path = self.platform.task_scheduler.register_logon_task(&spec)?;

        let disabled = self.control.disable(item)?;

        self.plans.save(StartupDelayPlan {
            id: item.id.clone(),
            source_kind: item.source_kind,
            replacement_task_path,
            delay_seconds: delay.as_secs() as u32,
            created_at_utc: Utc::now(),
        })?;

        Ok(disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BackupCatalog;
    use crate::domain::enums::{Impact, SignatureStatus, UserContext};
    use crate::domain::id;
    use crate::platform::fake::FakePlatform;
    use crate::platform::registry::{Hive, RegistryView};

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

    fn service() -> (FakePlatform, DelayService, tempfile::TempDir) {
        let fake = FakePlatform::new();
        let dir = tempfile::tempdir().unwrap();
        let control = ControlService::with_backups(fake.platform(), BackupCatalog::at_path(dir.path().join("backups.json")));
        let plans = DelayPlanCatalog::at_path(dir.path().join("delays.json"));
        let svc = DelayService::with_catalogs(fake.platform(), control, plans);
        (fake, svc, dir)
    }

    #[test]
    fn delay_clamps_duration_and_disables_original() {
        let (fake, svc, _dir) = service();
        fake.registry.seed_string(
            Hive::CurrentUser,
            RegistryView::Native,
            r"Software\Microsoft\Windows\CurrentVersion\Run",
            "Notepad",
            r#""C:\Windows\System32\notepad.exe""#,
        );
        let item = run_key_item();

        let result = svc.delay(&item, Duration::from_secs(1), &CancellationToken::new()).unwrap();
        assert!(!result.is_enabled);

        let plan = svc.plans.get(&item.id).unwrap();
        assert_eq!(plan.delay_seconds, 15);
        assert!(fake.task_scheduler.task_exists(&plan.replacement_task_path));

        assert_eq!(
            fake.registry.read_string(Hive::CurrentUser, RegistryView::Native, r"Software\Microsoft\Windows\CurrentVersion\Run", "Notepad"),
            None
        );
    }

    #[test]
    fn delay_rejects_services() {
        let (_fake, svc, _dir) = service();
        let mut item = run_key_item();
        item.source_kind = SourceKind::Service;
        assert!(matches!(svc.delay(&item, Duration::from_secs(30), &CancellationToken::new()), Err(EngineError::UnsupportedSource(_))));
    }

    #[test]
    fn delay_rejects_machine_scope() {
        let (_fake, svc, _dir) = service();
        let mut item = run_key_item();
        item.user_context = UserContext::Machine;
        assert!(matches!(svc.delay(&item, Duration::from_secs(30), &CancellationToken::new()), Err(EngineError::UnsupportedSource(_))));
    }
}
