//! Scan orchestration (spec §4.1 "Scanner").
//!
//! Collectors run in a fixed order; orphan synthesis runs last so it never
//! masks a live item sharing an id. Each collector is isolated: a failure
//! becomes a warning, never a failed scan. Cancellation is different —
//! observed mid-scan, it discards the partial snapshot entirely rather than
//! returning it (spec §5 "Cancellation semantics").

pub mod cancel;
pub mod collectors;
pub mod impact;

use crate::catalog::DelayPlanCatalog;
use crate::domain::{item::StartupItem, options::StartupInventoryOptions, StartupInventorySnapshot};
use crate::platform::Platform;
use cancel::{CancellationToken, ScanCancelled};
use std::collections::HashSet;
use std::path::Path;
use tracing::instrument;

pub struct Scanner {
    platform: Platform,
    delay_plans: DelayPlanCatalog,
}

impl Scanner {
    pub fn new(platform: Platform, common_app_data: &Path) -> Self {
        Self {
            platform,
            delay_plans: DelayPlanCatalog::new(common_app_data),
        }
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn with_delay_plans(platform: Platform, delay_plans: DelayPlanCatalog) -> Self {
        Self { platform, delay_plans }
    }

    #[instrument(skip(self, cancel))]
    pub fn scan(
        &self,
        options: &StartupInventoryOptions,
        cancel: &CancellationToken,
    ) -> std::result::Result<StartupInventorySnapshot, ScanCancelled> {
        let mut items = Vec::new();
        let mut warnings = Vec::new();

        macro_rules! run_collector {
            ($name:literal, $module:path) => {
                match $module(&self.platform, options, cancel, &mut warnings) {
                    Ok(mut collected) => items.append(&mut collected),
                    Err(e) => warnings.push(format!("{}: {e}", $name)),
                }
                if cancel.is_cancelled() {
                    return Err(ScanCancelled);
                }
            };
        }

        run_collector!("registry Run family", collectors::run_keys::collect);
        run_collector!("startup folders", collectors::startup_folder::collect);
        run_collector!("scheduled tasks", collectors::scheduled_tasks::collect);
        run_collector!("services", collectors::services::collect);
        run_collector!("packaged tasks", collectors::packaged_tasks::collect);
        run_collector!("extended locations", collectors::extended::collect);

        if options.include_startup_approved_orphans {
            let live_ids: HashSet<String> = items.iter().map(|i| i.id.to_lowercase()).collect();
            match collectors::approved_orphans::collect(&self.platform, options, cancel, &live_ids, &mut warnings) {
                Ok(mut orphans) => items.append(&mut orphans),
                Err(e) => warnings.push(format!("startup approved orphans: {e}")),
            }
            if cancel.is_cancelled() {
                return Err(ScanCancelled);
            }
        }

        self.cross_check_delay_plans(&items, &mut warnings);

        Ok(StartupInventorySnapshot::new(items, warnings, chrono::Utc::now()))
    }

    /// Spec §4.1 "Delay-plan cross-check": warn when an installer re-added
    /// an item that is still covered by a delay plan, and warn when a
    /// plan's replacement task has vanished out from under it.
    fn cross_check_delay_plans(&self, items: &[StartupItem], warnings: &mut Vec<String>) {
        let live_ids: HashSet<String> = items.iter().map(|i| i.id.to_lowercase()).collect();

        for plan in self.delay_plans.get_all() {
            if live_ids.contains(&plan.id.to_lowercase()) {
                warnings.push(format!("delay plan for {} still exists but the original entry has reappeared", plan.id));
            }
            if !self.platform.task_scheduler.task_exists(&plan.replacement_task_path) {
                warnings.push(format!("delay plan for {} is missing its replacement task {}", plan.id, plan.replacement_task_path));
            }
        }
    }
}
