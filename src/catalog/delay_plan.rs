//! Delay Plan Catalog (spec §4.5), persisted to
//! `<commonAppData>/TidyWindow/StartupBackups/startup-delays.json`.

use super::store::JsonStore;
use crate::domain::StartupDelayPlan;
use crate::error::Result;
use std::path::PathBuf;
use tracing::instrument;

pub struct DelayPlanCatalog {
    store: JsonStore,
}

impl DelayPlanCatalog {
    pub fn new(common_app_data: &std::path::Path) -> Self {
        let path = common_app_data.join("TidyWindow").join("StartupBackups").join("startup-delays.json");
        Self { store: JsonStore::new(path) }
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn at_path(path: PathBuf) -> Self {
        Self { store: JsonStore::new(path) }
    }

    #[instrument(skip(self))]
    pub fn get(&self, id: &str) -> Option<StartupDelayPlan> {
        let id_lower = id.to_lowercase();
        self.store
            .load::<StartupDelayPlan>()
            .into_iter()
            .find(|p| p.id.eq_ignore_ascii_case(&id_lower))
    }

    pub fn get_all(&self) -> Vec<StartupDelayPlan> {
        self.store.load()
    }

    #[instrument(skip(self, plan))]
    pub fn save(&self, plan: StartupDelayPlan) -> Result<()> {
        self.store.mutate(|entries: &mut Vec<StartupDelayPlan>| {
            let id_lower = plan.id.to_lowercase();
            entries.retain(|p| !p.id.eq_ignore_ascii_case(&id_lower));
            entries.push(plan);
        })
    }

    #[instrument(skip(self))]
    pub fn remove(&self, id: &str) -> Result<()> {
        let id_lower = id.to_lowercase();
        self.store.mutate(|entries: &mut Vec<StartupDelayPlan>| {
            entries.retain(|p| !p.id.eq_ignore_ascii_case(&id_lower));
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::enums::SourceKind;
    use chrono::Utc;
    use tempfile::tempdir;

    fn sample_plan(id: &str) -> StartupDelayPlan {
        StartupDelayPlan {
            id: id.to_string(),
            source_kind: SourceKind::RunKey,
            replacement_task_path: r"\TidyWindow\DelayedStartup\run_HKCU Run_Notepad".into(),
            delay_seconds: 15,
            created_at_utc: Utc::now(),
        }
    }

    #[test]
    fn save_then_get_round_trips() {
        let dir = tempdir().unwrap();
        let catalog = DelayPlanCatalog::at_path(dir.path().join("delays.json"));
        catalog.save(sample_plan("run:HKCU Run:Notepad")).unwrap();
        assert!(catalog.get("run:HKCU Run:Notepad").is_some());
    }

    #[test]
    fn remove_deletes_entry() {
        let dir = tempdir().unwrap();
        let catalog = DelayPlanCatalog::at_path(dir.path().join("delays.json"));
        catalog.save(sample_plan("run:HKCU Run:Notepad")).unwrap();
        catalog.remove("run:HKCU Run:Notepad").unwrap();
        assert!(catalog.get("run:HKCU Run:Notepad").is_none());
    }
}
