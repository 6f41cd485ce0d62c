//! `StartupDelayPlan` — a deferred entry's replacement task (spec §3).

use super::enums::SourceKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupDelayPlan {
    pub id: String,
    pub source_kind: SourceKind,
    pub replacement_task_path: String,
    pub delay_seconds: u32,
    pub created_at_utc: DateTime<Utc>,
}
