//! `StartupEntryBackup` — reversal data for one mutation (spec §3, §9).
//!
//! The spec describes this as "sum-typed payload" stored as a record with
//! nullable fields; per spec §9's design note ("Sum types over
//! inheritance") this implementation uses an explicit tagged variant per
//! controllable `SourceKind` instead, so the Control Service's match over
//! backup shape is exhaustive and a backup can never carry fields that make
//! no sense for its kind.

use super::enums::SourceKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum StartupEntryBackup {
    RunKey {
        id: String,
        registry_root: String,
        registry_sub_key: String,
        registry_value_name: String,
        registry_value_data: Option<String>,
        created_at_utc: DateTime<Utc>,
    },
    StartupFolder {
        id: String,
        entry_location: String,
        registry_value_name: String,
        file_original_path: Option<String>,
        created_at_utc: DateTime<Utc>,
    },
    ScheduledTask {
        id: String,
        task_path: String,
        task_enabled: bool,
        created_at_utc: DateTime<Utc>,
    },
    Service {
        id: String,
        service_name: String,
        service_start_value: u32,
        service_delayed_auto_start: bool,
        created_at_utc: DateTime<Utc>,
    },
    PackagedTask {
        id: String,
        registry_sub_key: String,
        registry_value_name: String,
        registry_value_data: Option<String>,
        created_at_utc: DateTime<Utc>,
    },
}

impl StartupEntryBackup {
    pub fn id(&self) -> &str {
        match self {
            Self::RunKey { id, .. }
            | Self::StartupFolder { id, .. }
            | Self::ScheduledTask { id, .. }
            | Self::Service { id, .. }
            | Self::PackagedTask { id, .. } => id,
        }
    }

    pub fn created_at_utc(&self) -> DateTime<Utc> {
        match self {
            Self::RunKey { created_at_utc, .. }
            | Self::StartupFolder { created_at_utc, .. }
            | Self::ScheduledTask { created_at_utc, .. }
            | Self::Service { created_at_utc, .. }
            | Self::PackagedTask { created_at_utc, .. } => *created_at_utc,
        }
    }

    pub fn source_kind(&self) -> SourceKind {
        match self {
            Self::RunKey { .. } => SourceKind::RunKey,
            Self::StartupFolder { .. } => SourceKind::StartupFolder,
            Self::ScheduledTask { .. } => SourceKind::ScheduledTask,
            Self::Service { .. } => SourceKind::Service,
            Self::PackagedTask { .. } => SourceKind::PackagedTask,
        }
    }

    pub fn registry_value_name(&self) -> Option<&str> {
        match self {
            Self::RunKey {
                registry_value_name,
                ..
            } => Some(registry_value_name),
            Self::StartupFolder {
                registry_value_name,
                ..
            } => Some(registry_value_name),
            Self::PackagedTask {
                registry_value_name,
                ..
            } => Some(registry_value_name),
            _ => None,
        }
    }

    /// Catalog `isValid` rule (spec §4.5): non-empty id and at least one
    /// identifying field.
    pub fn is_valid(&self) -> bool {
        if self.id().is_empty() {
            return false;
        }
        match self {
            Self::RunKey {
                registry_sub_key,
                registry_value_name,
                ..
            } => !registry_sub_key.is_empty() && !registry_value_name.is_empty(),
            Self::StartupFolder {
                entry_location,
                registry_value_name,
                ..
            } => !entry_location.is_empty() || !registry_value_name.is_empty(),
            Self::ScheduledTask { task_path, .. } => !task_path.is_empty(),
            Self::Service { service_name, .. } => !service_name.is_empty(),
            Self::PackagedTask {
                registry_sub_key, ..
            } => !registry_sub_key.is_empty(),
        }
    }
}
