//! `StartupItem` — the normalized autorun entry (spec §3).

use super::enums::{Impact, SignatureStatus, SourceKind, UserContext};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single normalized autorun entry.
///
/// `id` is stable and case-insensitive across rescans (spec §3 invariant);
/// construct it with [`crate::domain::id`] rather than by hand so the
/// scheme stays centralized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupItem {
    pub id: String,
    pub name: String,
    pub source_tag: String,
    pub source_kind: SourceKind,
    pub executable_path: String,
    pub arguments: Option<String>,
    pub raw_command: Option<String>,
    pub is_enabled: bool,
    pub entry_location: String,
    pub publisher: Option<String>,
    pub signature_status: SignatureStatus,
    pub impact: Impact,
    pub file_size_bytes: Option<u64>,
    pub last_modified_utc: Option<DateTime<Utc>>,
    pub user_context: UserContext,
}

impl StartupItem {
    /// Case-insensitive identity comparison (spec §3: "Case-insensitive").
    pub fn same_identity(&self, other: &str) -> bool {
        self.id.eq_ignore_ascii_case(other)
    }

    /// Orphan entries synthesized from a dangling `StartupApproved` key have
    /// no live executable (spec §3 invariant).
    pub fn is_orphan(&self) -> bool {
        self.executable_path.is_empty()
    }
}
