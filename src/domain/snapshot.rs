//! `StartupInventorySnapshot` — scan result envelope (spec §3).

use super::item::StartupItem;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct StartupInventorySnapshot {
    pub items: Vec<StartupItem>,
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
    pub is_partial: bool,
}

impl StartupInventorySnapshot {
    /// `isPartial` is derived, never set independently (spec §3 invariant:
    /// `isPartial` ≡ `warnings.nonEmpty()`).
    pub fn new(items: Vec<StartupItem>, warnings: Vec<String>, generated_at: DateTime<Utc>) -> Self {
        let is_partial = !warnings.is_empty();
        Self {
            items,
            warnings,
            generated_at,
            is_partial,
        }
    }
}
