//! Startup Autorun Inventory & Reversible Control Engine.
//!
//! Discovers every place Windows automatically executes code on boot or
//! logon, classifies each entry's trust and blast-radius, and provides a
//! reversible enable/disable/defer operation with per-entry backups. A
//! library, not a process — callers drive the [`scanner`], [`control`], and
//! [`delay`] surfaces directly.

pub mod catalog;
pub mod classifier;
pub mod control;
pub mod delay;
pub mod domain;
pub mod error;
pub mod platform;
pub mod scanner;

pub use crate::catalog::{BackupCatalog, DelayPlanCatalog};
pub use crate::classifier::Classifier;
pub use crate::control::ControlService;
pub use crate::delay::DelayService;
pub use crate::domain::{
    item::StartupItem, options::StartupInventoryOptions, StartupDelayPlan, StartupEntryBackup, StartupInventorySnapshot,
};
pub use crate::error::{EngineError, Result};
pub use crate::platform::Platform;
pub use crate::scanner::{cancel::CancellationToken, Scanner};

pub mod prelude {
    pub use crate::catalog::{BackupCatalog, DelayPlanCatalog};
    pub use crate::classifier::Classifier;
    pub use crate::control::ControlService;
    pub use crate::delay::DelayService;
    pub use crate::domain::{
        item::StartupItem, options::StartupInventoryOptions, StartupDelayPlan, StartupEntryBackup, StartupInventorySnapshot,
    };
    pub use crate::error::{EngineError, Result};
    pub use crate::platform::Platform;
    pub use crate::scanner::{cancel::CancellationToken, Scanner};
}
