//! Platform Adapter (spec §4.1 component 1, the leaf everything else is
//! built on). Traits here are the contract; [`windows`] holds the real
//! `#[cfg(windows)]` implementations and [`fake`] (behind `test-support`)
//! holds in-memory ones with identical semantics.

pub mod elevation;
pub mod filesystem;
pub mod package;
pub mod registry;
pub mod shortcut;
pub mod signature;
pub mod task_scheduler;

#[cfg(windows)]
pub mod windows;

#[cfg(feature = "test-support")]
pub mod fake;

pub use elevation::ElevationCheck;
pub use filesystem::{DirEntryInfo, FileMetadata, FileSystemAdapter, KnownFolder};
pub use package::{PackageAdapter, PackageInfo};
pub use registry::{Hive, RegistryAdapter, RegistryView};
pub use shortcut::{ResolvedShortcut, ShortcutResolver};
pub use signature::{SignatureInfo, SignatureVerifier};
pub use task_scheduler::{LogonTaskSpec, TaskAction, TaskInfo, TaskSchedulerAdapter};

use std::sync::Arc;

/// The full set of platform collaborators the Scanner, Classifier, Control
/// Service, and Delay Service are built against. Holding them as
/// trait-object `Arc`s (rather than generic parameters threaded through
/// every function) is what lets `test-support` substitute fakes without a
/// parallel generic-heavy API.
#[derive(Clone)]
pub struct Platform {
    pub registry: Arc<dyn RegistryAdapter>,
    pub file_system: Arc<dyn FileSystemAdapter>,
    pub task_scheduler: Arc<dyn TaskSchedulerAdapter>,
    pub shortcuts: Arc<dyn ShortcutResolver>,
    pub signatures: Arc<dyn SignatureVerifier>,
    pub packages: Arc<dyn PackageAdapter>,
    pub elevation: Arc<dyn ElevationCheck>,
}
