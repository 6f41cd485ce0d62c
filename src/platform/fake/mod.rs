//! In-memory `test-support` fakes for every Platform Adapter trait, with
//! semantics close enough to the real Windows backends to drive the
//! testable properties in spec §8 without a live registry or COM.
//!
//! Grounded on `oj-adapters`'s `notify.rs` fake pattern: an `Arc<Mutex<..>>`
//! behind a `Clone` handle, state inspectable from tests via accessor
//! methods rather than a separate mock-expectations DSL.

pub mod elevation_fake;
pub mod filesystem_fake;
pub mod package_fake;
pub mod registry_fake;
pub mod shortcut_fake;
pub mod signature_fake;
pub mod task_scheduler_fake;

pub use elevation_fake::FakeElevation;
pub use filesystem_fake::FakeFileSystem;
pub use package_fake::FakePackageAdapter;
pub use registry_fake::FakeRegistry;
pub use shortcut_fake::FakeShortcutResolver;
pub use signature_fake::FakeSignatureVerifier;
pub use task_scheduler_fake::FakeTaskScheduler;

use super::Platform;
use std::sync::Arc;

/// A [`Platform`] wired entirely to in-memory fakes, ready for a test to
/// seed with `registry.set_*`/`file_system.add_file` before exercising the
/// Scanner, Classifier, Control Service, or Delay Service.
pub struct FakePlatform {
    pub registry: FakeRegistry,
    pub file_system: FakeFileSystem,
    pub task_scheduler: FakeTaskScheduler,
    pub shortcuts: FakeShortcutResolver,
    pub signatures: FakeSignatureVerifier,
    pub packages: FakePackageAdapter,
    pub elevation: FakeElevation,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self {
            registry: FakeRegistry::new(),
            file_system: FakeFileSystem::new(),
            task_scheduler: FakeTaskScheduler::new(),
            shortcuts: FakeShortcutResolver::new(),
            signatures: FakeSignatureVerifier::new(),
            packages: FakePackageAdapter::new(),
            elevation: FakeElevation::new(true),
        }
    }
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bundle the fakes as a live [`Platform`] for code under test that
    /// takes `&Platform` rather than the individual fakes.
    pub fn platform(&self) -> Platform {
        Platform {
            registry: Arc::new(self.registry.clone()),
            file_system: Arc::new(self.file_system.clone()),
            task_scheduler: Arc::new(self.task_scheduler.clone()),
            shortcuts: Arc::new(self.shortcuts.clone()),
            signatures: Arc::new(self.signatures.clone()),
            packages: Arc::new(self.packages.clone()),
            elevation: Arc::new(self.elevation.clone()),
        }
    }
}
