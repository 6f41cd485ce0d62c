//! Real Windows-backed Platform Adapter implementations. Each module
//! mirrors a `repositories/*.rs` file in the teacher crate: a thin,
//! `unsafe`-contained wrapper that converts platform errors into
//! [`crate::error::EngineError`] at the boundary and nowhere else.

pub mod elevation_impl;
pub mod filesystem_impl;
pub mod package_impl;
pub mod registry_impl;
pub mod shortcut_impl;
pub mod signature_impl;
pub mod task_scheduler_impl;

use super::Platform;
use std::sync::Arc;

/// Build a [`Platform`] wired to the real OS. Services have no dedicated
/// adapter: spec §4.1/§4.3 express `Start`/`DelayedAutoStart` entirely as
/// registry reads/writes under `HKLM\SYSTEM\CurrentControlSet\Services`, so
/// the services collector and Control Service dispatch both go through
/// `registry` directly (see [`crate::domain::policy`] for the fixed subkey).
pub fn live_platform() -> Platform {
    Platform {
        registry: Arc::new(registry_impl::WindowsRegistry),
        file_system: Arc::new(filesystem_impl::WindowsFileSystem),
        task_scheduler: Arc::new(task_scheduler_impl::WindowsTaskScheduler),
        shortcuts: Arc::new(shortcut_impl::WindowsShortcutResolver),
        signatures: Arc::new(signature_impl::WindowsSignatureVerifier),
        packages: Arc::new(package_impl::WindowsPackageAdapter),
        elevation: Arc::new(elevation_impl::WindowsElevationCheck),
    }
}
