//! Packaged-app discovery via `Windows.Management.Deployment.PackageManager`,
//! spec §4.1's preferred source; the registry fallback
//! (`HKLM\...\AppModel\Repository\Packages`) lives alongside it since it's
//! the same adapter's job to produce a uniform `PackageInfo` either way.

use crate::error::{EngineError, Result};
use crate::platform::package::{PackageAdapter, PackageInfo};
use std::path::PathBuf;
use windows::Management::Deployment::PackageManager;

pub struct WindowsPackageAdapter;

impl PackageAdapter for WindowsPackageAdapter {
    fn find_packages_for_user(&self) -> Result<Vec<PackageInfo>> {
        match find_via_package_manager() {
            Ok(packages) if !packages.is_empty() => Ok(packages),
            _ => find_via_registry(),
        }
    }

    fn read_manifest(&self, package: &PackageInfo) -> Result<String> {
        let manifest_path = package.install_path.join("AppxManifest.xml");
        std::fs::read_to_string(&manifest_path)
            .map_err(|e| EngineError::Io(format!("{}: {e}", manifest_path.display())))
    }
}

fn find_via_package_manager() -> Result<Vec<PackageInfo>> {
    let manager = PackageManager::new().map_err(|e| EngineError::Platform(format!("PackageManager::new: {e}")))?;
    let packages = manager
        .FindPackagesByUserSecurityId(&windows::core::HSTRING::new())
        .map_err(|e| EngineError::Platform(format!("FindPackagesByUserSecurityId: {e}")))?;

    let mut out = Vec::new();
    for package in packages {
        let id = package.Id().map_err(|e| EngineError::Platform(e.to_string()))?;
        let family_name = id.FamilyName().map_err(|e| EngineError::Platform(e.to_string()))?.to_string_lossy();
        let full_name = id.FullName().map_err(|e| EngineError::Platform(e.to_string()))?.to_string_lossy();
        let version = id.Version().map_err(|e| EngineError::Platform(e.to_string()))?;
        let install_folder = package
            .InstalledLocation()
            .ok()
            .and_then(|f| f.Path().ok())
            .map(|p| PathBuf::from(p.to_string_lossy()))
            .unwrap_or_default();

        out.push(PackageInfo {
            family_name,
            full_name,
            version: (version.Major, version.Minor, version.Build, version.Revision),
            install_path: install_folder,
        });
    }
    Ok(out)
}

/// `HKLM\SOFTWARE\Microsoft\Windows\CurrentVersion\AppModel\Repository\Packages`
/// holds one subkey per installed package, named by its full name, with a
/// `PackageRootFolder` string value pointing at the install directory.
fn find_via_registry() -> Result<Vec<PackageInfo>> {
    use crate::platform::registry::{Hive, RegistryAdapter, RegistryView};
    use crate::platform::windows::registry_impl::WindowsRegistry;

    const BASE: &str = r"SOFTWARE\Microsoft\Windows\CurrentVersion\AppModel\Repository\Packages";
    let registry = WindowsRegistry;
    let mut out = Vec::new();

    for full_name in registry.enumerate_subkey_names(Hive::LocalMachine, RegistryView::Native, BASE) {
        let sub_key = format!("{BASE}\\{full_name}");
        let install_path = registry
            .read_string(Hive::LocalMachine, RegistryView::Native, &sub_key, "PackageRootFolder")
            .map(PathBuf::from)
            .unwrap_or_default();

        let family_name = full_name
            .split_once('_')
            .map(|(name, rest)| format!("{name}_{}", rest.rsplit('_').next().unwrap_or_default()))
            .unwrap_or_else(|| full_name.clone());

        out.push(PackageInfo {
            family_name,
            full_name,
            version: (0, 0, 0, 0),
            install_path,
        });
    }
    Ok(out)
}
