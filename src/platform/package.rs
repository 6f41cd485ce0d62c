//! Packaged-app (AppX/MSIX) discovery contract (spec §6: "OS package
//! manager with `FindPackagesForUser`").

use crate::error::Result;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct PackageInfo {
    pub family_name: String,
    pub full_name: String,
    pub version: (u16, u16, u16, u16),
    pub install_path: PathBuf,
}

pub trait PackageAdapter: Send + Sync {
    /// Installed packages for the current user, preferring the OS
    /// package-manager API; the registry fallback (`AppModel\Repository\Packages`)
    /// lives in the same concrete implementation, not a separate adapter,
    /// since both produce the same `PackageInfo` shape (spec §4.1).
    fn find_packages_for_user(&self) -> Result<Vec<PackageInfo>>;

    /// Raw `AppxManifest.xml` contents for a package, if present.
    fn read_manifest(&self, package: &PackageInfo) -> Result<String>;
}
