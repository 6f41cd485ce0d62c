use crate::error::{EngineError, Result};
use crate::platform::package::{PackageAdapter, PackageInfo};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct FakePackageAdapter {
    packages: Arc<Mutex<Vec<PackageInfo>>>,
    manifests: Arc<Mutex<HashMap<String, String>>>,
}

impl FakePackageAdapter {
    pub fn new() -> Self {
        Self {
            packages: Arc::new(Mutex::new(Vec::new())),
            manifests: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn seed_package(&self, package: PackageInfo, manifest_xml: &str) {
        self.manifests.lock().insert(package.full_name.clone(), manifest_xml.to_string());
        self.packages.lock().push(package);
    }
}

impl PackageAdapter for FakePackageAdapter {
    fn find_packages_for_user(&self) -> Result<Vec<PackageInfo>> {
        Ok(self.packages.lock().clone())
    }

    fn read_manifest(&self, package: &PackageInfo) -> Result<String> {
        self.manifests
            .lock()
            .get(&package.full_name)
            .cloned()
            .ok_or_else(|| EngineError::LiveNotFound(format!("manifest for {}", package.full_name)))
    }
}
