use crate::error::{EngineError, Result};
use crate::platform::shortcut::{ResolvedShortcut, ShortcutResolver};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone)]
pub struct FakeShortcutResolver {
    targets: Arc<Mutex<HashMap<PathBuf, (String, Option<String>)>>>,
}

impl FakeShortcutResolver {
    pub fn new() -> Self {
        Self {
            targets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn seed(&self, lnk_path: impl Into<PathBuf>, target_path: &str, arguments: Option<&str>) {
        self.targets
            .lock()
            .insert(lnk_path.into(), (target_path.to_string(), arguments.map(str::to_string)));
    }
}

impl ShortcutResolver for FakeShortcutResolver {
    fn resolve(&self, lnk_path: &Path) -> Result<ResolvedShortcut> {
        self.targets
            .lock()
            .get(lnk_path)
            .map(|(target_path, arguments)| ResolvedShortcut {
                target_path: target_path.clone(),
                arguments: arguments.clone(),
            })
            .ok_or_else(|| EngineError::InvalidEntry(format!("no fake shortcut seeded for {}", lnk_path.display())))
    }
}
