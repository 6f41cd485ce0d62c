//! Shell shortcut resolution contract (spec §6: "a shortcut resolver
//! returning `(targetPath, arguments)`"). Requires a single-threaded COM
//! apartment on the calling thread (spec §4.1, §9 "COM apartment") — the
//! real implementation documents this as the scanner worker's contract
//! rather than a global.

use crate::error::Result;

pub struct ResolvedShortcut {
    pub target_path: String,
    pub arguments: Option<String>,
}

pub trait ShortcutResolver: Send + Sync {
    fn resolve(&self, lnk_path: &std::path::Path) -> Result<ResolvedShortcut>;
}
