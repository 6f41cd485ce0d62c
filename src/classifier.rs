//! Safety Classifier (spec §4.2): a pure function over a [`StartupItem`]
//! with a short-TTL memoization layer in front of it, grounded on the
//! `tracing`-instrumented, small-surface services the teacher crate used
//! for its own pure checks.

use crate::domain::{enums::SourceKind, policy, Impact, SignatureStatus, StartupItem, UserContext};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// `classify`'s result (spec §4.2 contract: `{isSystemCritical, isSafeToDisable}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationResult {
    pub is_system_critical: bool,
    pub is_safe_to_disable: bool,
}

const MEMO_TTL: Duration = Duration::from_secs(5 * 60);

struct MemoEntry {
    result: ClassificationResult,
    expires_at: Instant,
}

/// Memoizes [`classify`] by item id for [`MEMO_TTL`]. Held by the caller
/// (not a global) so tests get independent cache lifetimes.
pub struct Classifier {
    memo: Mutex<HashMap<String, MemoEntry>>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    pub fn new() -> Self {
        Self {
            memo: Mutex::new(HashMap::new()),
        }
    }

    pub fn classify(&self, item: &StartupItem) -> ClassificationResult {
        let key = item.id.to_lowercase();
        let now = Instant::now();

        if let Some(entry) = self.memo.lock().get(&key) {
            if entry.expires_at > now {
                return entry.result;
            }
        }

        let result = classify_pure(item);
        self.memo.lock().insert(
            key,
            MemoEntry {
                result,
                expires_at: now + MEMO_TTL,
            },
        );
        result
    }

    pub fn is_system_critical(&self, item: &StartupItem) -> bool {
        self.classify(item).is_system_critical
    }

    pub fn is_safe_to_disable(&self, item: &StartupItem) -> bool {
        self.classify(item).is_safe_to_disable
    }
}

/// Spec §4.2 critical rules, evaluated in the order the spec lists them.
fn is_system_critical(item: &StartupItem) -> bool {
    if matches!(
        item.source_kind,
        SourceKind::Winlogon | SourceKind::BootExecute | SourceKind::AppInitDll | SourceKind::ImageFileExecutionOptions
    ) {
        return true;
    }

    let path_lower = item.executable_path.to_lowercase();
    if !path_lower.is_empty() && under_windows_directory(&path_lower) {
        return true;
    }
    if policy::is_under_critical_program_dir(&item.executable_path) {
        return true;
    }

    let is_machine = !item.user_context.is_current_user();
    if is_machine && item.source_kind == SourceKind::Service {
        let publisher_hits = item
            .publisher
            .as_deref()
            .map(|p| policy::is_microsoft_publisher(p) || policy::is_known_driver_vendor(p))
            .unwrap_or(false);
        if publisher_hits || policy::has_security_marker(&item.executable_path) {
            return true;
        }
    }

    if is_machine
        && item.source_kind == SourceKind::ScheduledTask
        && item
            .publisher
            .as_deref()
            .map(policy::is_microsoft_publisher)
            .unwrap_or(false)
        && under_windows_directory(&path_lower)
    {
        return true;
    }

    false
}

fn under_windows_directory(path_lower: &str) -> bool {
    path_lower.starts_with(r"c:\windows") || path_lower.starts_with(r"%windir%") || path_lower.starts_with(r"%systemroot%")
}

fn is_unc_or_system_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    lower.starts_with(r"\\") || under_windows_directory(&lower)
}

/// Spec §4.2 safe-to-disable rules: all must hold, and critical always wins.
fn classify_pure(item: &StartupItem) -> ClassificationResult {
    let critical = is_system_critical(item);
    if critical {
        return ClassificationResult {
            is_system_critical: true,
            is_safe_to_disable: false,
        };
    }

    let safe = item.user_context.is_current_user()
        && matches!(item.source_kind, SourceKind::RunKey | SourceKind::RunOnce | SourceKind::StartupFolder)
        && item.signature_status == SignatureStatus::SignedTrusted
        && item.impact != Impact::High
        && !is_unc_or_system_path(&item.executable_path);

    ClassificationResult {
        is_system_critical: false,
        is_safe_to_disable: safe,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id;
    use chrono::Utc;

    fn base_item(source_kind: SourceKind) -> StartupItem {
        StartupItem {
            id: id::run_key("HKCU Run", "Test"),
            name: "Test".into(),
            source_tag: "HKCU Run".into(),
            source_kind,
            executable_path: r"C:\Users\test\AppData\Local\Test\test.exe".into(),
            arguments: None,
            raw_command: None,
            is_enabled: true,
            entry_location: r"HKCU\Software\Microsoft\Windows\CurrentVersion\Run".into(),
            publisher: Some("Acme Corp".into()),
            signature_status: SignatureStatus::SignedTrusted,
            impact: Impact::Low,
            file_size_bytes: Some(1024),
            last_modified_utc: Some(Utc::now()),
            user_context: UserContext::CurrentUser,
        }
    }

    #[test]
    fn safe_run_key_is_safe_to_disable() {
        let classifier = Classifier::new();
        let item = base_item(SourceKind::RunKey);
        let result = classifier.classify(&item);
        assert!(!result.is_system_critical);
        assert!(result.is_safe_to_disable);
    }

    #[test]
    fn defender_service_is_critical_and_never_safe() {
        let classifier = Classifier::new();
        let mut item = base_item(SourceKind::Service);
        item.user_context = UserContext::Machine;
        item.publisher = Some("Microsoft Corporation".into());
        item.executable_path = r"C:\Program Files\Windows Defender\MsMpEng.exe".into();
        item.id = id::service("WinDefend");

        let result = classifier.classify(&item);
        assert!(result.is_system_critical);
        assert!(!result.is_safe_to_disable);
    }

    #[test]
    fn unsigned_entry_is_not_safe_to_disable() {
        let classifier = Classifier::new();
        let mut item = base_item(SourceKind::RunKey);
        item.signature_status = SignatureStatus::Unsigned;
        assert!(!classifier.classify(&item).is_safe_to_disable);
    }

    #[test]
    fn winlogon_shell_is_always_critical() {
        let classifier = Classifier::new();
        let item = base_item(SourceKind::Winlogon);
        assert!(classifier.is_system_critical(&item));
    }

    #[test]
    fn memoized_result_is_stable_within_ttl() {
        let classifier = Classifier::new();
        let item = base_item(SourceKind::RunKey);
        let first = classifier.classify(&item);
        let second = classifier.classify(&item);
        assert_eq!(first, second);
    }
}
