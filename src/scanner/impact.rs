//! Impact classification (spec §4.1 "Impact classification"), applied per
//! item before any filtering.

use crate::domain::enums::SourceKind;
use crate::domain::{Impact, UserContext};

pub fn classify_impact(
    source_kind: SourceKind,
    user_context: &UserContext,
    is_delayed: bool,
    file_size_bytes: Option<u64>,
) -> Impact {
    if source_kind.is_extended_high_impact() {
        return Impact::High;
    }

    let base = match source_kind {
        SourceKind::Service => {
            if is_delayed {
                Impact::Medium
            } else {
                Impact::High
            }
        }
        SourceKind::ScheduledTask => Impact::Medium,
        SourceKind::RunKey => {
            if user_context.is_current_user() {
                Impact::Low
            } else {
                Impact::Medium
            }
        }
        SourceKind::RunOnce | SourceKind::StartupFolder | SourceKind::PackagedTask => Impact::Low,
        _ => Impact::Unknown,
    };

    match file_size_bytes {
        Some(size) if size > 80 * 1024 * 1024 => Impact::High,
        Some(size) if size > 20 * 1024 * 1024 => base.max(Impact::Medium),
        Some(size) if size < 2 * 1024 * 1024 && base == Impact::Unknown => Impact::Low,
        _ => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machine_run_key_is_medium() {
        let impact = classify_impact(SourceKind::RunKey, &UserContext::Machine, false, Some(4096));
        assert_eq!(impact, Impact::Medium);
    }

    #[test]
    fn huge_file_always_bumps_to_high() {
        let impact = classify_impact(SourceKind::RunOnce, &UserContext::CurrentUser, false, Some(90 * 1024 * 1024));
        assert_eq!(impact, Impact::High);
    }

    #[test]
    fn extended_locations_are_always_high() {
        let impact = classify_impact(SourceKind::Winlogon, &UserContext::Machine, false, Some(512));
        assert_eq!(impact, Impact::High);
    }

    #[test]
    fn delayed_service_is_medium() {
        let impact = classify_impact(SourceKind::Service, &UserContext::Machine, true, Some(4096));
        assert_eq!(impact, Impact::Medium);
    }
}
