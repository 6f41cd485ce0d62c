//! Backup Catalog and Delay Plan Catalog (spec §4.5): two process-wide,
//! JSON-on-disk, mutex-serialized maps keyed by entry id.

pub mod backup;
pub mod delay_plan;
mod store;

pub use backup::BackupCatalog;
pub use delay_plan::DelayPlanCatalog;

/// Replace any path-invalid character in an id with `_`; an empty result
/// becomes `startup` (spec §6 "Sanitization").
pub fn sanitize_id(id: &str) -> String {
    let sanitized: String = id
        .chars()
        .map(|c| if matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|') { '_' } else { c })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "startup".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_scheme_separators() {
        assert_eq!(sanitize_id("run:HKCU Run:Notepad"), "run_HKCU Run_Notepad");
    }

    #[test]
    fn empty_result_falls_back_to_startup() {
        assert_eq!(sanitize_id(":::"), "startup");
    }
}
