//! Registry Run family collector (spec §4.1 "Registry Run family"):
//! `Run`, `RunOnce`, `RunServices`, `RunServicesOnce`, and
//! `Policies\Explorer\Run`, under both hives and both registry views.

use super::common::{approved_blob_is_enabled, parse_command_line};
use crate::domain::enums::SourceKind;
use crate::domain::{id, item::StartupItem, options::StartupInventoryOptions, UserContext};
use crate::error::Result;
use crate::platform::registry::{Hive, RegistryView};
use crate::platform::Platform;
use crate::scanner::cancel::CancellationToken;
use crate::scanner::impact::classify_impact;

/// `pub(crate)` so the Control Service can re-derive a location's `sub_key`
/// and `approved_companion` from a `StartupItem`'s `source_tag` without
/// duplicating this table.
pub(crate) struct RunLocation {
    pub(crate) short_name: &'static str,
    pub(crate) sub_key: &'static str,
    pub(crate) approved_companion: Option<&'static str>,
    pub(crate) is_run_once: bool,
}

pub(crate) const LOCATIONS: &[RunLocation] = &[
    RunLocation {
        short_name: "Run",
        sub_key: r"Software\Microsoft\Windows\CurrentVersion\Run",
        approved_companion: Some("Run"),
        is_run_once: false,
    },
    RunLocation {
        short_name: "RunOnce",
        sub_key: r"Software\Microsoft\Windows\CurrentVersion\RunOnce",
        approved_companion: Some("RunOnce"),
        is_run_once: true,
    },
    RunLocation {
        short_name: "RunServices",
        sub_key: r"Software\Microsoft\Windows\CurrentVersion\RunServices",
        approved_companion: None,
        is_run_once: false,
    },
    RunLocation {
        short_name: "RunServicesOnce",
        sub_key: r"Software\Microsoft\Windows\CurrentVersion\RunServicesOnce",
        approved_companion: None,
        is_run_once: true,
    },
    RunLocation {
        short_name: "Policies Run",
        sub_key: r"Software\Microsoft\Windows\CurrentVersion\Policies\Explorer\Run",
        approved_companion: None,
        is_run_once: false,
    },
];

const HIVES: &[(Hive, UserContext)] = &[(Hive::CurrentUser, UserContext::CurrentUser), (Hive::LocalMachine, UserContext::Machine)];
const VIEWS: &[(RegistryView, &str)] = &[(RegistryView::Native, ""), (RegistryView::Wow64_32, " (32-bit)")];

/// Companion `StartupApproved` subkey name for a location, view-qualified
/// (spec §4.1: the 32-bit view's approved key is suffixed `"32"`).
pub(crate) fn approved_key_for(location: &RunLocation, view: RegistryView) -> Option<String> {
    location.approved_companion.map(|companion| {
        format!(
            "Software\\Microsoft\\Windows\\CurrentVersion\\Explorer\\StartupApproved\\{companion}{}",
            if matches!(view, RegistryView::Wow64_32) { "32" } else { "" }
        )
    })
}

pub(crate) fn find_location(short_name: &str) -> Option<&'static RunLocation> {
    LOCATIONS.iter().find(|l| l.short_name == short_name)
}

pub fn collect(
    platform: &Platform,
    options: &StartupInventoryOptions,
    cancel: &CancellationToken,
    _warnings: &mut Vec<String>,
) -> Result<Vec<StartupItem>> {
    let mut items = Vec::new();

    for location in LOCATIONS {
        if location.is_run_once && !options.include_run_once {
            continue;
        }
        if !location.is_run_once && !options.include_run_keys {
            continue;
        }

        for (hive, user_context) in HIVES {
            for (view, view_suffix) in VIEWS {
                if cancel.is_cancelled() {
                    return Ok(items);
                }

                let tag = format!("{} {}{}", hive.label(), location.short_name, view_suffix);
                let value_names = platform.registry.enumerate_value_names(*hive, *view, location.sub_key);

                for name in value_names {
                    if cancel.is_cancelled() {
                        return Ok(items);
                    }

                    let Some(raw) = platform.registry.read_string(*hive, *view, location.sub_key, &name) else {
                        continue;
                    };
                    let (exe, args) = parse_command_line(&raw);

                    let is_enabled = match approved_key_for(location, *view) {
                        Some(approved_key) => {
                            let blob = platform.registry.read_binary(*hive, *view, &approved_key, &name);
                            approved_blob_is_enabled(blob.as_deref())
                        }
                        None => true,
                    };

                    if !options.include_disabled && !is_enabled {
                        continue;
                    }

                    let metadata = platform.file_system.metadata(std::path::Path::new(&exe));
                    let signature = platform.signatures.verify(&exe);
                    let source_kind = if location.is_run_once { SourceKind::RunOnce } else { SourceKind::RunKey };
                    let impact = classify_impact(source_kind, user_context, false, metadata.as_ref().and_then(|m| m.size_bytes));

                    items.push(StartupItem {
                        id: id::run_key(&tag, &name),
                        name: name.clone(),
                        source_tag: tag.clone(),
                        source_kind,
                        executable_path: exe,
                        arguments: args,
                        raw_command: Some(raw),
                        is_enabled,
                        entry_location: format!(r"{}\{}", hive.label(), location.sub_key),
                        publisher: signature.publisher,
                        signature_status: signature.status,
                        impact,
                        file_size_bytes: metadata.as_ref().and_then(|m| m.size_bytes),
                        last_modified_utc: metadata.and_then(|m| m.modified_utc),
                        user_context: user_context.clone(),
                    });
                }
            }
        }
    }

    Ok(items)
}
