//! `StartupApproved` orphan synthesis (spec §4.1 "StartupApproved orphans").
//! Runs after every live collector so it never masks a live item sharing an
//! id (spec §5 ordering guarantee) — the caller passes the ids already
//! produced by the live collectors in this scan.

use super::common::approved_blob_is_enabled;
use crate::domain::enums::SourceKind;
use crate::domain::{id, item::StartupItem, options::StartupInventoryOptions, UserContext};
use crate::platform::registry::{Hive, RegistryView};
use crate::platform::Platform;
use crate::scanner::cancel::CancellationToken;
use std::collections::HashSet;

const RUN_FAMILY: &[(&str, &str)] = &[
    ("Run", "Software\\Microsoft\\Windows\\CurrentVersion\\Explorer\\StartupApproved\\Run"),
    ("RunOnce", "Software\\Microsoft\\Windows\\CurrentVersion\\Explorer\\StartupApproved\\RunOnce"),
];

const HIVES: &[(Hive, &str)] = &[(Hive::CurrentUser, "HKCU"), (Hive::LocalMachine, "HKLM")];
const VIEWS: &[(RegistryView, &str)] = &[(RegistryView::Native, ""), (RegistryView::Wow64_32, " (32-bit)")];
const VIEW_KEY_SUFFIXES: &[(RegistryView, &str)] = &[(RegistryView::Native, ""), (RegistryView::Wow64_32, "32")];

const STARTUP_FOLDER_KEY: &str = "Software\\Microsoft\\Windows\\CurrentVersion\\Explorer\\StartupApproved\\StartupFolder";

pub fn collect(
    platform: &Platform,
    options: &StartupInventoryOptions,
    cancel: &CancellationToken,
    live_ids: &HashSet<String>,
    _warnings: &mut Vec<String>,
) -> crate::error::Result<Vec<StartupItem>> {
    if !options.include_startup_approved_orphans {
        return Ok(Vec::new());
    }

    let mut items = Vec::new();

    for (short_name, sub_key) in RUN_FAMILY {
        for (hive, hkey_label) in HIVES {
            for ((view, view_suffix), (_, key_suffix)) in VIEWS.iter().zip(VIEW_KEY_SUFFIXES.iter()) {
                if cancel.is_cancelled() {
                    return Ok(items);
                }

                let approved_key = format!("{sub_key}{key_suffix}");
                let tag = format!("{hkey_label} {short_name}{view_suffix}");

                for name in platform.registry.enumerate_value_names(*hive, *view, &approved_key) {
                    if cancel.is_cancelled() {
                        return Ok(items);
                    }

                    let candidate_id = id::run_key(&tag, &name);
                    if live_ids.contains(&candidate_id.to_lowercase()) {
                        continue;
                    }

                    let blob = platform.registry.read_binary(*hive, *view, &approved_key, &name);
                    let is_enabled = approved_blob_is_enabled(blob.as_deref());
                    if !options.include_disabled && !is_enabled {
                        continue;
                    }

                    items.push(orphan_item(
                        candidate_id,
                        name,
                        tag.clone(),
                        if *short_name == "RunOnce" { SourceKind::RunOnce } else { SourceKind::RunKey },
                        is_enabled,
                        format!(r"{hkey_label}\{approved_key}"),
                        if matches!(hive, Hive::CurrentUser) { UserContext::CurrentUser } else { UserContext::Machine },
                    ));
                }
            }
        }
    }

    for (hive, hkey_label, tag) in [
        (Hive::CurrentUser, "HKCU", "UserStartup"),
        (Hive::LocalMachine, "HKLM", "CommonStartup"),
    ] {
        for (_, key_suffix) in VIEW_KEY_SUFFIXES {
            if cancel.is_cancelled() {
                return Ok(items);
            }

            let approved_key = format!("{STARTUP_FOLDER_KEY}{key_suffix}");

            for file_name in platform.registry.enumerate_value_names(hive, RegistryView::Native, &approved_key) {
                if cancel.is_cancelled() {
                    return Ok(items);
                }

                let candidate_id = id::startup_folder(tag, &file_name);
                if live_ids.contains(&candidate_id.to_lowercase()) {
                    continue;
                }

                let blob = platform.registry.read_binary(hive, RegistryView::Native, &approved_key, &file_name);
                let is_enabled = approved_blob_is_enabled(blob.as_deref());
                if !options.include_disabled && !is_enabled {
                    continue;
                }

                items.push(orphan_item(
                    candidate_id,
                    file_name,
                    tag.to_string(),
                    SourceKind::StartupFolder,
                    is_enabled,
                    format!(r"{hkey_label}\{approved_key}"),
                    if matches!(hive, Hive::CurrentUser) { UserContext::CurrentUser } else { UserContext::Machine },
                ));
            }
        }
    }

    Ok(items)
}

#[allow(clippy::too_many_arguments)]
fn orphan_item(
    id: String,
    name: String,
    source_tag: String,
    source_kind: SourceKind,
    is_enabled: bool,
    entry_location: String,
    user_context: UserContext,
) -> StartupItem {
    StartupItem {
        id,
        name,
        source_tag,
        source_kind,
        executable_path: String::new(),
        arguments: None,
        raw_command: None,
        is_enabled,
        entry_location,
        publisher: None,
        signature_status: crate::domain::enums::SignatureStatus::Unknown,
        impact: crate::domain::enums::Impact::Unknown,
        file_size_bytes: None,
        last_modified_utc: None,
        user_context,
    }
}
