//! Startup folder collector (spec §4.1 "Startup folders"): user and common
//! startup folders, `.lnk` resolved through the shell API, `.exe` used
//! directly. Shortcut resolution failures are non-fatal — skip the entry
//! and append a warning instead of failing the collector.

use super::common::approved_blob_is_enabled;
use crate::domain::enums::SourceKind;
use crate::domain::{id, item::StartupItem, options::StartupInventoryOptions, UserContext};
use crate::error::Result;
use crate::platform::filesystem::KnownFolder;
use crate::platform::registry::{Hive, RegistryView};
use crate::platform::Platform;
use crate::scanner::cancel::CancellationToken;
use crate::scanner::impact::classify_impact;

pub(crate) const APPROVED_SUB_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Explorer\StartupApproved\StartupFolder";

struct FolderLocation {
    known_folder: KnownFolder,
    hive: Hive,
    user_context: UserContext,
    tag: &'static str,
}

const LOCATIONS: &[FolderLocation] = &[
    FolderLocation {
        known_folder: KnownFolder::UserStartup,
        hive: Hive::CurrentUser,
        user_context: UserContext::CurrentUser,
        tag: "UserStartup",
    },
    FolderLocation {
        known_folder: KnownFolder::CommonStartup,
        hive: Hive::LocalMachine,
        user_context: UserContext::Machine,
        tag: "CommonStartup",
    },
];

pub fn collect(
    platform: &Platform,
    options: &StartupInventoryOptions,
    cancel: &CancellationToken,
    warnings: &mut Vec<String>,
) -> Result<Vec<StartupItem>> {
    if !options.include_startup_folders {
        return Ok(Vec::new());
    }

    let mut items = Vec::new();

    for location in LOCATIONS {
        if cancel.is_cancelled() {
            return Ok(items);
        }

        let folder = match platform.file_system.known_folder(location.known_folder) {
            Ok(path) => path,
            Err(e) => {
                warnings.push(format!("startup folder {}: {e}", location.tag));
                continue;
            }
        };

        let entries = match platform.file_system.list_dir(&folder) {
            Ok(entries) => entries,
            Err(e) => {
                warnings.push(format!("listing {}: {e}", folder.display()));
                continue;
            }
        };

        for entry in entries {
            if cancel.is_cancelled() {
                return Ok(items);
            }

            let lower = entry.file_name.to_lowercase();
            if !(lower.ends_with(".lnk") || lower.ends_with(".exe")) {
                continue;
            }

            let (target_path, arguments) = if lower.ends_with(".lnk") {
                match platform.shortcuts.resolve(&entry.full_path) {
                    Ok(resolved) => (resolved.target_path, resolved.arguments),
                    Err(e) => {
                        warnings.push(format!("resolving shortcut {}: {e}", entry.full_path.display()));
                        continue;
                    }
                }
            } else {
                (entry.full_path.to_string_lossy().into_owned(), None)
            };

            let blob = platform
                .registry
                .read_binary(location.hive, RegistryView::Native, APPROVED_SUB_KEY, &entry.file_name);
            let is_enabled = approved_blob_is_enabled(blob.as_deref());
            if !options.include_disabled && !is_enabled {
                continue;
            }

            let metadata = platform.file_system.metadata(std::path::Path::new(&target_path));
            let signature = platform.signatures.verify(&target_path);
            let impact = classify_impact(
                SourceKind::StartupFolder,
                &location.user_context,
                false,
                metadata.as_ref().and_then(|m| m.size_bytes),
            );

            items.push(StartupItem {
                id: id::startup_folder(location.tag, &entry.file_name),
                name: entry.file_name.clone(),
                source_tag: location.tag.to_string(),
                source_kind: SourceKind::StartupFolder,
                executable_path: target_path,
                arguments,
                raw_command: None,
                is_enabled,
                entry_location: entry.full_path.to_string_lossy().into_owned(),
                publisher: signature.publisher,
                signature_status: signature.status,
                impact,
                file_size_bytes: metadata.as_ref().and_then(|m| m.size_bytes),
                last_modified_utc: metadata.and_then(|m| m.modified_utc),
                user_context: location.user_context.clone(),
            });
        }
    }

    Ok(items)
}
