//! Autostart services collector (spec §4.1 "Autostart services"). Services
//! are addressed entirely through the registry — `Start`/`DelayedAutoStart`
//! under `HKLM\SYSTEM\CurrentControlSet\Services\<name>` — rather than a
//! Service Control Manager handle, matching the Control Service's own
//! registry-only mutation protocol (spec §4.3).

use super::common::parse_command_line;
use crate::domain::enums::SourceKind;
use crate::domain::{id, item::StartupItem, options::StartupInventoryOptions, UserContext};
use crate::error::Result;
use crate::platform::registry::{Hive, RegistryView};
use crate::platform::Platform;
use crate::scanner::cancel::CancellationToken;
use crate::scanner::impact::classify_impact;

const SERVICES_KEY: &str = r"SYSTEM\CurrentControlSet\Services";

pub fn collect(
    platform: &Platform,
    options: &StartupInventoryOptions,
    cancel: &CancellationToken,
    _warnings: &mut Vec<String>,
) -> Result<Vec<StartupItem>> {
    if !options.include_services {
        return Ok(Vec::new());
    }

    let mut items = Vec::new();

    for service_name in platform.registry.enumerate_subkey_names(Hive::LocalMachine, RegistryView::Native, SERVICES_KEY) {
        if cancel.is_cancelled() {
            return Ok(items);
        }

        let sub_key = format!("{SERVICES_KEY}\\{service_name}");
        let Some(start) = platform.registry.read_dword(Hive::LocalMachine, RegistryView::Native, &sub_key, "Start") else {
            continue;
        };
        if start != 2 {
            continue;
        }

        let delayed = platform
            .registry
            .read_dword(Hive::LocalMachine, RegistryView::Native, &sub_key, "DelayedAutoStart")
            .unwrap_or(0)
            == 1;

        let display_name = platform
            .registry
            .read_string(Hive::LocalMachine, RegistryView::Native, &sub_key, "DisplayName")
            .unwrap_or_else(|| service_name.clone());

        let image_path = platform
            .registry
            .read_string(Hive::LocalMachine, RegistryView::Native, &sub_key, "ImagePath")
            .unwrap_or_default();
        let (exe, args) = parse_command_line(&image_path);

        let metadata = platform.file_system.metadata(std::path::Path::new(&exe));
        let signature = platform.signatures.verify(&exe);
        let impact = classify_impact(SourceKind::Service, &UserContext::Machine, delayed, metadata.as_ref().and_then(|m| m.size_bytes));

        items.push(StartupItem {
            id: id::service(&service_name),
            name: display_name,
            source_tag: "Services".to_string(),
            source_kind: SourceKind::Service,
            executable_path: exe,
            arguments: args,
            raw_command: Some(image_path),
            is_enabled: true,
            entry_location: format!(r"HKLM\{sub_key}"),
            publisher: signature.publisher,
            signature_status: signature.status,
            impact,
            file_size_bytes: metadata.as_ref().and_then(|m| m.size_bytes),
            last_modified_utc: metadata.and_then(|m| m.modified_utc),
            user_context: UserContext::Machine,
        });
    }

    Ok(items)
}
