//! Packaged (AppX/MSIX) startup task collector (spec §4.1 "Packaged
//! startup tasks"). The manifest is parsed for `windows.startupTask`
//! extensions; live enable state comes from the `State` DWORD under
//! `HKCU\...\SystemAppData\<family>\<taskId>`.

use crate::domain::enums::SourceKind;
use crate::domain::{id, item::StartupItem, options::StartupInventoryOptions, UserContext};
use crate::error::Result;
use crate::platform::package::PackageInfo;
use crate::platform::registry::{Hive, RegistryView};
use crate::platform::Platform;
use crate::scanner::cancel::CancellationToken;
use crate::scanner::impact::classify_impact;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::collections::HashMap;

const SYSTEM_APP_DATA_KEY: &str = r"Software\Classes\Local Settings\Software\Microsoft\Windows\CurrentVersion\AppModel\SystemAppData";

struct StartupTaskDecl {
    task_id: String,
    display_name: String,
    executable: String,
    parameters: Option<String>,
    manifest_enabled_default: bool,
}

pub fn collect(
    platform: &Platform,
    options: &StartupInventoryOptions,
    cancel: &CancellationToken,
    warnings: &mut Vec<String>,
) -> Result<Vec<StartupItem>> {
    if !options.include_packaged_apps {
        return Ok(Vec::new());
    }

    let mut items = Vec::new();
    let packages = platform.packages.find_packages_for_user()?;
    let highest_per_family = pick_highest_version_per_family(packages);

    for package in highest_per_family {
        if cancel.is_cancelled() {
            return Ok(items);
        }

        let manifest_xml = match platform.packages.read_manifest(&package) {
            Ok(xml) => xml,
            Err(e) => {
                warnings.push(format!("reading manifest for {}: {e}", package.family_name));
                continue;
            }
        };

        let tasks = match parse_startup_tasks(&manifest_xml) {
            Ok(tasks) => tasks,
            Err(e) => {
                warnings.push(format!("parsing manifest for {}: {e}", package.family_name));
                continue;
            }
        };

        for task in tasks {
            if cancel.is_cancelled() {
                return Ok(items);
            }

            let state_key = format!("{SYSTEM_APP_DATA_KEY}\\{}\\{}", package.family_name, task.task_id);
            let entry_location = format!(r"HKCU\{state_key}");
            let state = platform.registry.read_dword(Hive::CurrentUser, RegistryView::Native, &state_key, "State");
            let is_enabled = match state {
                Some(value) => matches!(value, 2 | 4 | 5),
                None => task.manifest_enabled_default,
            };

            if !options.include_disabled && !is_enabled {
                continue;
            }

            let executable_path = package.install_path.join(&task.executable).to_string_lossy().into_owned();
            let metadata = platform.file_system.metadata(std::path::Path::new(&executable_path));
            let signature = platform.signatures.verify(&executable_path);
            let impact = classify_impact(
                SourceKind::PackagedTask,
                &UserContext::CurrentUser,
                false,
                metadata.as_ref().and_then(|m| m.size_bytes),
            );

            items.push(StartupItem {
                id: id::packaged_task(&package.family_name, &task.task_id),
                name: task.display_name,
                source_tag: package.family_name.clone(),
                source_kind: SourceKind::PackagedTask,
                executable_path,
                arguments: task.parameters,
                raw_command: None,
                is_enabled,
                entry_location,
                publisher: signature.publisher,
                signature_status: signature.status,
                impact,
                file_size_bytes: metadata.as_ref().and_then(|m| m.size_bytes),
                last_modified_utc: metadata.and_then(|m| m.modified_utc),
                user_context: UserContext::CurrentUser,
            });
        }
    }

    Ok(items)
}

fn pick_highest_version_per_family(packages: Vec<PackageInfo>) -> Vec<PackageInfo> {
    let mut best: HashMap<String, PackageInfo> = HashMap::new();
    for package in packages {
        best.entry(package.family_name.clone())
            .and_modify(|existing| {
                if package.version > existing.version {
                    *existing = package.clone();
                }
            })
            .or_insert(package);
    }
    best.into_values().collect()
}

/// Scan `<Extension Category="windows.startupTask">` blocks for their
/// nested `<StartupTask .../>` declaration. Tolerant of namespaced tag
/// names (`uap5:StartupTask` and similar) by matching on local name.
fn parse_startup_tasks(manifest_xml: &str) -> std::result::Result<Vec<StartupTaskDecl>, quick_xml::Error> {
    let mut reader = Reader::from_str(manifest_xml);
    reader.config_mut().trim_text(true);

    let mut tasks = Vec::new();
    let mut in_startup_extension = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => {
                let local_name = local_name(e.name().as_ref());
                if local_name == "Extension" {
                    in_startup_extension = e
                        .attributes()
                        .flatten()
                        .any(|a| local_name(a.key.as_ref()) == "Category" && a.value.as_ref() == b"windows.startupTask");
                } else if local_name == "StartupTask" && in_startup_extension {
                    let mut task_id = String::new();
                    let mut display_name = String::new();
                    let mut executable = String::new();
                    let mut parameters = None;
                    let mut enabled = true;

                    for attr in e.attributes().flatten() {
                        let value = String::from_utf8_lossy(&attr.value).into_owned();
                        match local_name(attr.key.as_ref()) {
                            "TaskId" => task_id = value,
                            "DisplayName" => display_name = value,
                            "Executable" => executable = value,
                            "Parameters" => parameters = Some(value),
                            "Enabled" => enabled = value.eq_ignore_ascii_case("true"),
                            _ => {}
                        }
                    }

                    if !task_id.is_empty() {
                        tasks.push(StartupTaskDecl {
                            display_name: if display_name.is_empty() { task_id.clone() } else { display_name },
                            task_id,
                            executable,
                            parameters,
                            manifest_enabled_default: enabled,
                        });
                    }
                }
            }
            Event::End(e) if local_name(e.name().as_ref()) == "Extension" => {
                in_startup_extension = false;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(tasks)
}

fn local_name(qualified: &[u8]) -> &str {
    let s = std::str::from_utf8(qualified).unwrap_or("");
    s.rsplit_once(':').map(|(_, local)| local).unwrap_or(s)
}
