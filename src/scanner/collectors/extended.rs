//! Extended high-impact locations (spec §4.1 "Extended (high-impact)
//! locations"). These are surfaced for visibility only — none of their
//! `SourceKind`s are controllable (see `SourceKind::is_controllable`), so
//! this collector never consults `options.include_disabled` semantics the
//! way the reversible collectors do.

use super::common::parse_multi_sz;
use crate::domain::enums::SourceKind;
use crate::domain::{id, item::StartupItem, options::StartupInventoryOptions, policy, UserContext};
use crate::error::Result;
use crate::platform::registry::{Hive, RegistryView};
use crate::platform::Platform;
use crate::scanner::cancel::CancellationToken;
use crate::scanner::impact::classify_impact;

const WINLOGON_KEY: &str = r"SOFTWARE\Microsoft\Windows NT\CurrentVersion\Winlogon";
const ACTIVE_SETUP_KEY: &str = r"SOFTWARE\Microsoft\Active Setup\Installed Components";
const SHELL_FOLDERS_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Explorer\Shell Folders";
const EXPLORER_RUN_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Explorer\Run";
const WINDOWS_NT_KEY: &str = r"SOFTWARE\Microsoft\Windows NT\CurrentVersion\Windows";
const IFEO_KEY: &str = r"SOFTWARE\Microsoft\Windows NT\CurrentVersion\Image File Execution Options";
const SESSION_MANAGER_KEY: &str = r"SYSTEM\CurrentControlSet\Control\Session Manager";
const PRINT_MONITORS_KEY: &str = r"SYSTEM\CurrentControlSet\Control\Print\Monitors";
const LSA_KEY: &str = r"SYSTEM\CurrentControlSet\Control\Lsa";
const BHO_KEY: &str = r"SOFTWARE\Microsoft\Windows\CurrentVersion\Explorer\Browser Helper Objects";
const SHELL_EXTENSIONS_APPROVED_KEY: &str = r"SOFTWARE\Microsoft\Windows\CurrentVersion\Shell Extensions\Approved";
const PROTOCOL_FILTERS_KEY: &str = r"SOFTWARE\Classes\PROTOCOLS\Filter";
const WINSOCK2_PARAMETERS_KEY: &str = r"SYSTEM\CurrentControlSet\Services\WinSock2\Parameters";
const SVCHOST_KEY: &str = r"SOFTWARE\Microsoft\Windows NT\CurrentVersion\Svchost";
const FONT_DRIVERS_KEY: &str = r"SYSTEM\CurrentControlSet\Control\Print\Environments\Windows x64\Drivers\Version-3";

pub fn collect(
    platform: &Platform,
    _options: &StartupInventoryOptions,
    cancel: &CancellationToken,
    warnings: &mut Vec<String>,
) -> Result<Vec<StartupItem>> {
    let mut items = Vec::new();

    collect_winlogon(platform, &mut items);
    if cancel.is_cancelled() {
        return Ok(items);
    }
    collect_active_setup(platform, &mut items);
    if cancel.is_cancelled() {
        return Ok(items);
    }
    collect_shell_folders(platform, &mut items);
    if cancel.is_cancelled() {
        return Ok(items);
    }
    collect_explorer_run(platform, &mut items);
    if cancel.is_cancelled() {
        return Ok(items);
    }
    collect_app_init_dlls(platform, &mut items);
    if cancel.is_cancelled() {
        return Ok(items);
    }
    collect_ifeo(platform, &mut items);
    if cancel.is_cancelled() {
        return Ok(items);
    }
    collect_boot_execute(platform, &mut items);
    if cancel.is_cancelled() {
        return Ok(items);
    }
    collect_print_monitors(platform, &mut items);
    if cancel.is_cancelled() {
        return Ok(items);
    }
    collect_lsa_packages(platform, &mut items);
    if cancel.is_cancelled() {
        return Ok(items);
    }
    collect_bhos(platform, &mut items);
    if cancel.is_cancelled() {
        return Ok(items);
    }
    collect_shell_extensions(platform, &mut items);
    if cancel.is_cancelled() {
        return Ok(items);
    }
    collect_protocol_filters(platform, &mut items);
    if cancel.is_cancelled() {
        return Ok(items);
    }
    collect_winsock_lsps(platform, &mut items, warnings);
    if cancel.is_cancelled() {
        return Ok(items);
    }
    collect_known_dlls(platform, &mut items);
    if cancel.is_cancelled() {
        return Ok(items);
    }
    collect_svchost_groups(platform, &mut items);
    if cancel.is_cancelled() {
        return Ok(items);
    }
    collect_font_drivers(platform, &mut items);

    Ok(items)
}

fn make_item(
    source_kind: SourceKind,
    id: String,
    name: String,
    source_tag: &str,
    executable_path: String,
    entry_location: String,
    platform: &Platform,
) -> StartupItem {
    let metadata = platform.file_system.metadata(std::path::Path::new(&executable_path));
    let signature = platform.signatures.verify(&executable_path);
    let impact = classify_impact(source_kind, &UserContext::Machine, false, metadata.as_ref().and_then(|m| m.size_bytes));

    StartupItem {
        id,
        name,
        source_tag: source_tag.to_string(),
        source_kind,
        executable_path,
        arguments: None,
        raw_command: None,
        is_enabled: true,
        entry_location,
        publisher: signature.publisher,
        signature_status: signature.status,
        impact,
        file_size_bytes: metadata.as_ref().and_then(|m| m.size_bytes),
        last_modified_utc: metadata.and_then(|m| m.modified_utc),
        user_context: UserContext::Machine,
    }
}

fn collect_winlogon(platform: &Platform, items: &mut Vec<StartupItem>) {
    for value_name in ["Shell", "Userinit", "Taskman"] {
        let Some(raw) = platform.registry.read_string(Hive::LocalMachine, RegistryView::Native, WINLOGON_KEY, value_name) else {
            continue;
        };
        let lower = raw.to_lowercase();
        if value_name == "Shell" && lower == "explorer.exe" {
            continue;
        }
        if value_name == "Userinit" && lower.ends_with("userinit.exe") {
            continue;
        }
        if raw.trim().is_empty() {
            continue;
        }

        items.push(make_item(
            SourceKind::Winlogon,
            id::winlogon(value_name),
            value_name.to_string(),
            "Winlogon",
            raw.clone(),
            format!(r"HKLM\{WINLOGON_KEY}\{value_name}"),
            platform,
        ));
    }
}

fn collect_active_setup(platform: &Platform, items: &mut Vec<StartupItem>) {
    for clsid in platform.registry.enumerate_subkey_names(Hive::LocalMachine, RegistryView::Native, ACTIVE_SETUP_KEY) {
        let sub_key = format!("{ACTIVE_SETUP_KEY}\\{clsid}");
        let is_installed = platform.registry.read_dword(Hive::LocalMachine, RegistryView::Native, &sub_key, "IsInstalled").unwrap_or(1);
        if is_installed == 0 {
            continue;
        }
        let Some(stub_path) = platform.registry.read_string(Hive::LocalMachine, RegistryView::Native, &sub_key, "StubPath") else {
            continue;
        };
        let name = platform
            .registry
            .read_string(Hive::LocalMachine, RegistryView::Native, &sub_key, "")
            .unwrap_or_else(|| clsid.clone());

        items.push(make_item(
            SourceKind::ActiveSetup,
            id::active_setup(&clsid),
            name,
            "ActiveSetup",
            stub_path,
            format!(r"HKLM\{sub_key}"),
            platform,
        ));
    }
}

fn collect_shell_folders(platform: &Platform, items: &mut Vec<StartupItem>) {
    for (hive, hkey_label) in [(Hive::CurrentUser, "HKCU"), (Hive::LocalMachine, "HKLM")] {
        for value_name in platform.registry.enumerate_value_names(hive, RegistryView::Native, SHELL_FOLDERS_KEY) {
            if !value_name.eq_ignore_ascii_case("startup") && !value_name.eq_ignore_ascii_case("common startup") {
                continue;
            }
            let Some(path) = platform.registry.read_string(hive, RegistryView::Native, SHELL_FOLDERS_KEY, &value_name) else {
                continue;
            };
            let default_user = platform.file_system.known_folder(crate::platform::filesystem::KnownFolder::UserStartup).ok();
            let default_common = platform.file_system.known_folder(crate::platform::filesystem::KnownFolder::CommonStartup).ok();
            let is_default = default_user.as_ref().map(|p| p.to_string_lossy().eq_ignore_ascii_case(&path)).unwrap_or(false)
                || default_common.as_ref().map(|p| p.to_string_lossy().eq_ignore_ascii_case(&path)).unwrap_or(false);
            if is_default {
                continue;
            }

            items.push(make_item(
                SourceKind::ShellFolder,
                id::shell_folder(&value_name),
                value_name.clone(),
                "ShellFolder",
                path,
                format!(r"{hkey_label}\{SHELL_FOLDERS_KEY}\{value_name}"),
                platform,
            ));
        }
    }
}

fn collect_explorer_run(platform: &Platform, items: &mut Vec<StartupItem>) {
    for (hive, hkey_label) in [(Hive::CurrentUser, "HKCU"), (Hive::LocalMachine, "HKLM")] {
        let tag = format!("{hkey_label} Explorer Run");
        for name in platform.registry.enumerate_value_names(hive, RegistryView::Native, EXPLORER_RUN_KEY) {
            let Some(raw) = platform.registry.read_string(hive, RegistryView::Native, EXPLORER_RUN_KEY, &name) else {
                continue;
            };

            items.push(make_item(
                SourceKind::ExplorerRun,
                id::explorer_run(&tag, &name),
                name.clone(),
                &tag,
                raw,
                format!(r"{hkey_label}\{EXPLORER_RUN_KEY}"),
                platform,
            ));
        }
    }
}

fn collect_app_init_dlls(platform: &Platform, items: &mut Vec<StartupItem>) {
    let load_enabled = platform.registry.read_dword(Hive::LocalMachine, RegistryView::Native, WINDOWS_NT_KEY, "LoadAppInit_DLLs").unwrap_or(0);
    if load_enabled != 1 {
        return;
    }
    let Some(raw) = platform.registry.read_string(Hive::LocalMachine, RegistryView::Native, WINDOWS_NT_KEY, "AppInit_DLLs") else {
        return;
    };

    for (index, path) in raw.split([' ', ',']).filter(|s| !s.is_empty()).enumerate() {
        items.push(make_item(
            SourceKind::AppInitDll,
            id::app_init_dll(path, index),
            path.to_string(),
            "AppInitDll",
            path.to_string(),
            format!(r"HKLM\{WINDOWS_NT_KEY}\AppInit_DLLs"),
            platform,
        ));
    }
}

fn collect_ifeo(platform: &Platform, items: &mut Vec<StartupItem>) {
    for image in platform.registry.enumerate_subkey_names(Hive::LocalMachine, RegistryView::Native, IFEO_KEY) {
        let sub_key = format!("{IFEO_KEY}\\{image}");
        let Some(debugger) = platform.registry.read_string(Hive::LocalMachine, RegistryView::Native, &sub_key, "Debugger") else {
            continue;
        };

        items.push(make_item(
            SourceKind::ImageFileExecutionOptions,
            id::ifeo(&image),
            image.clone(),
            "ImageFileExecutionOptions",
            debugger,
            format!(r"HKLM\{sub_key}"),
            platform,
        ));
    }
}

fn collect_boot_execute(platform: &Platform, items: &mut Vec<StartupItem>) {
    let Some(raw) = platform.registry.read_binary(Hive::LocalMachine, RegistryView::Native, SESSION_MANAGER_KEY, "BootExecute") else {
        return;
    };

    for (index, entry) in parse_multi_sz(&raw).into_iter().enumerate() {
        if entry.trim().starts_with("autocheck autochk") {
            continue;
        }

        items.push(make_item(
            SourceKind::BootExecute,
            id::boot_execute(index),
            entry.clone(),
            "BootExecute",
            entry,
            format!(r"HKLM\{SESSION_MANAGER_KEY}\BootExecute"),
            platform,
        ));
    }
}

fn collect_print_monitors(platform: &Platform, items: &mut Vec<StartupItem>) {
    for name in platform.registry.enumerate_subkey_names(Hive::LocalMachine, RegistryView::Native, PRINT_MONITORS_KEY) {
        if policy::is_known_print_monitor(&name) {
            continue;
        }
        let sub_key = format!("{PRINT_MONITORS_KEY}\\{name}");
        let driver = platform.registry.read_string(Hive::LocalMachine, RegistryView::Native, &sub_key, "Driver").unwrap_or_default();

        items.push(make_item(
            SourceKind::PrintMonitor,
            id::print_monitor(&name),
            name.clone(),
            "PrintMonitor",
            driver,
            format!(r"HKLM\{sub_key}"),
            platform,
        ));
    }
}

fn collect_lsa_packages(platform: &Platform, items: &mut Vec<StartupItem>) {
    for list_name in ["Security Packages", "Notification Packages", "Authentication Packages"] {
        let Some(raw) = platform.registry.read_binary(Hive::LocalMachine, RegistryView::Native, LSA_KEY, list_name) else {
            continue;
        };

        for package in parse_multi_sz(&raw) {
            if policy::is_known_lsa_package(&package) {
                continue;
            }

            items.push(make_item(
                SourceKind::LsaPackage,
                id::lsa_package(list_name, &package),
                package.clone(),
                list_name,
                package,
                format!(r"HKLM\{LSA_KEY}\{list_name}"),
                platform,
            ));
        }
    }
}

fn collect_bhos(platform: &Platform, items: &mut Vec<StartupItem>) {
    for clsid in platform.registry.enumerate_subkey_names(Hive::LocalMachine, RegistryView::Native, BHO_KEY) {
        items.push(make_item(
            SourceKind::Bho,
            id::bho(&clsid),
            clsid.clone(),
            "Bho",
            String::new(),
            format!(r"HKLM\{BHO_KEY}\{clsid}"),
            platform,
        ));
    }
}

fn collect_shell_extensions(platform: &Platform, items: &mut Vec<StartupItem>) {
    for clsid in platform.registry.enumerate_value_names(Hive::LocalMachine, RegistryView::Native, SHELL_EXTENSIONS_APPROVED_KEY) {
        let name = platform
            .registry
            .read_string(Hive::LocalMachine, RegistryView::Native, SHELL_EXTENSIONS_APPROVED_KEY, &clsid)
            .unwrap_or_else(|| clsid.clone());
        if policy::is_microsoft_publisher(&name) {
            continue;
        }

        items.push(make_item(
            SourceKind::ShellExtension,
            id::shell_extension(&clsid),
            name,
            "ShellExtension",
            String::new(),
            format!(r"HKLM\{SHELL_EXTENSIONS_APPROVED_KEY}\{clsid}"),
            platform,
        ));
    }
}

fn collect_protocol_filters(platform: &Platform, items: &mut Vec<StartupItem>) {
    for name in platform.registry.enumerate_subkey_names(Hive::LocalMachine, RegistryView::Native, PROTOCOL_FILTERS_KEY) {
        items.push(make_item(
            SourceKind::ProtocolFilter,
            id::protocol_filter(&name),
            name.clone(),
            "ProtocolFilter",
            String::new(),
            format!(r"HKLM\{PROTOCOL_FILTERS_KEY}\{name}"),
            platform,
        ));
    }
}

fn collect_winsock_lsps(platform: &Platform, items: &mut Vec<StartupItem>, warnings: &mut Vec<String>) {
    for catalog in ["Catalog9", "Catalog9_64"] {
        let catalog_key = format!("{WINSOCK2_PARAMETERS_KEY}\\{catalog}");
        for entry_name in platform.registry.enumerate_subkey_names(Hive::LocalMachine, RegistryView::Native, &catalog_key) {
            let sub_key = format!("{catalog_key}\\{entry_name}");
            let Some(path) = platform.registry.read_string(Hive::LocalMachine, RegistryView::Native, &sub_key, "PackedCatalogItem") else {
                continue;
            };
            if policy::is_microsoft_publisher(&path) {
                continue;
            }

            let id = id::winsock_lsp(&format!("{catalog}:{entry_name}"));
            items.push(make_item(SourceKind::WinsockLsp, id, entry_name.clone(), catalog, path, format!(r"HKLM\{sub_key}"), platform));
        }
        if !platform.registry.subkey_exists(Hive::LocalMachine, RegistryView::Native, &catalog_key) {
            warnings.push(format!("winsock catalog {catalog} not present"));
        }
    }
}

fn collect_known_dlls(platform: &Platform, items: &mut Vec<StartupItem>) {
    const KNOWN_DLLS_KEY: &str = r"SYSTEM\CurrentControlSet\Control\Session Manager\KnownDLLs";
    for name in platform.registry.enumerate_value_names(Hive::LocalMachine, RegistryView::Native, KNOWN_DLLS_KEY) {
        if name.is_empty() {
            continue;
        }
        let Some(dll) = platform.registry.read_string(Hive::LocalMachine, RegistryView::Native, KNOWN_DLLS_KEY, &name) else {
            continue;
        };
        if policy::is_known_safe_dll(&dll) || policy::is_microsoft_publisher(&dll) {
            continue;
        }

        items.push(make_item(
            SourceKind::KnownDll,
            id::known_dll(&name),
            dll.clone(),
            "KnownDll",
            dll,
            format!(r"HKLM\{KNOWN_DLLS_KEY}\{name}"),
            platform,
        ));
    }
}

fn collect_svchost_groups(platform: &Platform, items: &mut Vec<StartupItem>) {
    for name in platform.registry.enumerate_value_names(Hive::LocalMachine, RegistryView::Native, SVCHOST_KEY) {
        if policy::is_known_svchost_group(&name) {
            continue;
        }

        items.push(make_item(
            SourceKind::SvcHostGroup,
            id::svchost_group(&name),
            name.clone(),
            "SvcHostGroup",
            String::new(),
            format!(r"HKLM\{SVCHOST_KEY}\{name}"),
            platform,
        ));
    }
}

fn collect_font_drivers(platform: &Platform, items: &mut Vec<StartupItem>) {
    for name in platform.registry.enumerate_value_names(Hive::LocalMachine, RegistryView::Native, FONT_DRIVERS_KEY) {
        let driver = platform.registry.read_string(Hive::LocalMachine, RegistryView::Native, FONT_DRIVERS_KEY, &name).unwrap_or_default();
        if policy::is_microsoft_publisher(&driver) {
            continue;
        }

        items.push(make_item(
            SourceKind::FontDriver,
            id::font_driver(&name),
            name.clone(),
            "FontDriver",
            driver,
            format!(r"HKLM\{FONT_DRIVERS_KEY}\{name}"),
            platform,
        ));
    }
}
