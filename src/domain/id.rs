//! Centralized `StartupItem::id` construction (spec §3, §9 "Heuristic drift").
//!
//! Every collector builds ids through these helpers instead of formatting
//! strings inline, so the scheme stays in one place and stays stable across
//! rescans. Ids are case-insensitive by construction's contract; comparisons
//! should go through [`super::item::StartupItem::same_identity`] rather than
//! `==`.

pub fn run_key(tag: &str, name: &str) -> String {
    format!("run:{tag}:{name}")
}

pub fn startup_folder(tag: &str, file_name: &str) -> String {
    format!("startup:{tag}:{file_name}")
}

pub fn scheduled_task(task_path: &str, action_index: usize) -> String {
    format!("task:{task_path}#{action_index}")
}

pub fn service(service_name: &str) -> String {
    format!("svc:{service_name}")
}

pub fn packaged_task(family_name: &str, task_id: &str) -> String {
    format!("appx:{family_name}!{task_id}")
}

pub fn winlogon(value_name: &str) -> String {
    format!("winlogon:{value_name}")
}

pub fn active_setup(clsid: &str) -> String {
    format!("activesetup:{clsid}")
}

pub fn shell_folder(name: &str) -> String {
    format!("shellfolder:{name}")
}

pub fn explorer_run(tag: &str, name: &str) -> String {
    format!("explorer:{tag}:{name}")
}

pub fn app_init_dll(path: &str, index: usize) -> String {
    format!("appinit:{path}#{index}")
}

pub fn ifeo(image: &str) -> String {
    format!("ifeo:{image}")
}

pub fn boot_execute(index: usize) -> String {
    format!("bootexec:{index}")
}

pub fn print_monitor(name: &str) -> String {
    format!("printmon:{name}")
}

pub fn lsa_package(list_name: &str, package: &str) -> String {
    format!("lsa:{list_name}:{package}")
}

pub fn bho(clsid: &str) -> String {
    format!("bho:{clsid}")
}

pub fn shell_extension(clsid: &str) -> String {
    format!("shellext:{clsid}")
}

pub fn protocol_filter(name: &str) -> String {
    format!("protocolfilter:{name}")
}

pub fn winsock_lsp(id: &str) -> String {
    format!("winsock:{id}")
}

pub fn known_dll(name: &str) -> String {
    format!("knowndll:{name}")
}

pub fn svchost_group(name: &str) -> String {
    format!("svchostgroup:{name}")
}

pub fn font_driver(name: &str) -> String {
    format!("fontdriver:{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_key_matches_spec_example() {
        assert_eq!(run_key("HKCU Run", "Notepad"), "run:HKCU Run:Notepad");
    }

    #[test]
    fn service_id_matches_spec_example() {
        assert_eq!(service("Spooler"), "svc:Spooler");
    }
}
