//! Logon scheduled task collector (spec §4.1 "Logon scheduled tasks").

use crate::domain::enums::SourceKind;
use crate::domain::{id, item::StartupItem, options::StartupInventoryOptions, UserContext};
use crate::error::Result;
use crate::platform::Platform;
use crate::scanner::cancel::CancellationToken;
use crate::scanner::impact::classify_impact;

pub fn collect(
    platform: &Platform,
    options: &StartupInventoryOptions,
    cancel: &CancellationToken,
    _warnings: &mut Vec<String>,
) -> Result<Vec<StartupItem>> {
    if !options.include_scheduled_tasks {
        return Ok(Vec::new());
    }

    let mut items = Vec::new();
    let tasks = platform.task_scheduler.list_tasks()?;

    for task in tasks {
        if cancel.is_cancelled() {
            return Ok(items);
        }
        if !task.has_logon_trigger {
            continue;
        }
        if !options.include_disabled && !task.enabled {
            continue;
        }

        for (action_index, action) in task.actions.iter().enumerate() {
            if cancel.is_cancelled() {
                return Ok(items);
            }

            let expanded_path = platform.file_system.expand_env_vars(&action.path);
            let metadata = platform.file_system.metadata(std::path::Path::new(&expanded_path));
            let signature = platform.signatures.verify(&expanded_path);
            let impact = classify_impact(
                SourceKind::ScheduledTask,
                &UserContext::Machine,
                false,
                metadata.as_ref().and_then(|m| m.size_bytes),
            );

            // Task Scheduler exposes no cheap per-task "runs as the
            // interactively logged-on user" flag without a further COM
            // round-trip; every task is treated as machine-scope, matching
            // the classifier's "machine-scope logon task" critical rule.
            items.push(StartupItem {
                id: id::scheduled_task(&task.task_path, action_index),
                name: task.task_path.rsplit('\\').next().unwrap_or(&task.task_path).to_string(),
                source_tag: task.task_path.clone(),
                source_kind: SourceKind::ScheduledTask,
                executable_path: expanded_path,
                arguments: action.arguments.clone(),
                raw_command: None,
                is_enabled: task.enabled,
                entry_location: task.task_path.clone(),
                publisher: signature.publisher,
                signature_status: signature.status,
                impact,
                file_size_bytes: metadata.as_ref().and_then(|m| m.size_bytes),
                last_modified_utc: metadata.and_then(|m| m.modified_utc),
                user_context: UserContext::Machine,
            });
        }
    }

    Ok(items)
}
