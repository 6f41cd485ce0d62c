//! Task Scheduler contract (spec §6: "task scheduler with logon triggers,
//! per-task `Enabled` flag, folder creation, and exec-action inspection").

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct TaskAction {
    pub path: String,
    pub arguments: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub task_path: String,
    pub enabled: bool,
    pub has_logon_trigger: bool,
    pub actions: Vec<TaskAction>,
}

/// Settings for a newly registered logon-triggered task (spec §4.4:
/// `StartWhenAvailable=true`, `MultipleInstances=IgnoreNew`,
/// `ExecutionTimeLimit=5 min`, allow battery).
#[derive(Debug, Clone)]
pub struct LogonTaskSpec<'a> {
    pub folder: &'a str,
    pub task_name: &'a str,
    pub command: &'a str,
    pub arguments: Option<&'a str>,
    pub delay_seconds: u32,
}

pub trait TaskSchedulerAdapter: Send + Sync {
    /// Every registered task, used by the scheduled-tasks collector.
    fn list_tasks(&self) -> Result<Vec<TaskInfo>>;

    fn task_exists(&self, task_path: &str) -> bool;

    fn set_enabled(&self, task_path: &str, enabled: bool) -> Result<()>;

    fn is_enabled(&self, task_path: &str) -> Result<bool>;

    /// Create `spec.folder` if absent and register a logon-triggered task
    /// per `spec`. Returns the full registered task path.
    fn register_logon_task(&self, spec: &LogonTaskSpec<'_>) -> Result<String>;

    fn delete_task(&self, task_path: &str) -> Result<()>;
}
