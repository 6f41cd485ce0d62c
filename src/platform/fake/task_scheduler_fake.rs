use crate::error::{EngineError, Result};
use crate::platform::task_scheduler::{LogonTaskSpec, TaskAction, TaskInfo, TaskSchedulerAdapter};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct TaskSchedulerState {
    tasks: HashMap<String, TaskInfo>,
}

#[derive(Clone)]
pub struct FakeTaskScheduler {
    state: Arc<Mutex<TaskSchedulerState>>,
}

impl FakeTaskScheduler {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(TaskSchedulerState::default())),
        }
    }

    pub fn seed_task(&self, info: TaskInfo) {
        self.state.lock().tasks.insert(info.task_path.clone(), info);
    }
}

impl TaskSchedulerAdapter for FakeTaskScheduler {
    fn list_tasks(&self) -> Result<Vec<TaskInfo>> {
        Ok(self.state.lock().tasks.values().cloned().collect())
    }

    fn task_exists(&self, task_path: &str) -> bool {
        self.state.lock().tasks.contains_key(task_path)
    }

    fn set_enabled(&self, task_path: &str, enabled: bool) -> Result<()> {
        self.state
            .lock()
            .tasks
            .get_mut(task_path)
            .map(|t| t.enabled = enabled)
            .ok_or_else(|| EngineError::LiveNotFound(task_path.to_string()))
    }

    fn is_enabled(&self, task_path: &str) -> Result<bool> {
        self.state
            .lock()
            .tasks
            .get(task_path)
            .map(|t| t.enabled)
            .ok_or_else(|| EngineError::LiveNotFound(task_path.to_string()))
    }

    fn register_logon_task(&self, spec: &LogonTaskSpec<'_>) -> Result<String> {
        let full_path = format!("{}\\{}", spec.folder, spec.task_name);
        self.state.lock().tasks.insert(
            full_path.clone(),
            TaskInfo {
                task_path: full_path.clone(),
                enabled: true,
                has_logon_trigger: true,
                actions: vec![TaskAction {
                    path: spec.command.to_string(),
                    arguments: spec.arguments.map(str::to_string),
                }],
            },
        );
        Ok(full_path)
    }

    fn delete_task(&self, task_path: &str) -> Result<()> {
        self.state.lock().tasks.remove(task_path);
        Ok(())
    }
}
