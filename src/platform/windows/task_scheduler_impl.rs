//! Task Scheduler via the COM `ITaskService` API. Spec §4.4 needs logon
//! triggers, per-task `Enabled`, folder creation, and exec-action
//! inspection — enough that the plain registry view used elsewhere isn't
//! sufficient, unlike the rest of the Run-key family.

use crate::error::{EngineError, Result};
use crate::platform::task_scheduler::{LogonTaskSpec, TaskAction, TaskInfo, TaskSchedulerAdapter};
use windows::core::{BSTR, VARIANT};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoUninitialize, CLSCTX_INPROC_SERVER, COINIT_APARTMENTTHREADED,
};
use windows::Win32::System::TaskScheduler::{
    IAction, IActionCollection, IExecAction, ILogonTrigger, IRegisteredTask, ITaskFolder,
    ITaskService, ITrigger, ITriggerCollection, TaskScheduler, TASK_ACTION_EXEC,
    TASK_CREATE_OR_UPDATE, TASK_LOGON_INTERACTIVE_TOKEN, TASK_TRIGGER_LOGON,
};

struct ComGuard {
    owns: bool,
}

impl ComGuard {
    fn enter() -> Self {
        let hr = unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) };
        ComGuard { owns: hr.is_ok() }
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        if self.owns {
            unsafe { CoUninitialize() };
        }
    }
}

pub struct WindowsTaskScheduler;

unsafe fn connect() -> Result<ITaskService> {
    let svc: ITaskService = CoCreateInstance(&TaskScheduler, None, CLSCTX_INPROC_SERVER)
        .map_err(|e| EngineError::Platform(format!("CoCreateInstance(TaskScheduler): {e}")))?;
    svc.Connect(VARIANT::default(), VARIANT::default(), VARIANT::default(), VARIANT::default())
        .map_err(|e| EngineError::Platform(format!("ITaskService::Connect: {e}")))?;
    Ok(svc)
}

unsafe fn folder_and_name(svc: &ITaskService, task_path: &str) -> Result<(ITaskFolder, String)> {
    let (folder_path, name) = task_path.rsplit_once('\\').unwrap_or(("\\", task_path));
    let folder_path = if folder_path.is_empty() { "\\" } else { folder_path };
    let folder = svc
        .GetFolder(&BSTR::from(folder_path))
        .map_err(|e| EngineError::Platform(format!("ITaskService::GetFolder {folder_path}: {e}")))?;
    Ok((folder, name.to_string()))
}

unsafe fn get_registered_task(svc: &ITaskService, task_path: &str) -> Result<IRegisteredTask> {
    let (folder, name) = folder_and_name(svc, task_path)?;
    folder
        .GetTask(&BSTR::from(name.as_str()))
        .map_err(|e| EngineError::Platform(format!("ITaskFolder::GetTask {task_path}: {e}")))
}

unsafe fn collect_task_info(task: &IRegisteredTask) -> Result<TaskInfo> {
    let path = task.Path().map_err(|e| EngineError::Platform(e.to_string()))?.to_string();
    let enabled = task.Enabled().map_err(|e| EngineError::Platform(e.to_string()))?.as_bool();
    let definition = task.Definition().map_err(|e| EngineError::Platform(e.to_string()))?;

    let triggers: ITriggerCollection = definition.Triggers().map_err(|e| EngineError::Platform(e.to_string()))?;
    let trigger_count = triggers.Count().unwrap_or(0);
    let mut has_logon_trigger = false;
    for i in 1..=trigger_count {
        if let Ok(trigger) = triggers.get_Item(i) {
            if let Ok(kind) = trigger.Type() {
                if kind == TASK_TRIGGER_LOGON {
                    has_logon_trigger = true;
                    break;
                }
            }
        }
    }

    let actions_coll: IActionCollection = definition.Actions().map_err(|e| EngineError::Platform(e.to_string()))?;
    let action_count = actions_coll.Count().unwrap_or(0);
    let mut actions = Vec::new();
    for i in 1..=action_count {
        if let Ok(action) = actions_coll.get_Item(i) {
            if let Some(exec) = exec_action(&action) {
                actions.push(exec);
            }
        }
    }

    Ok(TaskInfo {
        task_path: path,
        enabled,
        has_logon_trigger,
        actions,
    })
}

fn exec_action(action: &IAction) -> Option<TaskAction> {
    unsafe {
        if action.Type().ok()? != TASK_ACTION_EXEC {
            return None;
        }
        let exec: IExecAction = action.cast().ok()?;
        let path = exec.Path().ok()?.to_string();
        let args = exec.Arguments().ok().map(|b| b.to_string()).filter(|s| !s.is_empty());
        Some(TaskAction { path, arguments: args })
    }
}

impl TaskSchedulerAdapter for WindowsTaskScheduler {
    fn list_tasks(&self) -> Result<Vec<TaskInfo>> {
        let _com = ComGuard::enter();
        unsafe {
            let svc = connect()?;
            let mut out = Vec::new();
            walk_folder(&svc.GetFolder(&BSTR::from("\\")).map_err(|e| EngineError::Platform(e.to_string()))?, &mut out)?;
            Ok(out)
        }
    }

    fn task_exists(&self, task_path: &str) -> bool {
        let _com = ComGuard::enter();
        unsafe { connect().and_then(|svc| get_registered_task(&svc, task_path)).is_ok() }
    }

    fn set_enabled(&self, task_path: &str, enabled: bool) -> Result<()> {
        let _com = ComGuard::enter();
        unsafe {
            let svc = connect()?;
            let task = get_registered_task(&svc, task_path)?;
            task.SetEnabled(enabled)
                .map_err(|e| EngineError::Platform(format!("IRegisteredTask::SetEnabled {task_path}: {e}")))
        }
    }

    fn is_enabled(&self, task_path: &str) -> Result<bool> {
        let _com = ComGuard::enter();
        unsafe {
            let svc = connect()?;
            let task = get_registered_task(&svc, task_path)?;
            Ok(task.Enabled().map_err(|e| EngineError::Platform(e.to_string()))?.as_bool())
        }
    }

    fn register_logon_task(&self, spec: &LogonTaskSpec<'_>) -> Result<String> {
        let _com = ComGuard::enter();
        unsafe {
            let svc = connect()?;
            let root = svc.GetFolder(&BSTR::from("\\")).map_err(|e| EngineError::Platform(e.to_string()))?;
            let folder = root
                .CreateFolder(&BSTR::from(spec.folder), VARIANT::default())
                .or_else(|_| root.GetFolder(&BSTR::from(spec.folder)))
                .map_err(|e| EngineError::Platform(format!("CreateFolder/GetFolder {}: {e}", spec.folder)))?;

            let definition = svc.NewTask(0).map_err(|e| EngineError::Platform(e.to_string()))?;

            let triggers = definition.Triggers().map_err(|e| EngineError::Platform(e.to_string()))?;
            let trigger: ITrigger = triggers
                .Create(TASK_TRIGGER_LOGON)
                .map_err(|e| EngineError::Platform(e.to_string()))?;
            let logon_trigger: ILogonTrigger = trigger
                .cast()
                .map_err(|e| EngineError::Platform(format!("ILogonTrigger cast: {e}")))?;
            let delay = format!("PT{}S", spec.delay_seconds);
            logon_trigger
                .SetDelay(&BSTR::from(delay.as_str()))
                .map_err(|e| EngineError::Platform(e.to_string()))?;

            let actions = definition.Actions().map_err(|e| EngineError::Platform(e.to_string()))?;
            let action = actions
                .Create(TASK_ACTION_EXEC)
                .map_err(|e| EngineError::Platform(e.to_string()))?;
            let exec: IExecAction = action.cast().map_err(|e| EngineError::Platform(format!("IExecAction cast: {e}")))?;
            exec.SetPath(&BSTR::from(spec.command)).map_err(|e| EngineError::Platform(e.to_string()))?;
            if let Some(args) = spec.arguments {
                exec.SetArguments(&BSTR::from(args)).map_err(|e| EngineError::Platform(e.to_string()))?;
            }

            let settings = definition.Settings().map_err(|e| EngineError::Platform(e.to_string()))?;
            settings.SetStartWhenAvailable(true).map_err(|e| EngineError::Platform(e.to_string()))?;
            settings
                .SetMultipleInstances(windows::Win32::System::TaskScheduler::TASK_INSTANCES_IGNORE_NEW)
                .map_err(|e| EngineError::Platform(e.to_string()))?;
            settings
                .SetExecutionTimeLimit(&BSTR::from("PT5M"))
                .map_err(|e| EngineError::Platform(e.to_string()))?;
            settings.SetDisallowStartIfOnBatteries(false).map_err(|e| EngineError::Platform(e.to_string()))?;
            settings.SetStopIfGoingOnBatteries(false).map_err(|e| EngineError::Platform(e.to_string()))?;

            let registered: IRegisteredTask = folder
                .RegisterTaskDefinition(
                    &BSTR::from(spec.task_name),
                    &definition,
                    TASK_CREATE_OR_UPDATE.0,
                    VARIANT::default(),
                    VARIANT::default(),
                    TASK_LOGON_INTERACTIVE_TOKEN,
                    VARIANT::default(),
                )
                .map_err(|e| EngineError::Platform(format!("RegisterTaskDefinition {}: {e}", spec.task_name)))?;

            Ok(registered.Path().map_err(|e| EngineError::Platform(e.to_string()))?.to_string())
        }
    }

    fn delete_task(&self, task_path: &str) -> Result<()> {
        let _com = ComGuard::enter();
        unsafe {
            let svc = connect()?;
            let (folder, name) = folder_and_name(&svc, task_path)?;
            folder
                .DeleteTask(&BSTR::from(name.as_str()), 0)
                .map_err(|e| EngineError::Platform(format!("ITaskFolder::DeleteTask {task_path}: {e}")))
        }
    }
}

unsafe fn walk_folder(folder: &ITaskFolder, out: &mut Vec<TaskInfo>) -> Result<()> {
    let tasks = folder.GetTasks(0).map_err(|e| EngineError::Platform(e.to_string()))?;
    let count = tasks.Count().unwrap_or(0);
    for i in 1..=count {
        if let Ok(task) = tasks.get_Item(VARIANT::from(i)) {
            if let Ok(info) = collect_task_info(&task) {
                out.push(info);
            }
        }
    }

    let sub_folders = folder.GetFolders(0).map_err(|e| EngineError::Platform(e.to_string()))?;
    let sub_count = sub_folders.Count().unwrap_or(0);
    for i in 1..=sub_count {
        if let Ok(sub) = sub_folders.get_Item(VARIANT::from(i)) {
            walk_folder(&sub, out)?;
        }
    }
    Ok(())
}
