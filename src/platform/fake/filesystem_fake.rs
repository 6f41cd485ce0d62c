use crate::error::Result;
use crate::platform::filesystem::{DirEntryInfo, FileMetadata, FileSystemAdapter, KnownFolder};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Default)]
struct FileSystemState {
    known_folders: HashMap<KnownFolder, PathBuf>,
    env_vars: HashMap<String, String>,
    files: HashMap<PathBuf, FileMetadata>,
    dirs: HashMap<PathBuf, Vec<String>>,
    user_sid: String,
}

#[derive(Clone)]
pub struct FakeFileSystem {
    state: Arc<Mutex<FileSystemState>>,
}

impl FakeFileSystem {
    pub fn new() -> Self {
        let mut known_folders = HashMap::new();
        known_folders.insert(KnownFolder::UserStartup, PathBuf::from(r"C:\Users\test\AppData\Roaming\Microsoft\Windows\Start Menu\Programs\Startup"));
        known_folders.insert(KnownFolder::CommonStartup, PathBuf::from(r"C:\ProgramData\Microsoft\Windows\Start Menu\Programs\StartUp"));
        known_folders.insert(KnownFolder::SystemRoot, PathBuf::from(r"C:\Windows"));
        known_folders.insert(KnownFolder::System32, PathBuf::from(r"C:\Windows\System32"));
        known_folders.insert(KnownFolder::UserProfile, PathBuf::from(r"C:\Users\test"));
        known_folders.insert(KnownFolder::AppData, PathBuf::from(r"C:\Users\test\AppData\Roaming"));
        known_folders.insert(KnownFolder::CommonAppData, PathBuf::from(r"C:\ProgramData"));

        Self {
            state: Arc::new(Mutex::new(FileSystemState {
                known_folders,
                env_vars: HashMap::new(),
                files: HashMap::new(),
                dirs: HashMap::new(),
                user_sid: "S-1-5-21-1111111111-2222222222-3333333333-1001".to_string(),
            })),
        }
    }

    pub fn set_known_folder(&self, folder: KnownFolder, path: impl Into<PathBuf>) {
        self.state.lock().known_folders.insert(folder, path.into());
    }

    pub fn set_env_var(&self, name: &str, value: &str) {
        self.state.lock().env_vars.insert(name.to_string(), value.to_string());
    }

    /// Add a file entry to both its parent directory's listing and the
    /// metadata table in one call.
    pub fn add_file(&self, path: impl Into<PathBuf>, metadata: FileMetadata) {
        let path = path.into();
        let mut state = self.state.lock();
        if let Some(parent) = path.parent() {
            let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
            state.dirs.entry(parent.to_path_buf()).or_default().push(file_name);
        }
        state.files.insert(path, metadata);
    }
}

impl FileSystemAdapter for FakeFileSystem {
    fn known_folder(&self, folder: KnownFolder) -> Result<PathBuf> {
        self.state
            .lock()
            .known_folders
            .get(&folder)
            .cloned()
            .ok_or_else(|| crate::error::EngineError::Platform(format!("unknown known folder {folder:?}")))
    }

    fn current_user_sid(&self) -> Result<String> {
        Ok(self.state.lock().user_sid.clone())
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<DirEntryInfo>> {
        let state = self.state.lock();
        Ok(state
            .dirs
            .get(path)
            .map(|names| {
                names
                    .iter()
                    .map(|name| DirEntryInfo {
                        file_name: name.clone(),
                        full_path: path.join(name),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn metadata(&self, path: &Path) -> Option<FileMetadata> {
        self.state.lock().files.get(path).cloned()
    }

    fn expand_env_vars(&self, raw: &str) -> String {
        let state = self.state.lock();
        let mut out = String::with_capacity(raw.len());
        let mut chars = raw.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            let mut name = String::new();
            let mut closed = false;
            for c2 in chars.by_ref() {
                if c2 == '%' {
                    closed = true;
                    break;
                }
                name.push(c2);
            }
            if closed {
                match state.env_vars.get(&name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('%');
                        out.push_str(&name);
                        out.push('%');
                    }
                }
            } else {
                out.push('%');
                out.push_str(&name);
            }
        }
        out
    }

    fn exists(&self, path: &Path) -> bool {
        let state = self.state.lock();
        state.files.contains_key(path) || state.dirs.contains_key(path)
    }
}
