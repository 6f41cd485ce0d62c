//! Filesystem + well-known-folder contract (spec §6).

use crate::error::Result;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownFolder {
    UserStartup,
    CommonStartup,
    SystemRoot,
    System32,
    UserProfile,
    AppData,
    CommonAppData,
}

#[derive(Debug, Clone)]
pub struct DirEntryInfo {
    pub file_name: String,
    pub full_path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct FileMetadata {
    pub size_bytes: Option<u64>,
    pub modified_utc: Option<DateTime<Utc>>,
    /// VERSIONINFO `CompanyName`, when the binary carries one (spec §4.1:
    /// "file-version info (company name, size, mtime)").
    pub company_name: Option<String>,
}

pub trait FileSystemAdapter: Send + Sync {
    fn known_folder(&self, folder: KnownFolder) -> Result<PathBuf>;

    /// Current user's SID string (spec §4.1: "current user SID").
    fn current_user_sid(&self) -> Result<String>;

    fn list_dir(&self, path: &std::path::Path) -> Result<Vec<DirEntryInfo>>;

    fn metadata(&self, path: &std::path::Path) -> Option<FileMetadata>;

    fn expand_env_vars(&self, raw: &str) -> String;

    fn exists(&self, path: &std::path::Path) -> bool;
}
