//! Shared enums for the entry model (spec §3).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which autorun mechanism produced a `StartupItem`.
///
/// The five kinds in the left column of spec §4.3's mutation table
/// (`RunKey`, `RunOnce`, `StartupFolder`, `ScheduledTask`, `Service`,
/// `PackagedTask`) are reversibly controllable; everything else is
/// surfaced for visibility only and the Control Service refuses to
/// mutate it (`EngineError::UnsupportedSource`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    RunKey,
    RunOnce,
    StartupFolder,
    ScheduledTask,
    Service,
    PackagedTask,
    Winlogon,
    ActiveSetup,
    ShellFolder,
    ExplorerRun,
    AppInitDll,
    ImageFileExecutionOptions,
    BootExecute,
    PrintMonitor,
    LsaPackage,
    Bho,
    ShellExtension,
    ProtocolFilter,
    WinsockLsp,
    KnownDll,
    SvcHostGroup,
    FontDriver,
}

impl SourceKind {
    /// Kinds the Control Service can reversibly disable/enable (spec §4.3).
    pub fn is_controllable(self) -> bool {
        matches!(
            self,
            SourceKind::RunKey
                | SourceKind::RunOnce
                | SourceKind::StartupFolder
                | SourceKind::ScheduledTask
                | SourceKind::Service
                | SourceKind::PackagedTask
        )
    }

    /// Extended high-impact locations that default to `Impact::High`
    /// regardless of file size (spec §4.1 impact classification).
    pub fn is_extended_high_impact(self) -> bool {
        matches!(
            self,
            SourceKind::Winlogon
                | SourceKind::BootExecute
                | SourceKind::AppInitDll
                | SourceKind::ImageFileExecutionOptions
                | SourceKind::LsaPackage
                | SourceKind::WinsockLsp
                | SourceKind::KnownDll
                | SourceKind::FontDriver
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::RunKey => "RunKey",
            SourceKind::RunOnce => "RunOnce",
            SourceKind::StartupFolder => "StartupFolder",
            SourceKind::ScheduledTask => "ScheduledTask",
            SourceKind::Service => "Service",
            SourceKind::PackagedTask => "PackagedTask",
            SourceKind::Winlogon => "Winlogon",
            SourceKind::ActiveSetup => "ActiveSetup",
            SourceKind::ShellFolder => "ShellFolder",
            SourceKind::ExplorerRun => "ExplorerRun",
            SourceKind::AppInitDll => "AppInitDll",
            SourceKind::ImageFileExecutionOptions => "ImageFileExecutionOptions",
            SourceKind::BootExecute => "BootExecute",
            SourceKind::PrintMonitor => "PrintMonitor",
            SourceKind::LsaPackage => "LsaPackage",
            SourceKind::Bho => "Bho",
            SourceKind::ShellExtension => "ShellExtension",
            SourceKind::ProtocolFilter => "ProtocolFilter",
            SourceKind::WinsockLsp => "WinsockLsp",
            SourceKind::KnownDll => "KnownDll",
            SourceKind::SvcHostGroup => "SvcHostGroup",
            SourceKind::FontDriver => "FontDriver",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureStatus {
    Unknown,
    Unsigned,
    Signed,
    SignedTrusted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Impact {
    Unknown,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserContext {
    CurrentUser,
    Machine,
    Principal(String),
}

impl UserContext {
    pub fn is_current_user(&self) -> bool {
        matches!(self, UserContext::CurrentUser)
    }
}
