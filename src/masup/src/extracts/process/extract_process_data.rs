use mockall::automock;
use std::path::PathBuf;
use sysinfo::{Pid, ProcessStatus};

/// What one tick sees of a single running process.
///
/// `executable_path` is `None` and `arguments` is empty when the host refused to
/// reveal them (insufficient privilege, zombie process).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessObservation {
    pub pid: u32,
    pub name: String,
    pub executable_path: Option<String>,
    /// Command line without the program itself.
    pub arguments: Vec<String>,
}

impl ProcessObservation {
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_executable(mut self, path: impl Into<String>) -> Self {
        self.executable_path = Some(path.into());
        self
    }

    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }
}

// Create a trait that wraps the Process methods we need
#[automock]
pub trait ProcessTrait {
    fn pid(&self) -> Pid;
    fn name(&self) -> String;
    fn exe(&self) -> Option<PathBuf>;
    fn cmd(&self) -> Vec<String>;
    fn status(&self) -> ProcessStatus;
}

// Implement the trait for the real Process
impl ProcessTrait for sysinfo::Process {
    fn pid(&self) -> Pid {
        self.pid()
    }

    fn name(&self) -> String {
        self.name().to_string()
    }

    fn exe(&self) -> Option<PathBuf> {
        self.exe().map(|p| p.to_path_buf())
    }

    fn cmd(&self) -> Vec<String> {
        self.cmd().to_vec()
    }

    fn status(&self) -> ProcessStatus {
        self.status()
    }
}

/// Best-effort extraction of a process' identity and provenance.
pub fn observe_process<P: ProcessTrait>(proc: &P) -> ProcessObservation {
    let pid = proc.pid().as_u32();
    let name = proc.name();

    if proc.status() == ProcessStatus::Zombie {
        return ProcessObservation::new(pid, name);
    }

    let executable_path = proc
        .exe()
        .map(|path| path.to_string_lossy().to_string())
        .filter(|path| !path.is_empty());
    let arguments = proc.cmd().into_iter().skip(1).collect();

    ProcessObservation {
        pid,
        name,
        executable_path,
        arguments,
    }
}
