use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_COLS: u16 = 80;
pub const DEFAULT_ROWS: u16 = 25;

/// Sequence value meaning "no terminal"; the first terminal gets this plus one.
pub const SEQUENCE_NO_TERMINAL: u32 = 0;

/// Kind of shell a terminal runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShellType {
    #[default]
    Default,
    GitBash,
    WslBash,
    Cmd32,
    Cmd64,
    PowerShell32,
    PowerShell64,
    PosixBash,
    Custom,
}

impl ShellType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShellType::Default => "default",
            ShellType::GitBash => "git_bash",
            ShellType::WslBash => "wsl_bash",
            ShellType::Cmd32 => "cmd32",
            ShellType::Cmd64 => "cmd64",
            ShellType::PowerShell32 => "power_shell32",
            ShellType::PowerShell64 => "power_shell64",
            ShellType::PosixBash => "posix_bash",
            ShellType::Custom => "custom",
        }
    }

    /// Executable expected on PATH for this shell, if there is a fixed one.
    pub fn program(&self) -> Option<&'static str> {
        match self {
            ShellType::Default | ShellType::Custom => None,
            ShellType::GitBash | ShellType::PosixBash => Some("bash"),
            ShellType::WslBash => Some("wsl"),
            ShellType::Cmd32 | ShellType::Cmd64 => Some("cmd"),
            ShellType::PowerShell32 | ShellType::PowerShell64 => Some("powershell"),
        }
    }
}

impl fmt::Display for ShellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShellType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(ShellType::Default),
            "git_bash" => Ok(ShellType::GitBash),
            "wsl_bash" => Ok(ShellType::WslBash),
            "cmd32" => Ok(ShellType::Cmd32),
            "cmd64" => Ok(ShellType::Cmd64),
            "power_shell32" => Ok(ShellType::PowerShell32),
            "power_shell64" => Ok(ShellType::PowerShell64),
            "posix_bash" => Ok(ShellType::PosixBash),
            "custom" => Ok(ShellType::Custom),
            _ => Err(anyhow::anyhow!("Invalid shell type: {}", s)),
        }
    }
}

/// Whether a terminal tab closes by itself when its process exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoCloseMode {
    /// Follow the global preference.
    #[default]
    Default,
    Always,
    Never,
}

impl FromStr for AutoCloseMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(AutoCloseMode::Default),
            "always" => Ok(AutoCloseMode::Always),
            "never" => Ok(AutoCloseMode::Never),
            _ => Err(anyhow::anyhow!("Invalid auto-close mode: {}", s)),
        }
    }
}

/// Settings used when a terminal is started without explicit values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionDefaults {
    pub columns: u16,
    pub rows: u16,
    pub shell_type: ShellType,
    pub auto_close_mode: AutoCloseMode,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            shell_type: ShellType::Default,
            auto_close_mode: AutoCloseMode::Default,
        }
    }
}

/// Caption given to a terminal that was started without one, e.g. "Terminal 3".
pub fn default_caption(sequence: u32) -> String {
    format!("Terminal {}", sequence)
}

/// Server-side description of a terminal process, as persisted between runs.
///
/// Dimensions are not part of it; a terminal restored from a `ProcessInfo`
/// comes back at the default size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInfo {
    pub handle: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub title: String,
    pub terminal_sequence: u32,
    #[serde(default)]
    pub has_child_procs: bool,
    #[serde(default)]
    pub shell_type: ShellType,
    #[serde(default)]
    pub alt_buffer_active: bool,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub auto_close_mode: AutoCloseMode,
    #[serde(default)]
    pub zombie: bool,
}

/// Metadata for one terminal. Never mutated in place: every change builds a
/// new record through one of the `with_*` methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalRecord {
    handle: String,
    caption: String,
    title: String,
    sequence: u32,
    has_child_processes: bool,
    columns: u16,
    rows: u16,
    shell_type: ShellType,
    alt_buffer_active: bool,
    working_directory: Option<String>,
    auto_close_mode: AutoCloseMode,
    is_zombie: bool,
}

impl TerminalRecord {
    /// A running, idle terminal with default dimensions, shell and policy.
    pub fn new(handle: impl Into<String>, caption: impl Into<String>, sequence: u32) -> Self {
        Self {
            handle: handle.into(),
            caption: caption.into(),
            title: String::new(),
            sequence,
            has_child_processes: false,
            columns: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            shell_type: ShellType::Default,
            alt_buffer_active: false,
            working_directory: None,
            auto_close_mode: AutoCloseMode::Default,
            is_zombie: false,
        }
    }

    pub fn from_process_info(info: ProcessInfo, defaults: &SessionDefaults) -> Self {
        Self {
            handle: info.handle,
            caption: info.caption,
            title: info.title,
            sequence: info.terminal_sequence,
            has_child_processes: info.has_child_procs,
            columns: defaults.columns,
            rows: defaults.rows,
            shell_type: info.shell_type,
            alt_buffer_active: info.alt_buffer_active,
            working_directory: info.cwd,
            auto_close_mode: info.auto_close_mode,
            is_zombie: info.zombie,
        }
    }

    pub fn to_process_info(&self) -> ProcessInfo {
        ProcessInfo {
            handle: self.handle.clone(),
            caption: self.caption.clone(),
            title: self.title.clone(),
            terminal_sequence: self.sequence,
            has_child_procs: self.has_child_processes,
            shell_type: self.shell_type,
            alt_buffer_active: self.alt_buffer_active,
            cwd: self.working_directory.clone(),
            auto_close_mode: self.auto_close_mode,
            zombie: self.is_zombie,
        }
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Label shown in the terminal picker.
    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Label shown above the active terminal.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn has_child_processes(&self) -> bool {
        self.has_child_processes
    }

    pub fn columns(&self) -> u16 {
        self.columns
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn shell_type(&self) -> ShellType {
        self.shell_type
    }

    pub fn alt_buffer_active(&self) -> bool {
        self.alt_buffer_active
    }

    pub fn working_directory(&self) -> Option<&str> {
        self.working_directory.as_deref()
    }

    pub fn auto_close_mode(&self) -> AutoCloseMode {
        self.auto_close_mode
    }

    pub fn is_zombie(&self) -> bool {
        self.is_zombie
    }

    pub fn with_title(self, title: impl Into<String>) -> Self {
        Self { title: title.into(), ..self }
    }

    pub fn with_child_processes(self, has_child_processes: bool) -> Self {
        Self { has_child_processes, ..self }
    }

    pub fn with_working_directory(self, working_directory: Option<String>) -> Self {
        Self { working_directory, ..self }
    }

    pub fn with_dimensions(self, columns: u16, rows: u16) -> Self {
        Self { columns, rows, ..self }
    }

    pub fn with_shell_type(self, shell_type: ShellType) -> Self {
        Self { shell_type, ..self }
    }

    pub fn with_alt_buffer_active(self, alt_buffer_active: bool) -> Self {
        Self { alt_buffer_active, ..self }
    }

    pub fn with_auto_close_mode(self, auto_close_mode: AutoCloseMode) -> Self {
        Self { auto_close_mode, ..self }
    }

    pub fn with_zombie(self, is_zombie: bool) -> Self {
        Self { is_zombie, ..self }
    }
}
