use crate::terminal::record::{default_caption, AutoCloseMode, ShellType, TerminalRecord};

/// Everything needed to begin a new terminal session or resume a known one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    pub sequence: u32,
    /// `None` asks for a new session; `Some` resumes that session.
    pub handle: Option<String>,
    pub caption: Option<String>,
    pub title: Option<String>,
    pub has_child_processes: bool,
    pub columns: u16,
    pub rows: u16,
    pub shell_type: ShellType,
    pub alt_buffer_active: bool,
    pub working_directory: Option<String>,
    pub auto_close_mode: AutoCloseMode,
    pub is_zombie: bool,
    pub blinking_cursor: bool,
    pub focus: bool,
}

impl SessionRequest {
    /// Record for the session once the backend has assigned it `handle`.
    /// A request without a caption gets the default one for its sequence.
    pub fn into_record(self, handle: impl Into<String>) -> TerminalRecord {
        let caption = self
            .caption
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| default_caption(self.sequence));
        TerminalRecord::new(handle, caption, self.sequence)
            .with_title(self.title.unwrap_or_default())
            .with_child_processes(self.has_child_processes)
            .with_dimensions(self.columns, self.rows)
            .with_shell_type(self.shell_type)
            .with_alt_buffer_active(self.alt_buffer_active)
            .with_working_directory(self.working_directory)
            .with_auto_close_mode(self.auto_close_mode)
            .with_zombie(self.is_zombie)
    }
}

/// Begins or resumes a terminal session. The outcome arrives later as a
/// notification, never as a return value.
pub trait SessionStarter: Send + Sync {
    fn start(&self, request: SessionRequest);
}

/// Interrupts a terminal's process and reclaims its server-side bookkeeping.
pub trait ProcessTerminator: Send + Sync {
    fn interrupt_and_reap(&self, handle: &str);
}

pub trait UserPrefs: Send + Sync {
    fn blinking_cursor(&self) -> bool;
}

/// Preferences that never change.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPrefs {
    pub blinking_cursor: bool,
}

impl UserPrefs for FixedPrefs {
    fn blinking_cursor(&self) -> bool {
        self.blinking_cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::record::{DEFAULT_COLS, DEFAULT_ROWS};

    fn request(sequence: u32, caption: Option<&str>) -> SessionRequest {
        SessionRequest {
            sequence,
            handle: None,
            caption: caption.map(str::to_string),
            title: None,
            has_child_processes: true,
            columns: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            shell_type: ShellType::Default,
            alt_buffer_active: false,
            working_directory: None,
            auto_close_mode: AutoCloseMode::Default,
            is_zombie: false,
            blinking_cursor: true,
            focus: true,
        }
    }

    #[test]
    fn unnamed_request_gets_default_caption() {
        let record = request(4, None).into_record("h4");
        assert_eq!(record.caption(), "Terminal 4");
        assert_eq!(record.title(), "");
        assert!(record.has_child_processes());
    }

    #[test]
    fn named_request_keeps_caption() {
        let record = request(1, Some("build")).into_record("h1");
        assert_eq!(record.caption(), "build");
        assert_eq!(record.handle(), "h1");
        assert_eq!(record.sequence(), 1);
    }
}
