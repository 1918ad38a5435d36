use crate::error::AppError;
use crate::terminal::{TerminalList, TerminalNotification};
use serde::Serialize;
use std::fmt::Write as _;
use std::str::FromStr;

/// One line typed at the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum Command {
    New { caption: String },
    List,
    Retitle { handle: String, title: String },
    Close { handle: String },
    Reconnect { handle: String },
    Subprocs { handle: String, active: bool },
    Cwd { handle: String, cwd: Option<String> },
    Find { caption: String },
    Busy,
    Save,
    TerminateAll,
    Quit,
}

fn required<'a>(word: Option<&'a str>, what: &str, usage: &str) -> Result<&'a str, AppError> {
    word.ok_or_else(|| AppError::InvalidInputArgument(format!("missing {}; usage: {}", what, usage)))
}

/// Words after the first `skip`, rejoined with single spaces.
fn rest_of(line: &str, skip: usize) -> String {
    line.split_whitespace().skip(skip).collect::<Vec<_>>().join(" ")
}

impl FromStr for Command {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(AppError::InvalidInputArgument("empty command".to_string()));
        };

        let command = match name {
            "new" => Command::New { caption: rest_of(line, 1) },
            "list" | "ls" => Command::List,
            "retitle" => {
                let handle = required(words.next(), "handle", "retitle <handle> <title>")?;
                Command::Retitle { handle: handle.to_string(), title: rest_of(line, 2) }
            }
            "close" => {
                let handle = required(words.next(), "handle", "close <handle>")?;
                Command::Close { handle: handle.to_string() }
            }
            "reconnect" => {
                let handle = required(words.next(), "handle", "reconnect <handle>")?;
                Command::Reconnect { handle: handle.to_string() }
            }
            "subprocs" => {
                let usage = "subprocs <handle> <on|off>";
                let handle = required(words.next(), "handle", usage)?;
                let active = match required(words.next(), "state", usage)? {
                    "on" | "true" | "yes" => true,
                    "off" | "false" | "no" => false,
                    other => {
                        return Err(AppError::InvalidInputArgument(format!(
                            "invalid state '{}'; usage: {}",
                            other, usage
                        )))
                    }
                };
                Command::Subprocs { handle: handle.to_string(), active }
            }
            "cwd" => {
                let handle = required(words.next(), "handle", "cwd <handle> [dir]")?;
                let dir = rest_of(line, 2);
                let cwd = if dir.is_empty() { None } else { Some(dir) };
                Command::Cwd { handle: handle.to_string(), cwd }
            }
            "find" => {
                let caption = rest_of(line, 1);
                if caption.is_empty() {
                    return Err(AppError::InvalidInputArgument("missing caption; usage: find <caption>".to_string()));
                }
                Command::Find { caption }
            }
            "busy" => Command::Busy,
            "save" => Command::Save,
            "terminate-all" => Command::TerminateAll,
            "quit" | "exit" => Command::Quit,
            other => return Err(AppError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::New { .. } => "new",
            Command::List => "list",
            Command::Retitle { .. } => "retitle",
            Command::Close { .. } => "close",
            Command::Reconnect { .. } => "reconnect",
            Command::Subprocs { .. } => "subprocs",
            Command::Cwd { .. } => "cwd",
            Command::Find { .. } => "find",
            Command::Busy => "busy",
            Command::Save => "save",
            Command::TerminateAll => "terminate-all",
            Command::Quit => "quit",
        }
    }

    /// Run a command that only touches the registry and return the text to show.
    /// `save` and `quit` need I/O and are handled by the console itself.
    pub fn apply(&self, list: &mut TerminalList) -> Result<String, AppError> {
        match self {
            Command::New { caption } => {
                match list.create_named(caption) {
                    Some(sequence) => Ok(format!("starting terminal {}", sequence)),
                    None => Err(AppError::CaptionInUse(caption.clone())),
                }
            }
            Command::List => Ok(render_list(list)),
            Command::Retitle { handle, title } => {
                if list.get(handle).is_none() {
                    return Err(AppError::TerminalNotFound(handle.clone()));
                }
                if list.retitle(handle, title) {
                    Ok(format!("{} retitled", handle))
                } else {
                    Ok(format!("{} unchanged", handle))
                }
            }
            Command::Close { handle } => {
                if list.close(handle) {
                    Ok(format!("{} closed", handle))
                } else {
                    Err(AppError::TerminalNotFound(handle.clone()))
                }
            }
            Command::Reconnect { handle } => {
                if list.reconnect(handle) {
                    Ok(format!("reconnecting {}", handle))
                } else {
                    Err(AppError::TerminalNotFound(handle.clone()))
                }
            }
            Command::Subprocs { handle, active } => {
                list.handle_notification(TerminalNotification::SubprocessesChanged {
                    handle: handle.clone(),
                    has_subprocesses: *active,
                });
                Ok(format!("busy: {}", list.any_subprocesses_active()))
            }
            Command::Cwd { handle, cwd } => {
                list.handle_notification(TerminalNotification::WorkingDirectoryChanged {
                    handle: handle.clone(),
                    cwd: cwd.clone(),
                });
                Ok(String::new())
            }
            Command::Find { caption } => Ok(list
                .handle_for_caption(caption)
                .map(str::to_string)
                .unwrap_or_else(|| format!("no terminal called '{}'", caption))),
            Command::Busy => Ok(format!("busy: {}", list.any_subprocesses_active())),
            Command::TerminateAll => {
                let count = list.len();
                list.terminate_all();
                Ok(format!("terminated {} terminal(s)", count))
            }
            Command::Save | Command::Quit => Err(AppError::InvalidInputArgument(format!(
                "'{}' cannot be applied to the terminal list directly",
                self.name()
            ))),
        }
    }
}

fn render_list(list: &TerminalList) -> String {
    if list.is_empty() {
        return "no terminals".to_string();
    }
    let mut out = String::new();
    for (index, record) in list.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}  {:<36}  {:<16}  {:<16}  {:<4}  {}",
            index,
            record.handle(),
            record.caption(),
            record.title(),
            if record.has_child_processes() { "busy" } else { "" },
            record.working_directory().unwrap_or("-"),
        );
    }
    out.truncate(out.trim_end().len());
    out
}
