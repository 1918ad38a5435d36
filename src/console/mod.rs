//! Line-oriented console over a [`TerminalList`].

pub mod backend;
pub mod command;

use crate::error::AppError;
use crate::terminal::persist::save_session_state;
use crate::terminal::TerminalList;
use crate::utils::audit_logger::AuditLogger;
use backend::BackendEvent;
use command::Command;
use std::path::PathBuf;
use tracing::{debug, instrument};

/// What the driver loop should do after a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(String),
    Quit(String),
}

pub struct Console {
    list: TerminalList,
    state_file: PathBuf,
    audit: AuditLogger,
}

impl Console {
    pub fn new(list: TerminalList, state_file: PathBuf, audit: AuditLogger) -> Self {
        Self { list, state_file, audit }
    }

    pub fn list(&self) -> &TerminalList {
        &self.list
    }

    #[instrument(skip(self))]
    pub async fn run_line(&mut self, line: &str) -> Result<Flow, AppError> {
        let command: Command = line.parse()?;
        let arguments = serde_json::to_value(&command)?;
        self.audit.log_command(command.name(), &arguments).await;

        match command {
            Command::Save => {
                self.save().await?;
                Ok(Flow::Continue(format!("saved {} terminal(s)", self.list.len())))
            }
            Command::Quit => {
                self.save().await?;
                Ok(Flow::Quit("bye".to_string()))
            }
            other => other.apply(&mut self.list).map(Flow::Continue),
        }
    }

    pub async fn save(&self) -> Result<(), AppError> {
        save_session_state(&self.state_file, &self.list.snapshot()).await
    }

    pub fn apply_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::Started(record) => self.list.add_or_update(record),
            BackendEvent::Reaped(handle) => debug!(handle = %handle, "Terminal process reaped"),
        }
    }
}
